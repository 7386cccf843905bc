use crate::core::config::BrowserConfig;
use crate::core::locators::Selector;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// What a resolved element must satisfy before the caller may act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Present,
    Visible,
    Clickable,
}

/// Snapshot of one selector's state on the live page.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ElementProbe {
    pub present: bool,
    pub visible: bool,
    pub clickable: bool,
}

impl ElementProbe {
    pub fn satisfies(&self, requirement: Requirement) -> bool {
        match requirement {
            Requirement::Present => self.present,
            Requirement::Visible => self.visible,
            Requirement::Clickable => self.clickable,
        }
    }
}

/// Capability interface over one underlying browser-driver library.
///
/// The whole automation engine (resolver, interstitial dismisser, login
/// automaton, post composer) is written against this trait, so a new
/// driver backend only has to supply these primitives. Every wait takes a
/// caller-bounded timeout; none of the methods block indefinitely.
#[async_trait]
pub trait BrowserTrait: Send + Sync {
    type TabHandle: Send + Sync;

    /// Launch a browser instance configured for low automation visibility.
    async fn launch(&mut self, config: &BrowserConfig) -> Result<()>;

    /// Open a fresh tab/page in the running browser.
    async fn new_tab(&self) -> Result<Self::TabHandle>;

    /// Navigate the tab and wait for the document to arrive.
    async fn navigate(&self, tab: &Self::TabHandle, url: &str) -> Result<()>;

    /// Best-effort wait until the page has settled (network-idle
    /// equivalent), bounded by `timeout`.
    async fn wait_settled(&self, tab: &Self::TabHandle, timeout: Duration) -> Result<()>;

    /// Current location of the tab.
    async fn current_url(&self, tab: &Self::TabHandle) -> Result<String>;

    /// Inspect the state of the first element matching `selector`.
    async fn probe(&self, tab: &Self::TabHandle, selector: &Selector) -> Result<ElementProbe>;

    /// Programmatic click on the first match; succeeds even when another
    /// element visually overlaps the target.
    async fn click(&self, tab: &Self::TabHandle, selector: &Selector) -> Result<()>;

    /// Replace the value/text of the first match and fire input events.
    async fn fill(&self, tab: &Self::TabHandle, selector: &Selector, text: &str) -> Result<()>;

    /// Feed file paths into a file-input element.
    async fn set_files(
        &self,
        tab: &Self::TabHandle,
        selector: &Selector,
        files: &[&Path],
    ) -> Result<()>;

    /// Scan all clickable elements and click the first whose trimmed,
    /// lowercased text is in `labels`; returns the matched label.
    async fn click_by_label(
        &self,
        tab: &Self::TabHandle,
        labels: &[&str],
    ) -> Result<Option<String>>;

    /// Execute JavaScript in the tab and return its value.
    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value>;

    /// Capture a screenshot of the current viewport.
    async fn screenshot(&self, tab: &Self::TabHandle) -> Result<Vec<u8>>;

    fn is_running(&self) -> bool;

    /// Release the browser and its supervising process.
    async fn close(&mut self) -> Result<()>;
}
