//! Scripted in-memory driver for exercising the automation flows without a
//! real browser. Clones share state, so tests keep a handle for inspection
//! while the session owns the driver value.

use crate::core::{BrowserConfig, BrowserTrait, ElementProbe, Selector};
use crate::errors::{AutomationError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct ScriptedElement {
    probe: ElementProbe,
    appears_after_probes: u32,
}

#[derive(Debug, Default)]
struct MockState {
    launched: bool,
    url: String,
    elements: HashMap<String, ScriptedElement>,
    url_after_click: HashMap<String, String>,
    url_countdown: Option<(u32, String)>,
    labels: Vec<String>,
    fail_clicks: HashSet<String>,
    fail_fills: HashSet<String>,
    probe_counts: HashMap<String, u32>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    fills: Vec<(String, String)>,
    files: Vec<(String, Vec<PathBuf>)>,
    label_clicks: Vec<String>,
    close_calls: u32,
}

#[derive(Clone, Default)]
pub struct MockBrowser {
    state: Arc<Mutex<MockState>>,
}

impl MockBrowser {
    pub fn new(initial_url: &str) -> Self {
        let browser = MockBrowser::default();
        browser.state.lock().unwrap().url = initial_url.to_string();
        browser
    }

    /// Script an element that is on the page from the start.
    pub fn with_element(self, selector: &Selector, probe: ElementProbe) -> Self {
        self.with_element_after(selector, probe, 0)
    }

    /// Script an element that only starts matching after the first
    /// `probes` inspections have seen nothing.
    pub fn with_element_after(self, selector: &Selector, probe: ElementProbe, probes: u32) -> Self {
        self.state.lock().unwrap().elements.insert(
            selector.to_string(),
            ScriptedElement {
                probe,
                appears_after_probes: probes,
            },
        );
        self
    }

    /// Clicking `selector` moves the page to `url`.
    pub fn on_click_set_url(self, selector: &Selector, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .url_after_click
            .insert(selector.to_string(), url.to_string());
        self
    }

    /// After `polls` further `current_url` calls, the location changes to
    /// `url` on its own, emulating an out-of-band completion.
    pub fn set_url_after_url_polls(self, polls: u32, url: &str) -> Self {
        self.state.lock().unwrap().url_countdown = Some((polls, url.to_string()));
        self
    }

    /// Clickable elements carrying these labels, for the text-scan fallback.
    pub fn with_labels(self, labels: &[&str]) -> Self {
        self.state.lock().unwrap().labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn failing_clicks(self, selector: &Selector) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_clicks
            .insert(selector.to_string());
        self
    }

    pub fn failing_fills(self, selector: &Selector) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_fills
            .insert(selector.to_string());
        self
    }

    pub fn launched(&self) -> bool {
        self.state.lock().unwrap().launched
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    pub fn files_fed(&self) -> Vec<(String, Vec<PathBuf>)> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn label_clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().label_clicks.clone()
    }

    pub fn probe_count(&self, selector: &Selector) -> u32 {
        self.state
            .lock()
            .unwrap()
            .probe_counts
            .get(&selector.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn close_calls(&self) -> u32 {
        self.state.lock().unwrap().close_calls
    }
}

#[async_trait]
impl BrowserTrait for MockBrowser {
    type TabHandle = ();

    async fn launch(&mut self, _config: &BrowserConfig) -> Result<()> {
        self.state.lock().unwrap().launched = true;
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        if !self.state.lock().unwrap().launched {
            return Err(AutomationError::BrowserNotLaunched);
        }
        Ok(())
    }

    async fn navigate(&self, _tab: &Self::TabHandle, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn wait_settled(&self, _tab: &Self::TabHandle, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn current_url(&self, _tab: &Self::TabHandle) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        if let Some((remaining, next)) = state.url_countdown.take() {
            if remaining == 0 {
                state.url = next;
            } else {
                state.url_countdown = Some((remaining - 1, next));
            }
        }
        Ok(state.url.clone())
    }

    async fn probe(&self, _tab: &Self::TabHandle, selector: &Selector) -> Result<ElementProbe> {
        let mut state = self.state.lock().unwrap();
        let key = selector.to_string();
        let count = state.probe_counts.entry(key.clone()).or_insert(0);
        *count += 1;
        let count = *count;

        Ok(state
            .elements
            .get(&key)
            .filter(|scripted| count > scripted.appears_after_probes)
            .map(|scripted| scripted.probe)
            .unwrap_or_default())
    }

    async fn click(&self, _tab: &Self::TabHandle, selector: &Selector) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = selector.to_string();
        if state.fail_clicks.contains(&key) {
            return Err(AutomationError::JavaScriptFailed(format!(
                "scripted click failure on {}",
                key
            )));
        }
        state.clicks.push(key.clone());
        if let Some(next) = state.url_after_click.get(&key).cloned() {
            state.url = next;
        }
        Ok(())
    }

    async fn fill(&self, _tab: &Self::TabHandle, selector: &Selector, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let key = selector.to_string();
        if state.fail_fills.contains(&key) {
            return Err(AutomationError::JavaScriptFailed(format!(
                "scripted fill failure on {}",
                key
            )));
        }
        state.fills.push((key, text.to_string()));
        Ok(())
    }

    async fn set_files(
        &self,
        _tab: &Self::TabHandle,
        selector: &Selector,
        files: &[&Path],
    ) -> Result<()> {
        self.state.lock().unwrap().files.push((
            selector.to_string(),
            files.iter().map(|p| p.to_path_buf()).collect(),
        ));
        Ok(())
    }

    async fn click_by_label(
        &self,
        _tab: &Self::TabHandle,
        labels: &[&str],
    ) -> Result<Option<String>> {
        let mut state = self.state.lock().unwrap();
        let matched = state
            .labels
            .iter()
            .find(|present| labels.contains(&present.as_str()))
            .cloned();
        if let Some(label) = matched {
            state.label_clicks.push(label.clone());
            return Ok(Some(label));
        }
        Ok(None)
    }

    async fn execute_script(&self, _tab: &Self::TabHandle, _script: &str) -> Result<Value> {
        Ok(Value::Null)
    }

    async fn screenshot(&self, _tab: &Self::TabHandle) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn is_running(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.launched && state.close_calls == 0
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;
        state.launched = false;
        Ok(())
    }
}
