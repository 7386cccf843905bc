use crate::core::{BrowserConfig, BrowserTrait, ElementProbe, Selector};
use crate::errors::{AutomationError, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Masks the navigator-level automation signal pages use to spot drivers.
const WEBDRIVER_MASK: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined })";

/// Chrome driver backend.
pub struct ChromeBrowser {
    browser: Option<Browser>,
}

impl ChromeBrowser {
    pub fn new() -> Self {
        Self { browser: None }
    }

    /// JavaScript expression locating the first element for `selector`.
    /// Strings are JSON-encoded into the script, so no manual escaping.
    fn locate_expr(selector: &Selector) -> Result<String> {
        match selector {
            Selector::Css(css) => Ok(format!(
                "document.querySelector({})",
                serde_json::to_string(css)?
            )),
            Selector::Text { tag, needle } => Ok(format!(
                "Array.from(document.querySelectorAll({})).find(function(n) {{ \
                 return (n.textContent || '').indexOf({}) !== -1; }})",
                serde_json::to_string(tag)?,
                serde_json::to_string(needle)?
            )),
        }
    }

    async fn run_script(&self, tab: &Arc<Tab>, script: &str) -> Result<Value> {
        let result = tab
            .evaluate(script, false)
            .map_err(|e| AutomationError::JavaScriptFailed(e.to_string()))?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    /// Runs an action script that reports `{ success, error }` and converts
    /// a reported failure into a typed error.
    async fn run_action(&self, tab: &Arc<Tab>, script: &str, target: &Selector) -> Result<()> {
        let result = self.run_script(tab, script).await?;
        let success = result
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if success {
            Ok(())
        } else {
            let reason = result
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            Err(AutomationError::ElementNotFound(format!(
                "{}: {}",
                target, reason
            )))
        }
    }
}

impl Default for ChromeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserTrait for ChromeBrowser {
    type TabHandle = Arc<Tab>;

    async fn launch(&mut self, config: &BrowserConfig) -> Result<()> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );
        let lang_arg = format!("--lang={}", config.locale);
        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));

        let mut args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--disable-notifications"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
            OsStr::new(&lang_arg),
        ];
        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }
        for arg in &config.args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| AutomationError::LaunchFailed(e.to_string()))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| AutomationError::LaunchFailed(e.to_string()))?;

        self.browser = Some(browser);
        Ok(())
    }

    async fn new_tab(&self) -> Result<Self::TabHandle> {
        let browser = self
            .browser
            .as_ref()
            .ok_or(AutomationError::BrowserNotLaunched)?;

        let tab = browser
            .new_tab()
            .map_err(|e| AutomationError::TabCreationFailed(e.to_string()))?;

        self.run_script(&tab, WEBDRIVER_MASK).await?;
        Ok(tab)
    }

    async fn navigate(&self, tab: &Self::TabHandle, url: &str) -> Result<()> {
        tab.navigate_to(url)
            .map_err(|e| AutomationError::NavigationFailed(e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| AutomationError::NavigationFailed(e.to_string()))?;

        // The mask does not survive navigation; reapply on the new document.
        self.run_script(tab, WEBDRIVER_MASK).await?;
        Ok(())
    }

    async fn wait_settled(&self, tab: &Self::TabHandle, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let state = self.run_script(tab, "document.readyState").await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("page did not settle within {:?}", timeout);
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn current_url(&self, tab: &Self::TabHandle) -> Result<String> {
        Ok(tab.get_url())
    }

    async fn probe(&self, tab: &Self::TabHandle, selector: &Selector) -> Result<ElementProbe> {
        let script = format!(
            r#"
            (function() {{
                const el = {};
                if (!el) return {{ present: false, visible: false, clickable: false }};
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                const visible = style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && rect.width > 0 && rect.height > 0;
                const clickable = visible && !el.disabled && style.pointerEvents !== 'none';
                return {{ present: true, visible: visible, clickable: clickable }};
            }})()
            "#,
            Self::locate_expr(selector)?
        );

        let result = self.run_script(tab, &script).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn click(&self, tab: &Self::TabHandle, selector: &Selector) -> Result<()> {
        let script = format!(
            r#"
            (function() {{
                const el = {};
                if (!el) return {{ success: false, error: 'not found' }};
                el.scrollIntoView({{ block: 'center' }});
                el.click();
                return {{ success: true }};
            }})()
            "#,
            Self::locate_expr(selector)?
        );

        self.run_action(tab, &script, selector).await
    }

    async fn fill(&self, tab: &Self::TabHandle, selector: &Selector, text: &str) -> Result<()> {
        let script = format!(
            r#"
            (function() {{
                const el = {};
                if (!el) return {{ success: false, error: 'not found' }};
                el.focus();
                const tag = el.tagName.toLowerCase();
                if (tag === 'input' || tag === 'textarea') {{
                    el.value = {text};
                }} else if (el.isContentEditable) {{
                    el.textContent = {text};
                }} else {{
                    return {{ success: false, error: 'not editable' }};
                }}
                ['input', 'change'].forEach(function(type) {{
                    el.dispatchEvent(new Event(type, {{ bubbles: true, cancelable: true }}));
                }});
                return {{ success: true }};
            }})()
            "#,
            Self::locate_expr(selector)?,
            text = serde_json::to_string(text)?
        );

        self.run_action(tab, &script, selector).await
    }

    async fn set_files(
        &self,
        tab: &Self::TabHandle,
        selector: &Selector,
        files: &[&Path],
    ) -> Result<()> {
        let css = match selector {
            Selector::Css(css) => css,
            Selector::Text { .. } => {
                return Err(AutomationError::UploadFailed(
                    "file input requires a css selector".to_string(),
                ))
            }
        };

        let element = tab
            .find_element(css)
            .map_err(|e| AutomationError::ElementNotFound(format!("{}: {}", css, e)))?;

        tab.call_method(DOM::SetFileInputFiles {
            files: files.iter().map(|p| p.display().to_string()).collect(),
            node_id: Some(element.node_id),
            backend_node_id: None,
            object_id: None,
        })
        .map_err(|e| AutomationError::UploadFailed(e.to_string()))?;

        Ok(())
    }

    async fn click_by_label(
        &self,
        tab: &Self::TabHandle,
        labels: &[&str],
    ) -> Result<Option<String>> {
        let script = format!(
            r#"
            (function() {{
                const labels = {};
                const nodes = document.querySelectorAll("button, div[role='button']");
                for (const el of nodes) {{
                    const text = (el.textContent || '').trim().toLowerCase();
                    if (labels.includes(text)) {{
                        el.click();
                        return text;
                    }}
                }}
                return null;
            }})()
            "#,
            serde_json::to_string(labels)?
        );

        let result = self.run_script(tab, &script).await?;
        Ok(result.as_str().map(|s| s.to_string()))
    }

    async fn execute_script(&self, tab: &Self::TabHandle, script: &str) -> Result<Value> {
        self.run_script(tab, script).await
    }

    async fn screenshot(&self, tab: &Self::TabHandle) -> Result<Vec<u8>> {
        tab.capture_screenshot(
            headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption::Png,
            None,
            None,
            true,
        )
        .map_err(|e| AutomationError::JavaScriptFailed(e.to_string()))
    }

    fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the handle tears down the tabs and reaps the Chrome
        // process; the supervisor thread exits with it.
        self.browser = None;
        Ok(())
    }
}
