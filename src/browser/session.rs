use crate::core::{BrowserTrait, Config, LocatorTable};
use crate::errors::{AutomationError, Result};
use tracing::{info, warn};

/// One live browser session: the launched driver, its tab, and the
/// configuration and locator table the automation flows run against.
///
/// The session exclusively owns the driver. Flows borrow it for the
/// duration of a single call; element handles they resolve are only valid
/// until the next navigation and are never cached across calls.
pub struct PostingSession<B: BrowserTrait> {
    pub(crate) browser: B,
    pub(crate) tab: Option<B::TabHandle>,
    pub(crate) config: Config,
    pub(crate) locators: LocatorTable,
    pub(crate) session_id: String,
}

impl<B: BrowserTrait> PostingSession<B> {
    /// Launch the browser and open the working tab.
    ///
    /// Configuration is validated before anything is launched, and a failure
    /// while opening the tab releases the already-running browser, so no
    /// exit path leaks a process.
    pub async fn open(mut browser: B, config: Config, locators: LocatorTable) -> Result<Self> {
        config.validate()?;

        browser.launch(&config.browser).await?;
        let tab = match browser.new_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!(error = %close_err, "browser release after failed tab open also failed");
                }
                return Err(e);
            }
        };

        let session_id = uuid::Uuid::new_v4().to_string();
        info!(session = %session_id, headless = config.browser.headless, "browser session opened");

        Ok(Self {
            browser,
            tab: Some(tab),
            config,
            locators,
            session_id,
        })
    }

    pub(crate) fn tab(&self) -> Result<&B::TabHandle> {
        self.tab.as_ref().ok_or(AutomationError::NoActiveTab)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!(%url, "navigating");
        self.browser.navigate(self.tab()?, url).await
    }

    /// Best-effort wait for the page to settle after navigation or a click.
    pub async fn settle(&self) -> Result<()> {
        self.browser
            .wait_settled(self.tab()?, self.config.timeouts.default_wait())
            .await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.browser.current_url(self.tab()?).await
    }

    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.browser.screenshot(self.tab()?).await
    }

    /// Tear the session down: the tab handle first, then the browser and its
    /// supervising process. Each release is attempted even if an earlier one
    /// failed, and the first failure is reported.
    pub async fn close(mut self) -> Result<()> {
        self.tab = None;

        let result = self.browser.close().await;
        if let Err(ref e) = result {
            warn!(session = %self.session_id, error = %e, "browser release failed");
        }

        info!(session = %self.session_id, "browser session closed");
        result
    }
}
