use crate::errors::{AutomationError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Login identity for the automated account. The secret is redacted from
/// `Debug` output and the struct is deliberately not serializable: the core
/// never persists credentials.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub browser: BrowserConfig,
    pub timeouts: TimeoutConfig,
    pub urls: SiteUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub locale: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub default_wait_ms: u64,
    pub checkpoint_wait_ms: u64,
    pub interstitial_wait_ms: u64,
    pub settle_ms: u64,
    pub poll_interval_ms: u64,
    pub candidate_probe_cap_ms: u64,
    pub upload_settle_ms: u64,
}

impl TimeoutConfig {
    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }

    pub fn checkpoint_wait(&self) -> Duration {
        Duration::from_millis(self.checkpoint_wait_ms)
    }

    pub fn interstitial_wait(&self) -> Duration {
        Duration::from_millis(self.interstitial_wait_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn candidate_probe_cap(&self) -> Duration {
        Duration::from_millis(self.candidate_probe_cap_ms)
    }

    pub fn upload_settle(&self) -> Duration {
        Duration::from_millis(self.upload_settle_ms)
    }
}

/// Where the target site lives and how its URL reveals login state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteUrls {
    pub login_url: String,
    pub home_url: String,
    /// Substring of the URL that marks the verification checkpoint page.
    pub checkpoint_marker: String,
    /// Substring of the URL path that marks the login surface.
    pub login_path_marker: String,
}

impl SiteUrls {
    pub fn indicates_checkpoint(&self, current_url: &str) -> bool {
        current_url.contains(&self.checkpoint_marker)
    }

    /// A location counts as logged-in when it is on the site's host and off
    /// both the login path and the checkpoint page.
    pub fn indicates_logged_in(&self, current_url: &str) -> bool {
        let on_site = match (url::Url::parse(current_url), url::Url::parse(&self.home_url)) {
            (Ok(current), Ok(home)) => match (current.host_str(), home.host_str()) {
                (Some(current_host), Some(home_host)) => {
                    current_host == home_host
                        || current_host.ends_with(&format!(".{}", home_host))
                        || home_host.ends_with(&format!(".{}", current_host))
                }
                _ => false,
            },
            _ => false,
        };
        on_site
            && !current_url.contains(&self.login_path_marker)
            && !self.indicates_checkpoint(current_url)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                 AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            locale: "ko-KR".to_string(),
            args: vec![],
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_wait_ms: 10_000,
            checkpoint_wait_ms: 30_000,
            interstitial_wait_ms: 2_000,
            settle_ms: 3_000,
            poll_interval_ms: 250,
            candidate_probe_cap_ms: 3_000,
            upload_settle_ms: 2_000,
        }
    }
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            login_url: "https://www.facebook.com/login".to_string(),
            home_url: "https://www.facebook.com".to_string(),
            checkpoint_marker: "checkpoint".to_string(),
            login_path_marker: "login".to_string(),
        }
    }
}

impl Config {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            browser: BrowserConfig::default(),
            timeouts: TimeoutConfig::default(),
            urls: SiteUrls::default(),
        }
    }

    /// Load configuration from the process environment, with `.env` support.
    ///
    /// `PAGEPOST_EMAIL` and `PAGEPOST_PASSWORD` are required; `PAGEPOST_HEADLESS`,
    /// `PAGEPOST_WAIT_SECS` and `PAGEPOST_CHECKPOINT_WAIT_SECS` are optional
    /// overrides. Missing credentials fail here, before any browser launch.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let credentials = Credentials {
            email: env::var("PAGEPOST_EMAIL").unwrap_or_default(),
            password: env::var("PAGEPOST_PASSWORD").unwrap_or_default(),
        };

        let mut config = Config::new(credentials);
        config.validate()?;

        if let Ok(headless) = env::var("PAGEPOST_HEADLESS") {
            config.browser.headless = headless.eq_ignore_ascii_case("true");
        }
        if let Some(secs) = env_secs("PAGEPOST_WAIT_SECS") {
            config.timeouts.default_wait_ms = secs * 1_000;
        }
        if let Some(secs) = env_secs("PAGEPOST_CHECKPOINT_WAIT_SECS") {
            config.timeouts.checkpoint_wait_ms = secs * 1_000;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.email.is_empty() || self.credentials.password.is_empty() {
            return Err(AutomationError::ConfigurationError(
                "email or password is not set; configure PAGEPOST_EMAIL and PAGEPOST_PASSWORD"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn env_secs(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
