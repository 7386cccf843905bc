pub mod browser;
pub mod config;
pub mod locators;

pub use browser::{BrowserTrait, ElementProbe, Requirement};
pub use config::{BrowserConfig, Config, Credentials, SiteUrls, TimeoutConfig, Viewport};
pub use locators::{LocatorCandidate, LocatorKey, LocatorTable, Selector};
