pub mod browser;
pub mod core;
pub mod errors;
pub mod flows;
pub mod testing;
pub mod types;

pub use browser::{ChromeBrowser, PostingSession, ResolvedElement};
pub use crate::core::{
    BrowserConfig, BrowserTrait, Config, Credentials, LocatorKey, LocatorTable, Selector,
};
pub use errors::AutomationError;
pub use flows::{run_posting, PostingReport};
pub use types::{Attachment, LoginOutcome, MediaKind, PostOutcome};
