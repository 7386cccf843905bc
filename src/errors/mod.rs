pub mod types;

pub use types::{AutomationError, Result};
