use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Browser not launched")]
    BrowserNotLaunched,

    #[error("Tab creation failed: {0}")]
    TabCreationFailed(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Unsupported media format: {0}")]
    UnsupportedMedia(String),

    #[error("Attachment upload failed: {0}")]
    UploadFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AutomationError>;
