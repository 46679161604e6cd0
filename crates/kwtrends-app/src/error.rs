//! Application-wide error types using thiserror.

use kwtrends_common::TrendsError;
use kwtrends_config::ConfigError;

/// Errors returned by session actions.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Input, rendering or export failure.
    #[error(transparent)]
    Trends(#[from] TrendsError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// "Run analysis" was requested before a file was uploaded.
    #[error("No keywords loaded: upload a file first")]
    NoKeywords,

    /// A download was requested before any analysis ran.
    #[error("No analysis results yet: run the analysis first")]
    NoResults,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the user can fix this by changing the uploaded file.
    pub const fn is_input_error(&self) -> bool {
        match self {
            Self::Trends(e) => e.is_input_error(),
            _ => false,
        }
    }
}

/// Result type for session actions.
pub type AppResult<T> = Result<T, AppError>;
