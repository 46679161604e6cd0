//! Error types and utilities for kwtrends

use thiserror::Error;

/// Result type alias for kwtrends operations
pub type Result<T> = std::result::Result<T, TrendsError>;

/// Main error type for kwtrends operations
#[derive(Error, Debug)]
pub enum TrendsError {
    /// The uploaded table has no keyword column
    #[error("Missing column: no column named '{column}' (found: {})", found.join(", "))]
    MissingColumn {
        /// Column that was looked for
        column: String,
        /// Header names present in the file
        found: Vec<String>,
    },

    /// The keyword column holds no usable entries
    #[error("Empty input: column '{column}' contains no keywords")]
    EmptyInput {
        /// Column that was read
        column: String,
    },

    /// The uploaded file could not be read as a table
    #[error("Input error: {message}")]
    Input {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (HTTP client setup, etc.)
    #[error("Network error: {message}")]
    Network {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chart rendering errors
    #[error("Graph error: {message}")]
    Graph {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// CSV or image encoding errors
    #[error("Export error: {message}")]
    Export {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for configuration values or user input
    #[error("Validation error: {message}")]
    Validation {
        /// What is wrong with the value
        message: String,
        /// Dotted path of the offending field
        field: Option<String>,
    },
}

impl TrendsError {
    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>, found: Vec<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            found,
        }
    }

    /// Create an empty input error
    pub fn empty_input(column: impl Into<String>) -> Self {
        Self::EmptyInput {
            column: column.into(),
        }
    }

    /// Create a new input error with source
    pub fn input_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Input {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new export error with source
    pub fn export_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Export {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error tied to a field
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether the error comes from validating the uploaded keyword file
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::EmptyInput { .. } | Self::Input { .. }
        )
    }
}

/// Failure of a single batch request against the trends provider.
///
/// These never abort an analysis run; the keywords of the failing batch are
/// reported next to whatever data the other batches produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The provider throttled the request (HTTP 429 or equivalent)
    #[error("Provider rate limit: {message}")]
    RateLimited {
        /// Provider response detail
        message: String,
    },

    /// Network failure or an unexpected provider response
    #[error("Provider unavailable: {message}")]
    Unavailable {
        /// Transport or status detail
        message: String,
    },

    /// The provider answered but had no interest data for the batch
    #[error("No data returned for [{}]", keywords.join(", "))]
    NoData {
        /// Keywords of the empty batch
        keywords: Vec<String>,
    },
}

impl FetchError {
    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited {
            message: msg.into(),
        }
    }

    /// Create a provider unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable {
            message: msg.into(),
        }
    }

    /// Create a no-data error for the given keywords
    pub fn no_data<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NoData {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Short machine-readable name of the failure kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::Unavailable { .. } => "unavailable",
            Self::NoData { .. } => "no_data",
        }
    }
}
