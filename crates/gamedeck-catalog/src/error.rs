//! Error types for catalog operations

use thiserror::Error;

/// Errors that can occur while loading, caching or paging the game catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP transport error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog endpoint answered with a non-success status
    #[error("Catalog endpoint returned status {0}")]
    Status(u16),

    /// The catalog endpoint answered with an empty game list
    #[error("Catalog endpoint returned no games")]
    EmptyCatalog,

    /// Response body could not be decoded into a catalog
    #[error("Malformed catalog response: {0}")]
    Malformed(String),

    /// IO error in the persisted store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid endpoint URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Cache directory could not be determined
    #[error("Could not determine cache directory for the current platform")]
    CacheDirectoryNotFound,

    /// Paging was requested with a zero page size
    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    /// Unknown catalog scope or device class string
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// What was being parsed ("scope", "device class")
        kind: &'static str,
        /// The rejected input
        value: String,
    },
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Whether this error came from the remote fetch rather than local state
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status(_) | Self::EmptyCatalog | Self::Malformed(_)
        )
    }
}
