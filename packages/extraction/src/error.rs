//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the binary can map
//! each failure to an [`ErrorKind`] and an exit status.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The failure taxonomy a run reports to its operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing credential or invalid setting; raised before any I/O.
    Configuration,
    /// The render/fetch step did not succeed.
    Fetch,
    /// The model call failed.
    Extraction,
    /// The extracted text is not valid JSON.
    Parse,
    /// The result file could not be written.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Parse => "parse",
            Self::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end a scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Schema document outside the supported shape
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Render/fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Model call failed
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Extracted text is not JSON
    #[error("JSON parse error: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        /// Leading part of the offending text
        excerpt: String,
    },

    /// Result file could not be written
    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    /// Which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Schema(_) => ErrorKind::Configuration,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Extraction(_) => ErrorKind::Extraction,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Persist { .. } => ErrorKind::Persistence,
        }
    }

    pub(crate) fn parse(source: serde_json::Error, text: &str) -> Self {
        let excerpt: String = text.chars().take(200).collect();
        Self::Parse { source, excerpt }
    }
}

/// Errors that can occur while rendering a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Page answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Page did not load within the page timeout
    #[error("timeout after {timeout_ms}ms loading {url}")]
    Timeout { url: String, timeout_ms: u64 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Browser could not be launched or driven
    #[error("browser error: {0}")]
    Browser(String),

    /// Renderer reported failure with its own message
    #[error("{0}")]
    Failed(String),
}

/// Errors raised while reading a JSON-Schema-like document.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// The top-level "type" is neither "array" nor "object"
    #[error("unsupported top-level type: {0}")]
    UnsupportedShape(String),

    /// The record schema has no properties
    #[error("record schema has no properties")]
    NoProperties,

    /// A property type outside the supported set
    #[error("field '{field}' has unsupported type {found}")]
    UnsupportedField { field: String, found: String },

    /// A required name that is not a declared property
    #[error("required field '{0}' is not declared")]
    UnknownRequired(String),

    /// Document is not shaped like a schema at all
    #[error("malformed schema: {0}")]
    Malformed(String),
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for render operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
