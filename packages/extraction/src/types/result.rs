//! Outcome of the fetch-and-extract call.

use serde_json::{Map, Value};

use crate::error::{ErrorKind, FetchError, ScrapeError};

/// One extracted record: field name → value.
pub type Record = Map<String, Value>;

/// What the invoker hands to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// Raw text the model produced, expected to hold JSON.
    Success(String),
    Failure(Failure),
}

/// Error-shaped result: the call did not produce text.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Settings were rejected before anything was sent.
    Configuration,
    /// Render/fetch step did not succeed.
    Fetch,
    /// Model call raised an error.
    Extraction,
}

impl ExtractionResult {
    pub fn configuration_failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::Configuration,
            message: message.into(),
        })
    }

    pub fn fetch_failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::Fetch,
            message: message.into(),
        })
    }

    pub fn extraction_failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure {
            kind: FailureKind::Extraction,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl Failure {
    pub fn error_kind(&self) -> ErrorKind {
        match self.kind {
            FailureKind::Configuration => ErrorKind::Configuration,
            FailureKind::Fetch => ErrorKind::Fetch,
            FailureKind::Extraction => ErrorKind::Extraction,
        }
    }
}

impl From<Failure> for ScrapeError {
    fn from(failure: Failure) -> Self {
        match failure.kind {
            FailureKind::Configuration => ScrapeError::Config(failure.message),
            FailureKind::Fetch => ScrapeError::Fetch(FetchError::Failed(failure.message)),
            FailureKind::Extraction => ScrapeError::Extraction(failure.message),
        }
    }
}
