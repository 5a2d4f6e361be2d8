//! Extractor trait for the model call.
//!
//! An extractor receives one chunk of page text together with the request
//! (instruction, schema, model knobs, credential) and returns the model's raw
//! reply. Parsing the reply is the normalizer's job, not the extractor's.

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::chunking::Chunk;
use crate::types::request::ExtractionRequest;

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Ask the model for schema-shaped JSON from one chunk.
    ///
    /// Errors should be [`crate::ScrapeError::Extraction`]; the invoker
    /// converts whatever comes back into a failure result.
    async fn extract(&self, request: &ExtractionRequest, chunk: &Chunk) -> Result<String>;

    /// Get the extractor name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
