//! Model-backed extractors.
//!
//! This module provides the reference implementation of the `Extractor`
//! trait. Tests use `testing::MockExtractor` instead.

#[cfg(feature = "llm")]
mod llm;

#[cfg(feature = "llm")]
pub use llm::LlmExtractor;
