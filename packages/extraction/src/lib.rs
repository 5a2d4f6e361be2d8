//! Schema-Constrained Page Extraction Library
//!
//! Fetches one rendered web page, asks a hosted language model for records
//! shaped by a JSON schema, and persists them as a timestamped JSON file.
//!
//! # Pipeline
//!
//! Configuration Builder → Extraction Invoker → Result Normalizer →
//! Persistence Writer → Summary Reporter. Data only flows forward.
//!
//! # Usage
//!
//! ```rust,ignore
//! use extraction::{ExtractionRequest, HttpRenderer, LlmExtractor, Scraper, UseCase};
//!
//! // Fails with a configuration error if DEEPSEEK_API_KEY is unset
//! let request = ExtractionRequest::builder(url, UseCase::course_catalog()).build()?;
//!
//! let scraper = Scraper::new(HttpRenderer::new(), LlmExtractor::new())
//!     .with_output_dir("results");
//! let report = scraper.run(&request).await?;
//! report.write_summary(&mut std::io::stdout(), request.use_case())?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams to the renderer and the model (Renderer, Extractor)
//! - [`types`] - Request, page, config and result types
//! - [`schema`] - Extraction schema model
//! - [`use_case`] - Built-in use cases (course catalog, product)
//! - [`pipeline`] - Chunking, invocation, normalization, persistence, reporting
//! - [`renderers`] - HTTP and headless Chromium renderers
//! - [`ai`] - LLM-backed extractor
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod pipeline;
pub mod renderers;
pub mod schema;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;
pub mod use_case;

// Re-export core types at crate root
pub use error::{ErrorKind, FetchError, Result, SchemaError, ScrapeError};
pub use schema::{ExtractionSchema, FieldType, Shape};
pub use security::{ApiCredentials, SecretString, API_KEY_ENV};
pub use traits::{
    extractor::Extractor,
    renderer::{render_in_session, RenderSession, Renderer},
};
pub use types::{
    config::{BrowserOptions, CacheMode, ChunkingConfig, LlmOptions, DEFAULT_PROVIDER},
    page::RenderedPage,
    request::{ExtractionRequest, RequestBuilder},
    result::{ExtractionResult, Failure, FailureKind, Record},
};
pub use use_case::{BundleLayout, Envelope, PreviewStyle, UseCase};

// Re-export pipeline components
pub use pipeline::{
    chunk_text, invoke, normalize, normalize_text, write_bundle, write_error, write_summary,
    Chunk, ModelResponse, ResultBundle, RunReport, Scraper, DEFAULT_OUTPUT_DIR,
};

// Re-export renderers
pub use renderers::HttpRenderer;

#[cfg(feature = "browser")]
pub use renderers::ChromiumRenderer;

#[cfg(feature = "llm")]
pub use ai::LlmExtractor;

// Re-export testing utilities
pub use testing::{MockExtractor, MockRenderer};
