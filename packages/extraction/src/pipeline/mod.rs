//! The scrape pipeline.
//!
//! Stages run strictly forward:
//! - Invoke: render the page and ask the model for schema-shaped JSON
//! - Normalize: reduce the reply to a flat record sequence
//! - Persist: write one timestamped result file
//! - Report: print a short summary

pub mod chunking;
pub mod invoke;
pub mod normalize;
pub mod persist;
pub mod prompts;
pub mod report;
pub mod run;

pub use chunking::{chunk_text, estimate_tokens, Chunk};
pub use invoke::{invoke, merge_replies};
pub use normalize::{normalize, normalize_text, ModelResponse};
pub use persist::{write_bundle, ResultBundle, DEFAULT_OUTPUT_DIR};
pub use prompts::{format_system_prompt, format_user_prompt};
pub use report::{course_line, write_error, write_summary};
pub use run::{RunReport, Scraper};
