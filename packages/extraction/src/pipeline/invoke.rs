//! Extraction invoker: render the page, then ask the model about each chunk.
//!
//! Whatever goes wrong is turned into an [`ExtractionResult::Failure`]; this
//! stage never returns an error to its caller.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::pipeline::chunking::{chunk_text, estimate_tokens, filter_blocks};
use crate::pipeline::normalize::{normalize, ModelResponse};
use crate::traits::extractor::Extractor;
use crate::traits::renderer::{render_in_session, Renderer};
use crate::types::request::ExtractionRequest;
use crate::types::result::{ExtractionResult, Record};
use crate::use_case::Envelope;

/// Run the fetch-and-extract call for one request.
pub async fn invoke<R, E>(renderer: &R, extractor: &E, request: &ExtractionRequest) -> ExtractionResult
where
    R: Renderer + ?Sized,
    E: Extractor + ?Sized,
{
    let url = request.url();

    let page = match render_in_session(renderer, url, request.browser()).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %url, renderer = renderer.name(), error = %e, "Fetch failed");
            return ExtractionResult::fetch_failure(e.to_string());
        }
    };

    info!(
        url = %url,
        status = ?page.status,
        bytes = page.content.len(),
        "Page rendered"
    );

    let text = filter_blocks(&page.content, request.chunking().min_block_words);
    let chunks = chunk_text(&text, request.chunking());
    if chunks.is_empty() {
        warn!(url = %url, "Page has no readable content");
        return ExtractionResult::extraction_failure(format!("no readable content at {url}"));
    }

    info!(
        chunks = chunks.len(),
        estimated_tokens = estimate_tokens(&text),
        extractor = extractor.name(),
        "Extracting"
    );

    let mut replies = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        let started = Instant::now();
        match extractor.extract(request, chunk).await {
            Ok(reply) => {
                debug!(
                    chunk = chunk.index + 1,
                    total = chunk.total,
                    reply_len = reply.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Chunk extracted"
                );
                replies.push(reply);
            }
            Err(e) => {
                warn!(chunk = chunk.index + 1, error = %e, "Extraction failed");
                return failure_for(e);
            }
        }
    }

    ExtractionResult::Success(merge_replies(replies, &request.use_case().envelope))
}

/// Combine per-chunk replies into one JSON array of records.
///
/// A single reply is returned untouched. Replies that do not parse are
/// skipped; if none parse, the first is returned so the parse error surfaces
/// downstream.
pub fn merge_replies(mut replies: Vec<String>, envelope: &Envelope) -> String {
    if replies.len() <= 1 {
        return replies.pop().unwrap_or_default();
    }

    let mut records: Vec<Record> = Vec::new();
    let mut parsed = 0;
    for (index, reply) in replies.iter().enumerate() {
        match ModelResponse::parse(reply) {
            Ok(response) => {
                parsed += 1;
                records.extend(normalize(response, envelope));
            }
            Err(e) => warn!(chunk = index + 1, error = %e, "Skipping unparseable chunk reply"),
        }
    }

    if parsed == 0 {
        return replies.swap_remove(0);
    }

    debug!(replies = replies.len(), parsed, records = records.len(), "Merged chunk replies");
    Value::Array(records.into_iter().map(Value::Object).collect()).to_string()
}

/// Settings problems the extractor finds keep their kind; everything else
/// is an extraction failure.
fn failure_for(error: ScrapeError) -> ExtractionResult {
    match error {
        ScrapeError::Config(message) => ExtractionResult::configuration_failure(message),
        ScrapeError::Schema(e) => ExtractionResult::configuration_failure(e.to_string()),
        ScrapeError::Extraction(message) => ExtractionResult::extraction_failure(message),
        other => ExtractionResult::extraction_failure(other.to_string()),
    }
}
