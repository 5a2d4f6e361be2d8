//! One scrape run: invoke → normalize → persist.
//!
//! # Example
//!
//! ```rust,ignore
//! let request = ExtractionRequest::builder(url, UseCase::course_catalog()).build()?;
//! let scraper = Scraper::new(HttpRenderer::new(), LlmExtractor::new());
//! let report = scraper.run(&request).await?;
//! report.write_summary(&mut std::io::stdout(), request.use_case())?;
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::invoke::invoke;
use crate::pipeline::normalize::normalize_text;
use crate::pipeline::persist::{write_bundle, ResultBundle, DEFAULT_OUTPUT_DIR};
use crate::pipeline::report::write_summary;
use crate::traits::extractor::Extractor;
use crate::traits::renderer::Renderer;
use crate::types::request::ExtractionRequest;
use crate::types::result::{ExtractionResult, Record};
use crate::use_case::UseCase;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub records: Vec<Record>,
    pub output_path: PathBuf,
}

impl RunReport {
    /// Print the count and preview for this run's use case.
    pub fn write_summary<W: Write>(&self, out: &mut W, use_case: &UseCase) -> io::Result<()> {
        write_summary(
            out,
            &self.records,
            &use_case.layout.records_key,
            use_case.preview,
        )
    }
}

/// Drives a run with a renderer and an extractor.
pub struct Scraper<R: Renderer, E: Extractor> {
    renderer: R,
    extractor: E,
    output_dir: PathBuf,
}

impl<R: Renderer, E: Extractor> Scraper<R, E> {
    pub fn new(renderer: R, extractor: E) -> Self {
        Self {
            renderer,
            extractor,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Run once, timestamping the output with the current local time.
    pub async fn run(&self, request: &ExtractionRequest) -> Result<RunReport> {
        self.run_at(request, Local::now()).await
    }

    /// Run once with an explicit timestamp.
    ///
    /// No file is written unless every earlier step succeeded.
    pub async fn run_at(
        &self,
        request: &ExtractionRequest,
        now: DateTime<Local>,
    ) -> Result<RunReport> {
        let use_case = request.use_case();
        info!(url = %request.url(), use_case = %use_case.name, "Scraping");

        let text = match invoke(&self.renderer, &self.extractor, request).await {
            ExtractionResult::Success(text) => text,
            ExtractionResult::Failure(failure) => {
                warn!(kind = ?failure.kind, message = %failure.message, "Run failed");
                return Err(failure.into());
            }
        };

        let records = normalize_text(&text, &use_case.envelope)?;
        let bundle = ResultBundle::new(request.url(), records, use_case.layout.clone(), now);
        let output_path = write_bundle(&self.output_dir, &bundle)?;

        info!(
            records = bundle.records.len(),
            key = %use_case.layout.records_key,
            "Successfully scraped"
        );

        Ok(RunReport {
            records: bundle.records,
            output_path,
        })
    }
}
