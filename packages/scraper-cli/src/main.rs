//! `scraper` - fetch a page, extract schema-shaped records with an LLM, save JSON.
//!
//! Exit status: 0 on success, otherwise one code per failure kind
//! (configuration 2, fetch 3, extraction 4, parse 5, persistence 6).

mod cli;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use extraction::{
    write_error, ErrorKind, ExtractionRequest, HttpRenderer, LlmExtractor, Renderer, RunReport,
    ScrapeError, Scraper,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, GlobalArgs, RendererKind};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut stdout = io::stdout().lock();
            let _ = write_error(&mut stdout, &err.to_string());
            let _ = stdout.flush();
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,extraction=debug,llm_client=debug"
    } else {
        "warn,extraction=info,llm_client=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    cli.global.check_renderer()?;
    let (url, use_case) = cli.command.use_case()?;
    let request = cli
        .global
        .apply(ExtractionRequest::builder(url, use_case))
        .build()?;

    println!("Scraping from: {}", request.url());

    let report = match cli.global.renderer {
        RendererKind::Http => scrape(HttpRenderer::new(), &request, &cli.global.output_dir).await?,
        RendererKind::Chromium => scrape_with_browser(&request, &cli.global).await?,
    };

    let records_key = &request.use_case().layout.records_key;
    println!("Saved to: {}", report.output_path.display());
    println!("Successfully scraped {} {}", report.records.len(), records_key);

    let mut stdout = io::stdout().lock();
    report
        .write_summary(&mut stdout, request.use_case())
        .context("Failed to print summary")?;
    Ok(())
}

async fn scrape<R: Renderer>(
    renderer: R,
    request: &ExtractionRequest,
    output_dir: &Path,
) -> Result<RunReport, ScrapeError> {
    Scraper::new(renderer, LlmExtractor::new())
        .with_output_dir(output_dir)
        .run(request)
        .await
}

#[cfg(feature = "browser")]
async fn scrape_with_browser(
    request: &ExtractionRequest,
    global: &GlobalArgs,
) -> Result<RunReport, ScrapeError> {
    let mut renderer = extraction::ChromiumRenderer::new();
    if global.no_sandbox {
        renderer = renderer.no_sandbox();
    }
    scrape(renderer, request, &global.output_dir).await
}

#[cfg(not(feature = "browser"))]
async fn scrape_with_browser(
    _request: &ExtractionRequest,
    _global: &GlobalArgs,
) -> Result<RunReport, ScrapeError> {
    Err(ScrapeError::Config(
        "the chromium renderer needs a build with `--features browser`".to_string(),
    ))
}

/// Process exit status for a failed run.
fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ScrapeError>())
        .map(ScrapeError::kind);

    match kind {
        Some(ErrorKind::Configuration) => 2,
        Some(ErrorKind::Fetch) => 3,
        Some(ErrorKind::Extraction) => 4,
        Some(ErrorKind::Parse) => 5,
        Some(ErrorKind::Persistence) => 6,
        None => 1,
    }
}
