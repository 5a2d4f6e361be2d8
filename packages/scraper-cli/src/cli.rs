//! Command-line arguments.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use extraction::{RequestBuilder, ScrapeError, UseCase, DEFAULT_OUTPUT_DIR};

/// Course catalog page scraped when no URL is given.
pub const DEFAULT_COURSE_URL: &str =
    "https://opinto-opas.haaga-helia.fi/fi/131320/fi/131354/TRATI22/year/2024";

/// Product page scraped when no URL is given.
pub const DEFAULT_PRODUCT_URL: &str =
    "https://www.adidas.com/us/handball-spezial-shoes/JS0241.html?pr=taxonomy_rr&slot=2&rec=mt";

#[derive(Parser, Debug)]
#[command(name = "scraper")]
#[command(about = "Extract structured records from a web page with an LLM and save them as JSON")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape a university course catalog page
    Courses {
        #[arg(default_value = DEFAULT_COURSE_URL)]
        url: String,
    },

    /// Scrape a single product page
    Product {
        #[arg(default_value = DEFAULT_PRODUCT_URL)]
        url: String,

        /// Replace the built-in instruction
        #[arg(long)]
        instruction: Option<String>,
    },

    /// Scrape any page with a JSON-Schema file
    Extract {
        url: String,

        /// JSON-Schema document describing one record or an array of records
        #[arg(long)]
        schema: PathBuf,

        /// What to extract, in plain language
        #[arg(long)]
        instruction: String,

        /// Key holding the records in the result file
        #[arg(long, default_value = "records")]
        records_key: String,

        /// Result file name prefix
        #[arg(long, default_value = "extraction")]
        prefix: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Plain HTTP fetch, no JavaScript
    Http,
    /// Headless Chromium (needs the `browser` feature)
    Chromium,
}

/// Chromium when it is compiled in, since the built-in use cases expect
/// scripts to run.
impl Default for RendererKind {
    fn default() -> Self {
        if cfg!(feature = "browser") {
            Self::Chromium
        } else {
            Self::Http
        }
    }
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Provider API key (defaults to DEEPSEEK_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model as provider/model, e.g. deepseek/deepseek-chat
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Override the provider's API base URL
    #[arg(long, global = true, env = "LLM_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory for result files
    #[arg(long, global = true, env = "SCRAPER_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = RendererKind::default())]
    pub renderer: RendererKind,

    /// Show the browser window (chromium renderer)
    #[arg(long, global = true)]
    pub headed: bool,

    /// Disable JavaScript on the page (chromium renderer)
    #[arg(long, global = true)]
    pub no_js: bool,

    /// Launch Chromium without its sandbox
    #[arg(long, global = true)]
    pub no_sandbox: bool,

    /// Always fetch fresh content
    #[arg(long, global = true)]
    pub bypass_cache: bool,

    /// Page load timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Estimated tokens per chunk sent to the model
    #[arg(long, global = true)]
    pub chunk_tokens: Option<usize>,

    /// Fraction of a chunk repeated in the next one
    #[arg(long, global = true)]
    pub overlap: Option<f32>,

    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// Debug logging for the pipeline
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Commands {
    /// The page URL and use case this command asks for.
    pub fn use_case(&self) -> Result<(String, UseCase), ScrapeError> {
        match self {
            Self::Courses { url } => Ok((url.clone(), UseCase::course_catalog())),
            Self::Product { url, instruction } => {
                let mut case = UseCase::product();
                if let Some(instruction) = instruction {
                    case.instruction = instruction.clone();
                }
                Ok((url.clone(), case))
            }
            Self::Extract {
                url,
                schema,
                instruction,
                records_key,
                prefix,
            } => {
                let document = load_schema(schema)?;
                let case = UseCase::custom(instruction.as_str(), &document, records_key.as_str(), prefix.as_str())?;
                Ok((url.clone(), case))
            }
        }
    }
}

impl GlobalArgs {
    /// Reject browser-only flags the selected renderer cannot honor.
    pub fn check_renderer(&self) -> Result<(), ScrapeError> {
        if self.renderer == RendererKind::Http && (self.headed || self.no_js) {
            return Err(ScrapeError::Config(
                "--headed and --no-js only apply to --renderer chromium".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the use case defaults.
    pub fn apply(&self, mut builder: RequestBuilder) -> RequestBuilder {
        builder = builder
            .api_token(self.api_key.clone())
            .base_url(self.base_url.clone());

        if let Some(provider) = &self.provider {
            builder = builder.provider(provider.as_str());
        }
        if self.headed {
            builder = builder.headless(false);
        }
        if self.no_js {
            builder = builder.javascript(false);
        }
        if self.bypass_cache {
            builder = builder.bypass_cache(true);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.page_timeout(Duration::from_secs(secs));
        }
        if let Some(tokens) = self.chunk_tokens {
            builder = builder.chunk_token_threshold(tokens);
        }
        if let Some(overlap) = self.overlap {
            builder = builder.overlap_rate(overlap);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        builder
    }
}

fn load_schema(path: &Path) -> Result<serde_json::Value, ScrapeError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ScrapeError::Config(format!("cannot read schema file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ScrapeError::Config(format!("schema file {} is not JSON: {}", path.display(), e))
    })
}
