use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use kabita_acquire::{nazrul, ScrapeOptions, Scraper, ScraperConfig};
use kabita_model::FIRST_CONTENT_PAGE;

#[derive(Parser)]
#[command(name = "kabita")]
#[command(about = "Scrape Nazrul Rachanabali poems and reconstruct their layout")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch poem pages from the archive and save annotated poems
    Scrape {
        /// Collection IDs to scrape, comma-separated (default: 4 through 23)
        #[arg(short, long, value_delimiter = ',')]
        titleids: Vec<u32>,

        /// First page to read in each collection (page 1 is the table of contents)
        #[arg(long, default_value_t = FIRST_CONTENT_PAGE)]
        start_page: u32,

        /// Stop after this page number in each collection
        #[arg(long)]
        max_pages: Option<u32>,

        /// Output directory for poem files
        #[arg(short = 'O', long, default_value = "scraped_poems")]
        output_dir: PathBuf,

        /// Also write collection_{id}.txt/.json per collection
        #[arg(long)]
        individual: bool,

        /// Skip the combined all_poems.txt/.json
        #[arg(long)]
        no_combined: bool,

        /// Append each poem to <FILE>.txt and <FILE>.json as it's scraped
        #[arg(long, value_name = "FILE")]
        append: Option<PathBuf>,

        /// Seconds to wait after each request
        #[arg(long, default_value_t = 1.0)]
        delay: f64,

        /// Override the archive page URL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Extract the poem from a saved HTML page
    Extract {
        /// Path to the HTML file
        file: PathBuf,

        /// Print the plain extracted text instead of the annotated poem
        #[arg(long)]
        raw: bool,
    },

    /// Add line and stanza markers to a plain text poem
    Annotate {
        /// Path to the text file
        file: PathBuf,
    },

    /// Validate a JSON file of scraped poem records
    Validate {
        /// Path to the JSON file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Scrape {
            titleids,
            start_page,
            max_pages,
            output_dir,
            individual,
            no_combined,
            append,
            delay,
            base_url,
        } => {
            anyhow::ensure!(delay >= 0.0 && delay.is_finite(), "--delay must be a non-negative number");

            let mut config = ScraperConfig {
                delay: Duration::from_secs_f64(delay),
                ..ScraperConfig::default()
            };
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }

            let titleids = if titleids.is_empty() {
                nazrul::DEFAULT_TITLE_IDS.collect()
            } else {
                titleids
            };

            let options = ScrapeOptions {
                start_page,
                max_pages,
                output_dir,
                save_individual: individual,
                save_combined: !no_combined,
                append_to: append,
            };

            tracing::info!(collections = titleids.len(), output = %options.output_dir.display(), "Scraping archive");
            let scraper = Scraper::new(config)?;
            scraper.scrape_all(&titleids, &options).await?;
        }
        Commands::Extract { file, raw } => {
            tracing::info!(file = %file.display(), "Extracting poem");
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let extraction = kabita_extract::extract(&kabita_extract::parse_page(&html));
            tracing::info!(structure = %extraction.structure(), "Detected layout");

            let output = if raw {
                extraction.content()
            } else {
                extraction.annotated().unwrap_or_else(|| extraction.content())
            };
            println!("{output}");
        }
        Commands::Annotate { file } => {
            tracing::info!(file = %file.display(), "Annotating poem");
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", kabita_extract::markers::annotate(&text));
        }
        Commands::Validate { file } => {
            tracing::info!(file = %file, "Validating");
            kabita_validate::validate(&file)?;
        }
    }

    Ok(())
}
