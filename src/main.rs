use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use product_scraper_console::{Config, HttpBackend, ScraperConsole};

/// Search a product scraping backend from the terminal.
///
/// Without `--query` or `--test-mode` an interactive console is started.
#[derive(Parser)]
#[command(name = "product-scraper-console", version, about)]
struct Cli {
    /// Run a single search for this query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Number of result pages to scrape (clamped to 1-5)
    #[arg(short, long)]
    pages: Option<String>,

    /// Ask the backend for sample products instead of a live scrape
    #[arg(short, long)]
    test_mode: bool,

    /// Print one-shot results as JSON
    #[arg(long)]
    json: bool,

    /// Backend base address (overrides SCRAPER_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Seconds notifications stay visible (overrides SCRAPER_NOTICE_SECS)
    #[arg(long)]
    notice_secs: Option<u64>,

    /// Print raw URLs instead of terminal hyperlinks
    #[arg(long)]
    no_links: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env();
    if let Some(url) = &cli.backend_url {
        config = config.with_backend_url(url);
    }
    if let Some(secs) = cli.notice_secs {
        config = config.with_notice_secs(secs);
    }
    if cli.no_links {
        config.hyperlinks = false;
    }

    info!("Using backend at {}", config.backend_url);
    let backend = HttpBackend::new(&config.backend_url)?;
    let mut console = ScraperConsole::new(backend, &config, std::io::stdout());

    if cli.query.is_some() || cli.test_mode {
        let found = console
            .run_once(
                cli.query.as_deref(),
                cli.pages.as_deref(),
                cli.test_mode,
                cli.json,
            )
            .await?;
        if !found {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(pages) = &cli.pages {
        console.state_mut().set_pages(pages)?;
    }
    console.run(BufReader::new(tokio::io::stdin())).await
}
