mod allpages;
mod crawl;
mod fetch;
mod parser;
mod settings;
mod writer;

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::Client;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "march7_scraper", about = "Star Rail wiki dialogue scraper")]
struct Cli {
    /// Wiki root, e.g. https://wiki.biligame.com/sr
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Keyword a page must mention to be kept
    #[arg(long, global = true)]
    keyword: Option<String>,
    /// Directory CSV artifacts are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Fetch attempts per page before giving up
    #[arg(long, global = true)]
    max_retries: Option<u32>,
    /// Seconds between fetch attempts for one page
    #[arg(long, global = true)]
    retry_delay_seconds: Option<u64>,
    /// Seconds between pages
    #[arg(long, global = true)]
    page_delay_seconds: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every page title on the wiki
    Titles {
        /// Max titles to display (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// List pages, then fetch, filter and export matching ones
    Run {
        /// Max pages to visit (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Fetch, filter and export an explicit set of pages
    Pages {
        /// Page titles to visit
        #[arg(required = true)]
        titles: Vec<String>,
    },
    /// Classify a local wikitext file and export its CSV
    Classify {
        /// Path to a wikitext file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = build_settings(&cli)?;

    let result = match cli.command {
        Commands::Titles { limit } => {
            let client = http_client()?;
            let mut titles = allpages::list_all_titles(&client, &settings.base_url).await?;
            let total = titles.len();
            if let Some(limit) = limit {
                titles.truncate(limit);
            }
            for title in &titles {
                println!("{title}");
            }
            println!("\n{} shown of {} titles", titles.len(), total);
            Ok(())
        }
        Commands::Run { limit } => {
            let client = http_client()?;
            let mut titles = allpages::list_all_titles(&client, &settings.base_url).await?;
            if titles.is_empty() {
                println!("The wiki reported no pages.");
                return Ok(());
            }
            if let Some(limit) = limit {
                titles.truncate(limit);
            }
            println!("Visiting {} pages...", titles.len());
            let stats = crawl::run(&client, &settings, &titles).await?;
            print_stats(&stats);
            Ok(())
        }
        Commands::Pages { titles } => {
            let client = http_client()?;
            println!("Visiting {} pages...", titles.len());
            let stats = crawl::run(&client, &settings, &titles).await?;
            print_stats(&stats);
            Ok(())
        }
        Commands::Classify { file } => {
            let source = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let title = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "classified".into());
            let lines = parser::classify_lines(&source);
            let path = writer::write_page(&settings.output_dir, &title, &lines)?;
            println!("Saved {} records to {}", lines.len(), path.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn build_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load()?;
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(keyword) = &cli.keyword {
        settings.keyword = keyword.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        settings.output_dir = output_dir.clone();
    }
    if let Some(max_retries) = cli.max_retries {
        settings.max_retries = max_retries;
    }
    if let Some(retry_delay_seconds) = cli.retry_delay_seconds {
        settings.retry_delay_seconds = retry_delay_seconds;
    }
    if let Some(page_delay_seconds) = cli.page_delay_seconds {
        settings.page_delay_seconds = page_delay_seconds;
    }
    Ok(settings)
}

fn http_client() -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("march7_scraper/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

fn print_stats(stats: &crawl::CrawlStats) {
    println!("Visited:      {}", stats.pages);
    println!("Matched:      {}", stats.matched);
    println!("Skipped:      {}", stats.skipped);
    println!("Unavailable:  {}", stats.unavailable);
    println!("Write errors: {}", stats.write_errors);
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
