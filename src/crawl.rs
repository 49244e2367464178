use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::fetch::fetch_page_source;
use crate::parser::classify_lines;
use crate::settings::Settings;
use crate::writer::write_page;

#[derive(Debug, Default)]
pub struct CrawlStats {
    pub pages: usize,
    pub matched: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub write_errors: usize,
}

/// Visit every title in order: fetch its wikitext, keep pages mentioning
/// the keyword, classify their lines and write one CSV per kept page.
/// Pages that fail to fetch or write are counted and skipped; only the
/// surrounding setup can abort the crawl.
pub async fn run(
    client: &Client,
    settings: &Settings,
    titles: &[String],
) -> Result<CrawlStats> {
    let mut stats = CrawlStats::default();

    let pb = ProgressBar::new(titles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    for title in titles {
        stats.pages += 1;
        let fetched = fetch_page_source(
            client,
            &settings.base_url,
            title,
            settings.max_retries,
            settings.retry_delay(),
        )
        .await;

        match fetched {
            None => stats.unavailable += 1,
            Some(source) if !source.contains(settings.keyword.as_str()) => {
                info!("'{}' does not mention {}", title, settings.keyword);
                stats.skipped += 1;
            }
            Some(source) => {
                let lines = classify_lines(&source);
                match write_page(&settings.output_dir, title, &lines) {
                    Ok(path) => {
                        info!(
                            "Saved {} records from '{}' to {}",
                            lines.len(),
                            title,
                            path.display()
                        );
                        stats.matched += 1;
                    }
                    Err(err) => {
                        warn!("Failed to write artifact for '{}': {:#}", title, err);
                        stats.write_errors += 1;
                    }
                }
            }
        }

        pb.inc(1);
        sleep(settings.page_delay()).await;
    }

    pb.finish_and_clear();
    info!(
        "Crawl finished: {} pages, {} matched, {} skipped, {} unavailable, {} write errors",
        stats.pages, stats.matched, stats.skipped, stats.unavailable, stats.write_errors
    );
    Ok(stats)
}
