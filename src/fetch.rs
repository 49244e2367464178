use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("edit form has no textarea")]
    MissingTextarea,
}

impl FetchError {
    /// Transport hiccups and server-side status codes are worth another
    /// attempt; a page served without a textarea never grows one.
    fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::MissingTextarea)
    }
}

/// Fetch one page's raw wikitext through its edit form, retrying transient
/// failures up to `max_retries` attempts with a fixed delay in between.
/// `None` means the source is unavailable and the page should be skipped.
pub async fn fetch_page_source(
    client: &Client,
    base_url: &str,
    title: &str,
    max_retries: u32,
    retry_delay: Duration,
) -> Option<String> {
    for attempt in 1..=max_retries {
        match fetch_once(client, base_url, title).await {
            Ok(source) => return Some(source),
            Err(err) => {
                warn!(
                    "Attempt {}/{} for '{}' failed: {}",
                    attempt, max_retries, title, err
                );
                if !err.is_retryable() || attempt == max_retries {
                    break;
                }
                sleep(retry_delay).await;
            }
        }
    }
    warn!("Skipping '{}': edit page source unavailable", title);
    None
}

async fn fetch_once(
    client: &Client,
    base_url: &str,
    title: &str,
) -> Result<String, FetchError> {
    let url = format!("{base_url}/index.php");
    let resp = client
        .get(&url)
        .query(&[("title", title), ("action", "edit")])
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let body = resp.text().await?;
    extract_textarea(&body).ok_or(FetchError::MissingTextarea)
}

/// Pull the text of the first `<textarea>` in the edit form, the box
/// MediaWiki renders the raw wikitext into.
fn extract_textarea(html: &str) -> Option<String> {
    static TEXTAREA: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("textarea").unwrap());
    let doc = Html::parse_document(html);
    doc.select(&TEXTAREA).next().map(|node| node.text().collect())
}
