use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Batch size per allpages request, the maximum MediaWiki grants
/// anonymous clients.
const APLIMIT: &str = "500";

#[derive(Debug, Deserialize)]
struct AllPagesResponse {
    #[serde(rename = "continue")]
    cont: Option<Continuation>,
    query: QueryBody,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    apcontinue: String,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    allpages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    title: String,
}

/// Walk the `list=allpages` API until the continuation token runs out and
/// return every page title on the wiki, in API order.
pub async fn list_all_titles(client: &Client, base_url: &str) -> Result<Vec<String>> {
    let url = format!("{base_url}/api.php");
    let mut titles = Vec::new();
    let mut apcontinue: Option<String> = None;

    loop {
        let mut params = vec![
            ("action", "query"),
            ("list", "allpages"),
            ("format", "json"),
            ("aplimit", APLIMIT),
        ];
        if let Some(cont) = apcontinue.as_deref() {
            params.push(("apcontinue", cont));
        }

        let body = client
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()
            .context("allpages query rejected")?
            .text()
            .await
            .context("reading allpages response")?;
        let page: AllPagesResponse =
            serde_json::from_str(&body).context("decoding allpages response")?;

        debug!("Listed {} titles in this batch", page.query.allpages.len());
        titles.extend(page.query.allpages.into_iter().map(|p| p.title));

        match page.cont {
            Some(c) => apcontinue = Some(c.apcontinue),
            None => break,
        }
    }

    info!("Listed {} pages from {}", titles.len(), base_url);
    Ok(titles)
}
