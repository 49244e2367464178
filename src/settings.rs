use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://wiki.biligame.com/sr";
pub const DEFAULT_KEYWORD: &str = "三月七";
pub const DEFAULT_OUTPUT_DIR: &str = "data/march7th";

/// Runtime knobs for a crawl. Defaults target the Star Rail wiki; any
/// field can be overridden through `MARCH7_*` environment variables or
/// the corresponding CLI flag.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub keyword: String,
    pub output_dir: PathBuf,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub page_delay_seconds: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("keyword", DEFAULT_KEYWORD)?
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .set_default("max_retries", 5_i64)?
            .set_default("retry_delay_seconds", 1_i64)?
            .set_default("page_delay_seconds", 1_i64)?
            .add_source(Environment::with_prefix("MARCH7").try_parsing(true))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_seconds)
    }
}
