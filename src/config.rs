use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://fastfoodnutrition.org";
const CONFIG_FILE: &str = "scraper";
const ENV_PREFIX: &str = "SCRAPER";

/// Pipeline settings: defaults, then `scraper.toml` if present, then
/// `SCRAPER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub max_retries: u32,
    pub retry_delay_secs: f64,
    pub timeout_secs: u64,
    pub rate_limit_delay_secs: f64,
    pub restaurant_delay_secs: f64,
    pub user_agent: String,

    pub output_dir: PathBuf,
    pub enable_checkpointing: bool,
    pub resume_from_checkpoint: bool,

    #[serde(default)]
    pub specific_restaurants: Option<Vec<String>>,
    #[serde(default)]
    pub max_restaurants: Option<usize>,
    #[serde(default)]
    pub max_items_per_restaurant: Option<usize>,

    pub log_level: String,
    pub normalize_data: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("max_retries", 3)?
            .set_default("retry_delay_secs", 1.0)?
            .set_default("timeout_secs", 30)?
            .set_default("rate_limit_delay_secs", 0.5)?
            .set_default("restaurant_delay_secs", 2.0)?
            .set_default("user_agent", "chrome")?
            .set_default("output_dir", "output")?
            .set_default("enable_checkpointing", true)?
            .set_default("resume_from_checkpoint", true)?
            .set_default("log_level", "info")?
            .set_default("normalize_data", true)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("specific_restaurants"),
            )
            .build()
            .context("Failed to build settings")?;

        settings
            .try_deserialize()
            .context("Invalid scraper settings")
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            max_retries: self.max_retries,
            retry_delay: secs(self.retry_delay_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            rate_limit_delay: secs(self.rate_limit_delay_secs),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn item_delay(&self) -> Duration {
        secs(self.rate_limit_delay_secs)
    }

    pub fn restaurant_delay(&self) -> Duration {
        secs(self.restaurant_delay_secs)
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.output_dir.join("checkpoints")
    }
}

/// The slice of [`Settings`] the fetcher needs.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    pub rate_limit_delay: Duration,
    pub user_agent: String,
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

#[cfg(test)]
pub(crate) fn test_settings(output_dir: PathBuf) -> Settings {
    Settings {
        base_url: DEFAULT_BASE_URL.to_string(),
        max_retries: 3,
        retry_delay_secs: 0.0,
        timeout_secs: 5,
        rate_limit_delay_secs: 0.0,
        restaurant_delay_secs: 0.0,
        user_agent: "chrome".to_string(),
        output_dir,
        enable_checkpointing: true,
        resume_from_checkpoint: true,
        specific_restaurants: None,
        max_restaurants: None,
        max_items_per_restaurant: None,
        log_level: "info".to_string(),
        normalize_data: true,
    }
}
