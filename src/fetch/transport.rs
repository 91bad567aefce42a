use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, UPGRADE_INSECURE_REQUESTS,
};

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const FIREFOX_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0";
const SAFARI_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

/// A single raw GET. Non-2xx responses must come back as `Err`.
#[async_trait]
pub trait Transport {
    async fn get(&mut self, url: &str) -> Result<String>;
}

/// reqwest client dressed up as a desktop browser.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// `browser` picks the impersonated user agent ("chrome", "firefox",
    /// "safari"); anything else is sent verbatim.
    pub fn new(browser: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent_for(browser))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&mut self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status);
        }
        Ok(response.text().await?)
    }
}

fn user_agent_for(browser: &str) -> &str {
    match browser.to_ascii_lowercase().as_str() {
        "chrome" => CHROME_UA,
        "firefox" => FIREFOX_UA,
        "safari" => SAFARI_UA,
        _ => browser,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_browsers_map_to_real_user_agents() {
        assert!(user_agent_for("chrome").contains("Chrome/"));
        assert!(user_agent_for("Firefox").contains("Firefox/"));
        assert_eq!(user_agent_for("my-bot/1.0"), "my-bot/1.0");
    }
}
