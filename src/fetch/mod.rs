pub mod rate_limit;
pub mod stats;
pub mod transport;

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use tracing::{debug, error, info, warn};

use crate::config::FetchConfig;
use crate::error::{Result, ScrapeError};
pub use rate_limit::RateLimiter;
pub use stats::ScraperStats;
pub use transport::{HttpTransport, Transport};

/// Rate-limited GET with exponential backoff, parsed into an HTML tree.
///
/// Every stage gets its own fetcher, so the transport session and the
/// counters are never shared between stages.
pub struct PageFetcher<T: Transport> {
    transport: T,
    limiter: RateLimiter,
    stats: ScraperStats,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: Transport> PageFetcher<T> {
    pub fn new(transport: T, config: &FetchConfig) -> Self {
        PageFetcher {
            transport,
            limiter: RateLimiter::new(config.rate_limit_delay),
            stats: ScraperStats::default(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay,
        }
    }

    pub fn stats(&self) -> &ScraperStats {
        &self.stats
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url`, retrying failed attempts after `retry_delay * 2^attempt`.
    pub async fn fetch(&mut self, url: &str) -> Result<Html> {
        let body = self.fetch_body(url).await?;
        Ok(Html::parse_document(&body))
    }

    async fn fetch_body(&mut self, url: &str) -> Result<String> {
        debug!("Fetching: {}", url);
        let mut attempt = 0u32;

        loop {
            self.limiter.wait().await;

            let err = match self.transport.get(url).await {
                Ok(body) => {
                    self.stats.record_success();
                    debug!("Fetched: {}", url);
                    return Ok(body);
                }
                Err(e) => e,
            };

            self.stats.record_retry();
            attempt += 1;
            warn!(
                "Attempt {}/{} failed for {}: {:#}",
                attempt, self.max_retries, url, err
            );

            if attempt >= self.max_retries {
                self.stats.record_failure();
                error!("All {} attempts failed for {}", self.max_retries, url);
                return Err(ScrapeError::Network {
                    url: url.to_string(),
                    attempts: self.max_retries,
                    reason: format!("{:#}", err),
                });
            }

            let backoff = backoff_delay(self.retry_delay, attempt);
            debug!("Retrying in {:.1}s", backoff.as_secs_f64());
            tokio::time::sleep(backoff).await;
        }
    }
}

/// `base * 2^(attempt - 1)` for the 1-based failed attempt, saturating.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Wraps a fetcher for the lifetime of one stage. Stamps the start time on
/// `begin` and logs the end-of-stage stats when dropped, on every exit path.
pub struct StageScope<T: Transport> {
    name: &'static str,
    fetcher: PageFetcher<T>,
}

impl<T: Transport> StageScope<T> {
    pub fn begin(name: &'static str, mut fetcher: PageFetcher<T>) -> Self {
        fetcher.stats.started_at = Some(Utc::now());
        info!("Stage {} started", name);
        StageScope { name, fetcher }
    }
}

impl<T: Transport> Deref for StageScope<T> {
    type Target = PageFetcher<T>;

    fn deref(&self) -> &Self::Target {
        &self.fetcher
    }
}

impl<T: Transport> DerefMut for StageScope<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fetcher
    }
}

impl<T: Transport> Drop for StageScope<T> {
    fn drop(&mut self) {
        self.fetcher.stats.finished_at = Some(Utc::now());
        info!("Stage {} finished: {}", self.name, self.fetcher.stats);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{fetch_config, MockTransport};
    use super::*;
    use scraper::Selector;

    const URL: &str = "https://fastfoodnutrition.org/page";

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let transport = MockTransport::new()
            .failure(URL, "HTTP 503")
            .failure(URL, "timeout")
            .page(URL, "<html><body><h1>Ok</h1></body></html>");
        let mut fetcher = PageFetcher::new(transport, &fetch_config());

        let doc = fetcher.fetch(URL).await.unwrap();
        let h1 = Selector::parse("h1").unwrap();
        assert_eq!(doc.select(&h1).next().unwrap().text().collect::<String>(), "Ok");

        let stats = fetcher.stats();
        assert_eq!(stats.retries, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn exhausting_retries_is_a_network_error() {
        let transport = MockTransport::new().failure(URL, "HTTP 500");
        let mut fetcher = PageFetcher::new(transport, &fetch_config());

        let err = fetcher.fetch(URL).await.unwrap_err();
        match err {
            ScrapeError::Network { attempts, ref reason, .. } => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("HTTP 500"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.stats().failed, 1);
        assert_eq!(fetcher.stats().successful, 0);
        assert_eq!(fetcher.transport.hits(URL), 3);
    }

    #[tokio::test]
    async fn zero_retries_still_makes_one_attempt() {
        let transport = MockTransport::new().page(URL, "<p>hi</p>");
        let mut config = fetch_config();
        config.max_retries = 0;
        let mut fetcher = PageFetcher::new(transport, &config);
        assert!(fetcher.fetch(URL).await.is_ok());
        assert_eq!(fetcher.stats().total_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_attempts() {
        let transport = MockTransport::new()
            .failure(URL, "HTTP 503")
            .failure(URL, "HTTP 503")
            .page(URL, "<p>ok</p>");
        let mut config = fetch_config();
        config.retry_delay = Duration::from_millis(100);
        let mut fetcher = PageFetcher::new(transport, &config);

        let start = tokio::time::Instant::now();
        fetcher.fetch(URL).await.unwrap();
        let elapsed = start.elapsed();
        // 100ms after the first failure, 200ms after the second
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(350), "{elapsed:?}");
    }

    #[test]
    fn backoff_saturates_on_large_attempt_counts() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 1), base);
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 40), Duration::MAX);
        assert_eq!(backoff_delay(Duration::ZERO, 40), Duration::ZERO);
    }

    #[tokio::test]
    async fn many_retries_do_not_overflow() {
        let transport = MockTransport::new().failure(URL, "HTTP 500");
        let mut config = fetch_config();
        config.max_retries = 40;
        let mut fetcher = PageFetcher::new(transport, &config);

        assert!(fetcher.fetch(URL).await.is_err());
        assert_eq!(fetcher.transport.hits(URL), 40);
        assert_eq!(fetcher.stats().failed, 1);
    }

    #[tokio::test]
    async fn stage_scope_stamps_start_time() {
        let fetcher = PageFetcher::new(MockTransport::new(), &fetch_config());
        let scope = StageScope::begin("test", fetcher);
        assert!(scope.stats().started_at.is_some());
        assert!(scope.stats().finished_at.is_none());
    }
}
