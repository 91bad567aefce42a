use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum gap between consecutive requests.
///
/// Owned by a single fetcher and driven sequentially through `&mut self`.
pub struct RateLimiter {
    min_delay: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        RateLimiter {
            min_delay,
            last: None,
        }
    }

    /// Sleep until `min_delay` has passed since the previous call returned.
    /// The first call returns immediately.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                tokio::time::sleep(self.min_delay - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
