use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Request counters for one scraping stage.
#[derive(Debug, Default, Clone)]
pub struct ScraperStats {
    pub total_requests: u64,
    pub successful: u64,
    pub failed: u64,
    pub retries: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScraperStats {
    pub fn record_success(&mut self) {
        self.total_requests += 1;
        self.successful += 1;
    }

    pub fn record_failure(&mut self) {
        self.total_requests += 1;
        self.failed += 1;
    }

    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total_requests as f64 * 100.0
    }

    pub fn duration(&self) -> Option<Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}

impl fmt::Display for ScraperStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self
            .duration()
            .map(|d| format!("{}s", d.num_seconds()))
            .unwrap_or_else(|| "N/A".into());
        write!(
            f,
            "requests={} ok={} failed={} retries={} success_rate={:.2}% duration={}",
            self.total_requests,
            self.successful,
            self.failed,
            self.retries,
            self.success_rate(),
            duration
        )
    }
}
