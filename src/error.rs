use thiserror::Error;

/// Failures raised by the fetch layer and the on-disk stores.
///
/// Most HTML mismatches never surface here: extractors degrade to empty
/// values and log instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url} after {attempts} attempts: {reason}")]
    Network {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
