use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Malformed URL '{url}'")]
    MalformedUrl { url: String },

    #[error("Failed to GET {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse links: {0}")]
    Parse(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ScanError {
    pub fn malformed(url: impl Into<String>) -> Self {
        ScanError::MalformedUrl { url: url.into() }
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        ScanError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
