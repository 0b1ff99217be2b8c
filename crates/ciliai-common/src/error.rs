use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiliaiError {
    /// Timeout, non-2xx status or transport failure that survived every retry.
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 429 persisted through every retry.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid gene symbol: {0:?}")]
    InvalidGene(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("run cancelled before this gene was processed")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CiliaiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CiliaiError::InvalidGene(" ".into()).to_string(),
            "Invalid gene symbol: \" \""
        );
        assert_eq!(CiliaiError::Xml("eof".into()).to_string(), "XML parse error: eof");
        assert_eq!(CiliaiError::Cancelled.to_string(), "run cancelled before this gene was processed");
    }
}
