use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsreelError {
    #[error("Free request quota reached")]
    QuotaExceeded,

    #[error("Network error: {0}")]
    Transient(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed synchronizer has stopped")]
    Stopped,
}

/// Coarse classification used by the synchronizer to pick a user notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote refused further paging for this session.
    QuotaExceeded,
    Transient,
    Cache,
    NotFound,
    Other,
}

impl NewsreelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NewsreelError::QuotaExceeded => ErrorKind::QuotaExceeded,
            NewsreelError::Transient(_) | NewsreelError::Http(_) | NewsreelError::Decode(_) => {
                ErrorKind::Transient
            }
            NewsreelError::Cache(_) => ErrorKind::Cache,
            NewsreelError::NotFound(_) => ErrorKind::NotFound,
            NewsreelError::InvalidUrl(_)
            | NewsreelError::Io(_)
            | NewsreelError::Config(_)
            | NewsreelError::Stopped => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsreelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(NewsreelError::QuotaExceeded.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(
            NewsreelError::Transient("503".into()).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            NewsreelError::Cache(rusqlite::Error::InvalidQuery).kind(),
            ErrorKind::Cache
        );
        assert_eq!(
            NewsreelError::NotFound("abc".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            NewsreelError::Config("bad".into()).kind(),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_decode_error_is_transient() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(NewsreelError::from(err).kind(), ErrorKind::Transient);
    }
}
