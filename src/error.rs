use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenPixError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid resource: {0}")]
    InvalidResource(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Download already in progress for slot {0}")]
    DownloadBusy(usize),
    #[error("A generation is already in progress")]
    GenerationBusy,
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Upstream returned {status}: {message}")]
    UpstreamError { status: u16, message: String },
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GenPixError {
    /// HTTP status carried by the error, when it came from a remote call.
    pub fn status(&self) -> Option<u16> {
        match self {
            GenPixError::Unauthorized => Some(401),
            GenPixError::QuotaExceeded(_) => Some(403),
            GenPixError::UpstreamError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenPixError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => GenPixError::UpstreamError {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => GenPixError::RequestError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for GenPixError {
    fn from(e: serde_json::Error) -> Self {
        GenPixError::ResponseError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenPixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GenPixError::Unauthorized.status(), Some(401));
        assert_eq!(GenPixError::QuotaExceeded("limit".into()).status(), Some(403));
        assert_eq!(
            GenPixError::UpstreamError {
                status: 502,
                message: "bad gateway".into()
            }
            .status(),
            Some(502)
        );
        assert_eq!(GenPixError::EncodingError("x".into()).status(), None);
    }

    #[test]
    fn test_display() {
        let err = GenPixError::InvalidResource("missing url".into());
        assert_eq!(err.to_string(), "Invalid resource: missing url");
        assert_eq!(
            GenPixError::DownloadBusy(2).to_string(),
            "Download already in progress for slot 2"
        );
    }
}
