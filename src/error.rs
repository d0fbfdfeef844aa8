use thiserror::Error;

/// Failures from the cluster, model, and chat services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, TLS...).
    #[error("{0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The body could not be read or did not have the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Prefixes status failures with the resource they came from
    /// (`Clusters HTTP 500`); other failures keep their own message.
    pub fn labelled(&self, resource: &str) -> String {
        match self {
            ApiError::Status(_) => format!("{} {}", resource, self),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status(status.as_u16())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
