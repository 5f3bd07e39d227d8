//! Error taxonomy for the aggregation core.
//!
//! Upstream and storage failures are ordinary values here; the HTTP layer
//! wraps them in the `{ok: false, error: {code, message}}` envelope. Missing
//! or malformed payload fields are never errors; they surface as `None`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Network error, timeout, or an HTTP status >= 400 from an upstream API.
    #[error("fetch from {feed} failed: {message}")]
    Fetch {
        feed: String,
        status: Option<u16>,
        message: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A stored payload could not be read back as JSON.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn fetch(feed: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        CoreError::Fetch {
            feed: feed.into(),
            status,
            message: message.into(),
        }
    }

    /// Build a fetch error from a `reqwest` failure, keeping the status if
    /// the request got as far as a response.
    pub fn from_reqwest(feed: impl Into<String>, err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        CoreError::fetch(feed, status, err.to_string())
    }

    /// Machine-readable code used in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Fetch { status, .. } => match status {
                Some(403) => "UPSTREAM_403",
                Some(404) => "UPSTREAM_404",
                Some(429) => "UPSTREAM_429",
                Some(500..=599) => "UPSTREAM_5XX",
                _ => "UPSTREAM_ERROR",
            },
            CoreError::Storage(_) => "DATABASE_ERROR",
            CoreError::Decode(_) => "DECODE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_codes_follow_status() {
        assert_eq!(CoreError::fetch("apod", Some(403), "x").code(), "UPSTREAM_403");
        assert_eq!(CoreError::fetch("apod", Some(429), "x").code(), "UPSTREAM_429");
        assert_eq!(CoreError::fetch("apod", Some(503), "x").code(), "UPSTREAM_5XX");
        assert_eq!(CoreError::fetch("apod", Some(418), "x").code(), "UPSTREAM_ERROR");
        assert_eq!(CoreError::fetch("apod", None, "timed out").code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn storage_code() {
        let err = CoreError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
