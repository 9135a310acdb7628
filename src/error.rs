//! error.rs
//!
//! Fetch error taxonomy for the polling core.

use thiserror::Error;

/// Everything that can go wrong in one fetch attempt.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Non-2xx response; `detail` carries the backend's human-readable
    /// explanation when the body provides one.
    #[error("backend returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Network-level failure before a status was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The identity provider could not produce a bearer token.
    #[error("token provider error: {0}")]
    Token(String),

    /// The response arrived but its body was not decodable JSON.
    #[error("malformed response body: {0}")]
    Body(String),
}

impl FetchError {
    /// The transient clock-skew condition between client and token issuer:
    /// HTTP 401 whose detail mentions "too early" (any casing). This is the
    /// only failure the poller retries within a cycle.
    pub fn is_auth_skew(&self) -> bool {
        match self {
            FetchError::Status { status: 401, detail } => {
                detail.to_lowercase().contains("too early")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_skew_matches_case_insensitively() {
        let err = FetchError::Status {
            status: 401,
            detail: "Token used Too Early, check clock".into(),
        };
        assert!(err.is_auth_skew());
    }

    #[test]
    fn plain_unauthorized_is_not_skew() {
        let err = FetchError::Status {
            status: 401,
            detail: "Invalid authentication credentials".into(),
        };
        assert!(!err.is_auth_skew());
    }

    #[test]
    fn other_statuses_are_not_skew() {
        let err = FetchError::Status {
            status: 503,
            detail: "too early".into(),
        };
        assert!(!err.is_auth_skew());
        assert!(!FetchError::Token("too early".into()).is_auth_skew());
    }
}
