//! Error types for ChurnInsight
//!
//! The Risk Insight Engine itself never fails. Everything here belongs to the
//! boundary around it: input validation, the session, and the prediction API.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Out-of-range customer attributes, rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing, expired or rejected session token (local check or 401/403)
    #[error("Session error: {0}")]
    Session(String),

    #[error("The request took too long (timeout after {}s)", .0.as_secs())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Non-2xx response from the backend
    #[error("{}", status_message(.status))]
    Server { status: u16 },

    /// Backend answered 2xx but the body is missing fields or out of range
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True when the caller should drop its local session and re-authenticate
    pub fn is_session(&self) -> bool {
        matches!(self, Error::Session(_))
    }

    /// True for timeouts and connectivity failures
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Network(_))
    }

    /// Classify a transport failure from a request sent with `timeout`
    pub(crate) fn from_request(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::Network(e)
        }
    }
}

fn status_message(status: &u16) -> String {
    match status {
        400 => "Invalid input data (HTTP 400)".to_string(),
        500 => "Internal server error (HTTP 500)".to_string(),
        other => format!("Server error: {}", other),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_messages() {
        assert!(Error::Server { status: 400 }
            .to_string()
            .contains("Invalid input"));
        assert!(Error::Server { status: 500 }
            .to_string()
            .contains("Internal server error"));
        assert_eq!(
            Error::Server { status: 502 }.to_string(),
            "Server error: 502"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::Session("expired".into()).is_session());
        assert!(!Error::Server { status: 401 }.is_session());
        assert!(Error::Timeout(Duration::from_secs(30)).is_network());
        assert!(!Error::InvalidInput("age".into()).is_network());
    }

    #[test]
    fn test_timeout_message() {
        let msg = Error::Timeout(Duration::from_secs(30)).to_string();
        assert!(msg.contains("took too long"));
        assert!(msg.contains("30s"));
    }
}
