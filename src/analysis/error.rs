//! Error taxonomy for the analysis adapters.
//!
//! Adapter failures are categorized into a fixed set of kinds so the
//! bus can log a useful status line without inspecting provider
//! internals. Classification is heuristic: HTTP status first, then
//! message patterns.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Category of an adapter failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// API key invalid, expired, or missing permissions.
    Auth,
    /// Quota or rate limit reached.
    RateLimit,
    /// Content blocked by provider safety filters.
    Policy,
    /// Connection, DNS, or timeout failure.
    Network,
    /// Remote model down or overloaded.
    Unavailable,
    /// Context or output token limits exceeded.
    Capacity,
    /// Model returned a null or empty completion.
    Empty,
    /// Anything uncategorized.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Auth => "AUTH_FAILURE",
            ErrorKind::RateLimit => "RESOURCE_EXHAUSTED",
            ErrorKind::Policy => "POLICY_VIOLATION",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Unavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Capacity => "CAPACITY_ERROR",
            ErrorKind::Empty => "EMPTY_RESPONSE",
            ErrorKind::Unknown => "SYSTEM_FAULT",
        };
        write!(f, "{}", label)
    }
}

/// A categorized failure from either analysis adapter.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct AnalysisError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Operator-facing detail.
    pub message: String,
}

impl AnalysisError {
    /// Build an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a raw provider error message, optionally with the HTTP
    /// status that accompanied it.
    pub fn classify(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = classify_kind(status, &message);
        Self { kind, message }
    }

    /// Map a transport-level reqwest error.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorKind::Network, "request timed out")
        } else if err.is_connect() {
            Self::new(ErrorKind::Network, format!("connection failed: {}", err))
        } else {
            Self::classify(err.status(), err.to_string())
        }
    }
}

fn classify_kind(status: Option<StatusCode>, message: &str) -> ErrorKind {
    if let Some(status) = status {
        match status.as_u16() {
            401 | 403 => return ErrorKind::Auth,
            429 => return ErrorKind::RateLimit,
            500 | 503 => return ErrorKind::Unavailable,
            _ => {}
        }
    }

    let lower = message.to_lowercase();
    let patterns: [(&[&str], ErrorKind); 6] = [
        (
            &["api_key_invalid", "unauthorized", "forbidden"],
            ErrorKind::Auth,
        ),
        (&["quota", "rate limit"], ErrorKind::RateLimit),
        (&["safety", "blocked"], ErrorKind::Policy),
        (&["dns", "connection", "network"], ErrorKind::Network),
        (&["unavailable", "overloaded"], ErrorKind::Unavailable),
        (&["token_limit", "max_output_tokens"], ErrorKind::Capacity),
    ];

    for (needles, kind) in patterns {
        if needles.iter().any(|n| lower.contains(n)) {
            return kind;
        }
    }

    ErrorKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_status() {
        assert_eq!(
            AnalysisError::classify(Some(StatusCode::UNAUTHORIZED), "no").kind,
            ErrorKind::Auth
        );
        assert_eq!(
            AnalysisError::classify(Some(StatusCode::TOO_MANY_REQUESTS), "slow down").kind,
            ErrorKind::RateLimit
        );
        assert_eq!(
            AnalysisError::classify(Some(StatusCode::SERVICE_UNAVAILABLE), "down").kind,
            ErrorKind::Unavailable
        );
    }

    #[test]
    fn test_classify_by_message() {
        assert_eq!(
            AnalysisError::classify(None, "model quota exceeded").kind,
            ErrorKind::RateLimit
        );
        assert_eq!(
            AnalysisError::classify(None, "content blocked by safety filter").kind,
            ErrorKind::Policy
        );
        assert_eq!(
            AnalysisError::classify(None, "DNS resolution failed").kind,
            ErrorKind::Network
        );
        assert_eq!(
            AnalysisError::classify(None, "hit max_output_tokens").kind,
            ErrorKind::Capacity
        );
    }

    #[test]
    fn test_classify_fallback() {
        assert_eq!(
            AnalysisError::classify(None, "something odd").kind,
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_display_format() {
        let err = AnalysisError::new(ErrorKind::RateLimit, "throttling active");
        assert_eq!(err.to_string(), "RESOURCE_EXHAUSTED: throttling active");
    }
}
