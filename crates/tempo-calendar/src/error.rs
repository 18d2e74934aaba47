//! Calendar service error types and the transient/fatal classification.

use tempo_auth::AuthError;
use thiserror::Error;

/// Errors from the calendar service client.
///
/// `is_transient` is the fixed classification table the retry loop uses:
/// server errors, rate limiting, timeouts, transport failures, and a
/// rejected credential mid-call are worth another attempt; everything else
/// fails immediately.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar credentials expired or were rejected")]
    TokenExpired,

    #[error("permission denied by the calendar service: {0}")]
    PermissionDenied(String),

    #[error("event or calendar not found: {0}")]
    NotFound(String),

    #[error("rate limited by the calendar service, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("request timed out at the calendar service")]
    RequestTimeout,

    #[error("calendar service error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("calendar service rejected the request ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("request could not be prepared: {0}")]
    Request(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected calendar service response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CalendarError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired
                | Self::RateLimited { .. }
                | Self::RequestTimeout
                | Self::ServerError { .. }
                | Self::Network(_)
        )
    }

    /// HTTP status associated with this failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenExpired => Some(401),
            Self::PermissionDenied(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::RequestTimeout => Some(408),
            Self::ServerError { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Detail string suitable for a result envelope's `reason` field.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::PermissionDenied(body) | Self::NotFound(body) => {
                (!body.is_empty()).then(|| body.clone())
            }
            Self::ServerError { body, .. } | Self::Api { body, .. } => {
                (!body.is_empty()).then(|| body.clone())
            }
            Self::RateLimited { retry_after } => Some(format!("retry after {retry_after}s")),
            Self::Request(message) | Self::InvalidResponse(message) => Some(message.clone()),
            Self::Network(err) => Some(err.to_string()),
            Self::Auth(err) => Some(err.to_string()),
            Self::TokenExpired | Self::RequestTimeout => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert!(CalendarError::TokenExpired.is_transient());
        assert!(CalendarError::RateLimited { retry_after: 60 }.is_transient());
        assert!(CalendarError::RequestTimeout.is_transient());
        assert!(CalendarError::ServerError {
            status: 503,
            body: String::new()
        }
        .is_transient());

        assert!(!CalendarError::NotFound("gone".to_string()).is_transient());
        assert!(!CalendarError::PermissionDenied("forbidden".to_string()).is_transient());
        assert!(!CalendarError::Api {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!CalendarError::InvalidResponse("bad json".to_string()).is_transient());
    }

    #[test]
    fn test_status_and_reason_feed_the_envelope() {
        let err = CalendarError::ServerError {
            status: 503,
            body: "backend unavailable".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.reason().as_deref(), Some("backend unavailable"));

        let err = CalendarError::RateLimited { retry_after: 30 };
        assert_eq!(err.status(), Some(429));
        assert!(err.reason().is_some());

        assert_eq!(CalendarError::TokenExpired.status(), Some(401));
        assert_eq!(CalendarError::TokenExpired.reason(), None);
    }

    #[test]
    fn test_empty_body_gives_no_reason() {
        let err = CalendarError::NotFound(String::new());
        assert_eq!(err.reason(), None);
        assert_eq!(err.status(), Some(404));
    }
}
