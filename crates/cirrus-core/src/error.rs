// ── Core error types ──
//
// User-facing errors from cirrus-core. These are NOT API-specific --
// consumers never see raw reqwest errors or JSON parse failures directly.
// The `From<cirrus_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not connected to the API")]
    NotConnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Request field the API blamed, if any.
        field: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Short message suitable for a one-line status row.
    pub fn summary(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cirrus_api::Error> for CoreError {
    fn from(err: cirrus_api::Error) -> Self {
        match err {
            cirrus_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            cirrus_api::Error::InvalidToken => CoreError::AuthenticationFailed {
                message: "Invalid or expired API token".into(),
            },
            cirrus_api::Error::Forbidden { path } => CoreError::AuthenticationFailed {
                message: format!("Token lacks permission for {path}"),
            },
            cirrus_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        field: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            cirrus_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cirrus_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cirrus_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            cirrus_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                field: None,
                status: Some(429),
            },
            cirrus_api::Error::Api {
                message,
                field,
                status,
            } => {
                if status == 404 {
                    CoreError::NotFound {
                        entity_type: "Resource".into(),
                        identifier: message,
                    }
                } else {
                    CoreError::Api {
                        message,
                        field,
                        status: Some(status),
                    }
                }
            }
            cirrus_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_token_becomes_auth_failure() {
        let err = CoreError::from(cirrus_api::Error::InvalidToken);
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn api_404_becomes_not_found() {
        let err = CoreError::from(cirrus_api::Error::Api {
            message: "Not found".into(),
            field: None,
            status: 404,
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn api_errors_keep_field_and_status() {
        let err = CoreError::from(cirrus_api::Error::Api {
            message: "Label must be unique".into(),
            field: Some("label".into()),
            status: 400,
        });
        match err {
            CoreError::Api { field, status, .. } => {
                assert_eq!(field.as_deref(), Some("label"));
                assert_eq!(status, Some(400));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
