//! Error handling for the taskdeck client

use std::fmt;
use thiserror::Error;

/// Detailed error body returned by the PostgREST API
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Unified error type for the taskdeck client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Error responses from the PostgREST API
    #[error("API error: {details} (Status: {status})")]
    Api {
        details: ApiErrorDetails,
        status: reqwest::StatusCode,
    },

    /// Authentication errors, body forwarded verbatim from the auth service
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Missing or placeholder backend credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-side authorization denial
    #[error("{0}")]
    Forbidden(String),

    /// Operation requires a session but none is present
    #[error("Missing session")]
    MissingSession,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new authorization-denial error
    pub fn forbidden<T: fmt::Display>(msg: T) -> Self {
        Error::Forbidden(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Build an API error from a response status and raw body, parsing the
    /// PostgREST error shape when possible
    pub(crate) fn api(status: reqwest::StatusCode, body: String) -> Self {
        let details = serde_json::from_str::<ApiErrorDetails>(&body).unwrap_or_else(|_| {
            ApiErrorDetails {
                code: None,
                message: Some(body),
                details: None,
                hint: None,
            }
        });
        Error::Api { details, status }
    }
}
