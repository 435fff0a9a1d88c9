// src/error.rs
use thiserror::Error;

/// Failures talking to the mentor backend.
///
/// The `Display` text is what the chat session inspects when it picks a
/// user-facing fallback, so keep the "backend" / "network" wording stable.
/// Request urls are stripped from transport errors for the same reason: a
/// host name must not decide which fallback the student sees.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Backend error: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Backend health check failed with status {status}")]
    HealthCheck { status: u16 },

    #[error("network stream interrupted: {0}")]
    Stream(String),

    #[error("{context} ({status}): {body}")]
    Request {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.without_url())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}
