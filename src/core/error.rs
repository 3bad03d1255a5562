// src/core/error.rs

use thiserror::Error;

/// Input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a website URL")]
    EmptyUrl,

    #[error("Please enter your email address")]
    MissingEmail,

    #[error("Run a scan before requesting the full report")]
    MissingUrl,
}

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, timeout or non-2xx status.
    #[error("transport error (status {status:?}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Transport {
        status: Option<u16>,
        detail: Option<String>,
    },

    /// A 2xx response whose body could not be used.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    pub fn transport(status: Option<u16>, detail: Option<String>) -> Self {
        ApiError::Transport { status, detail }
    }

    /// Message to show the user: the service's `detail` when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport { detail: Some(detail), .. } if !detail.trim().is_empty() => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::transport(err.status().map(|s| s.as_u16()), None)
    }
}

/// Which correlated action a response belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Scan,
    Order,
}

/// Errors raised by the session state machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("an order is already in progress")]
    OrderInFlight,

    #[error("the report for this scan was already requested")]
    OrderClosed,

    #[error("discarded stale {action} response for request #{token}")]
    StaleResponse { action: Action, token: u64 },
}
