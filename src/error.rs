// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the API client and the state stores.

/// Application error type.
///
/// Store `error` fields hold [`AppError::message`], never the `Display`
/// output, so the prefixes below only show up in logs.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The API answered with `status != "success"`.
    #[error("Forum API error: {0}")]
    Api(String),

    /// The request never produced a usable envelope.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when a failure envelope carries no `message`.
    pub const DEFAULT_API_MESSAGE: &'static str = "Request failed";

    /// Human-readable message for display in store `error` fields.
    pub fn message(&self) -> String {
        match self {
            AppError::Api(msg) | AppError::Transport(msg) | AppError::Storage(msg) => msg.clone(),
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Internal(err) => err.to_string(),
        }
    }

    /// Whether the API itself rejected the request (as opposed to the
    /// request failing to complete).
    pub fn is_structural(&self) -> bool {
        matches!(self, AppError::Api(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result type alias for client and store operations
pub type Result<T> = std::result::Result<T, AppError>;
