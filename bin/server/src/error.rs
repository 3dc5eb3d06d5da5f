//! Error types for HTTP handlers.
//!
//! Each enum carries operator-facing details for logging and maps to a
//! user-safe response via `IntoResponse`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Errors in the login and callback handlers.
#[derive(Debug)]
pub enum AuthError {
    /// The auth state cookie is absent.
    MissingAuthState,
    /// The auth state cookie could not be read.
    InvalidAuthState,
    /// The callback's `state` does not match the cookie.
    CsrfMismatch,
    /// The callback carries neither a code nor a provider error.
    MissingCode,
    /// The auth state could not be stored.
    StateEncoding { details: String },
    /// The session token could not be signed.
    SessionEncoding { details: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAuthState => write!(f, "missing auth state cookie"),
            Self::InvalidAuthState => write!(f, "invalid auth state cookie"),
            Self::CsrfMismatch => write!(f, "CSRF token mismatch"),
            Self::MissingCode => write!(f, "callback has no authorization code"),
            Self::StateEncoding { details } => {
                write!(f, "failed to encode auth state: {details}")
            }
            Self::SessionEncoding { details } => {
                write!(f, "failed to sign session: {details}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing auth state"),
            Self::InvalidAuthState => (StatusCode::BAD_REQUEST, "Invalid auth state"),
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "CSRF token mismatch"),
            Self::MissingCode => (StatusCode::BAD_REQUEST, "Missing authorization code"),
            Self::StateEncoding { .. } | Self::SessionEncoding { .. } => {
                tracing::error!(error = %self, "Authentication failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
        };

        (status, message).into_response()
    }
}

/// Errors in the profile handlers.
#[derive(Debug)]
pub enum ProfileError {
    /// The requested language is not offered.
    UnsupportedLanguage { code: String },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedLanguage { code } => write!(f, "unsupported language '{code}'"),
        }
    }
}

impl std::error::Error for ProfileError {}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        match self {
            Self::UnsupportedLanguage { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
        }
    }
}
