//! Error types for the platform-access crate.
//!
//! Callers wrap these in `rootcause::Report` where they need layered context:
//! - `AuthenticationError`: Sign-in and token refresh failures
//! - `ProfileUpdateError`: Best-effort profile update failures

use std::fmt;

/// Errors from the sign-in callback chain.
///
/// Not every variant blocks a login. `UpstreamPending` lets the user in so
/// they can be shown the pending notice, and `UpstreamUnreachable` is only
/// fatal during the validate stage (see [`crate::CallbackChain::sign_in`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The identity provider did not supply an email address.
    IdentityMissing,
    /// The email domain is not in the configured allow-list.
    DomainNotAllowed { email: String },
    /// The user-status service denied the user for a reason other than
    /// pending approval.
    UpstreamRejected { status: Option<u16>, reason: String },
    /// The user-status service reports the account is awaiting approval.
    UpstreamPending { reason: String },
    /// The user-status service could not be reached or its reply could not
    /// be understood.
    UpstreamUnreachable { details: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityMissing => {
                write!(f, "identity provider returned no email address")
            }
            Self::DomainNotAllowed { email } => {
                write!(f, "email domain of '{email}' is not allowed")
            }
            Self::UpstreamRejected {
                status: Some(status),
                reason,
            } => {
                write!(f, "user-status service rejected sign-in ({status}): {reason}")
            }
            Self::UpstreamRejected {
                status: None,
                reason,
            } => {
                write!(f, "user-status service rejected sign-in: {reason}")
            }
            Self::UpstreamPending { reason } => {
                write!(f, "account is pending approval: {reason}")
            }
            Self::UpstreamUnreachable { details } => {
                write!(f, "user-status service unavailable: {details}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from pushing a profile update to the external API.
///
/// Callers log these and carry on; they never block the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdateError {
    /// The request could not be sent or timed out.
    RequestFailed { details: String },
    /// The service answered with a non-success status.
    Rejected { status: u16, message: String },
}

impl fmt::Display for ProfileUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { details } => {
                write!(f, "profile update request failed: {details}")
            }
            Self::Rejected { status, message } => {
                write!(f, "profile update rejected ({status}): {message}")
            }
        }
    }
}

impl std::error::Error for ProfileUpdateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_missing_display() {
        let err = AuthenticationError::IdentityMissing;
        assert!(err.to_string().contains("no email"));
    }

    #[test]
    fn domain_not_allowed_display() {
        let err = AuthenticationError::DomainNotAllowed {
            email: "a@y.com".to_string(),
        };
        assert!(err.to_string().contains("a@y.com"));
    }

    #[test]
    fn upstream_rejected_display_with_and_without_status() {
        let err = AuthenticationError::UpstreamRejected {
            status: Some(401),
            reason: "unknown user".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("unknown user"));

        let err = AuthenticationError::UpstreamRejected {
            status: None,
            reason: "timed out".to_string(),
        };
        assert!(!err.to_string().contains('('));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn profile_update_error_display() {
        let err = ProfileUpdateError::Rejected {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }
}
