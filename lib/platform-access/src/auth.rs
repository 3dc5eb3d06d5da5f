//! Identity and user-status verdict types.
//!
//! An [`Identity`] is what the identity provider tells us about the person
//! signing in. The external user-status service turns an identity into an
//! [`AuthResult`], which the callback chain uses to admit, park or reject
//! the user.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Marker the user-status service puts in its error message when an account
/// exists but has not been approved by an administrator yet.
pub const PENDING_APPROVAL_MARKER: &str = "pending approval";

/// Identity returned by the identity provider after login.
///
/// Immutable for the lifetime of a login. Email is the unique key; a
/// provider that returns no email cannot be signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    /// Email address, as supplied by the provider.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub image_url: Option<String>,
}

impl Identity {
    /// Creates an identity with only an email address.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: None,
            image_url: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the profile picture URL.
    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

/// Request body for the user-status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCheckRequest {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub provider: String,
}

/// User record embedded in a successful user-status response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Response body of the user-status check.
///
/// Success responses carry `user`; failures carry `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    #[serde(default)]
    pub user: Option<RemoteUser>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Verdict of the user-status service for one identity.
///
/// Not persisted; recomputed every time the token is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// The user is active. The role may be absent if the service omitted it.
    Approved { role: Option<Role> },
    /// The account exists but awaits administrator approval.
    Pending { reason: String },
    /// The service denied the user.
    Rejected { status: u16, reason: String },
}

impl AuthResult {
    /// Classifies a user-status response by HTTP status and body.
    ///
    /// `2xx` is approval, `403` whose error mentions pending approval is the
    /// distinguished pending outcome, and anything else is a rejection.
    #[must_use]
    pub fn from_response(status: u16, body: AuthCheckResponse) -> Self {
        if (200..300).contains(&status) {
            return Self::Approved {
                role: body.user.and_then(|u| u.role),
            };
        }

        let reason = body
            .error
            .unwrap_or_else(|| format!("user-status service returned {status}"));

        if status == 403 && reason.contains(PENDING_APPROVAL_MARKER) {
            Self::Pending { reason }
        } else {
            Self::Rejected { status, reason }
        }
    }

    /// Returns true if this is the pending outcome.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}
