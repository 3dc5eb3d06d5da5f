//! Seams to the external user API.
//!
//! The callback chain and the profile endpoint depend on these traits rather
//! than on a concrete HTTP client so they can be exercised without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tourdesk_core::EmailAddress;

use crate::auth::{AuthCheckRequest, AuthResult};
use crate::error::{AuthenticationError, ProfileUpdateError};
use crate::language::Language;

/// Checks a user's status with the external user service.
#[async_trait]
pub trait UserStatusService: Send + Sync {
    /// Returns the service's verdict for the given identity.
    ///
    /// Registers the user on first contact; the service decides whether the
    /// new account is active or pending approval.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::UpstreamUnreachable`] if the service
    /// cannot be reached, times out, or returns an unreadable body. A reply
    /// that denies the user is not an error; it is [`AuthResult::Rejected`].
    async fn check(&self, request: &AuthCheckRequest) -> Result<AuthResult, AuthenticationError>;
}

/// Fields of the signed-in user's profile that the dashboard may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

/// Updates the signed-in user's profile with the external user service.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Pushes a profile update on behalf of `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    async fn update_profile(
        &self,
        email: &EmailAddress,
        update: &ProfileUpdate,
    ) -> Result<(), ProfileUpdateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_omits_unset_fields() {
        let json = serde_json::to_string(&ProfileUpdate::default()).expect("serialize");
        assert_eq!(json, "{}");

        let json = serde_json::to_string(&ProfileUpdate {
            language: Some(Language::Korean),
        })
        .expect("serialize");
        assert_eq!(json, r#"{"language":"ko"}"#);
    }
}
