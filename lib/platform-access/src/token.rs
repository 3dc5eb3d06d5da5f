//! Session token claims.
//!
//! The session token is signed by the server and carried by the browser in
//! an HTTP-only cookie. It caches the user's identity and the last verdict of
//! the user-status service. Only the enrich stage of the callback chain
//! changes the cached verdict; every request renews the expiry.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tourdesk_core::EmailAddress;

use crate::role::Role;

/// Claims carried by the signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// The signed-in user's email address.
    email: EmailAddress,
    /// Display name from the identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Profile picture URL from the identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    picture: Option<String>,
    /// Whether the account is awaiting administrator approval.
    #[serde(default)]
    is_pending: bool,
    /// Role from the most recent approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_role: Option<Role>,
    /// Issued-at, seconds since the Unix epoch.
    iat: i64,
    /// Expiry, seconds since the Unix epoch.
    exp: i64,
}

impl SessionToken {
    /// Issues a fresh token valid for `lifetime`.
    #[must_use]
    pub fn issue(
        email: EmailAddress,
        name: Option<String>,
        picture: Option<String>,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            email,
            name,
            picture,
            is_pending: false,
            user_role: None,
            iat: now,
            exp: now + lifetime.num_seconds(),
        }
    }

    /// Returns the user's email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the display name, if known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the profile picture URL, if known.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Returns true if the account is awaiting approval.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    /// Returns the cached role, if any.
    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.user_role.as_ref()
    }

    /// Sets the pending flag.
    pub fn set_pending(&mut self, pending: bool) {
        self.is_pending = pending;
    }

    /// Replaces the cached role.
    pub fn set_role(&mut self, role: Option<Role>) {
        self.user_role = role;
    }

    /// Restarts the token lifetime from now.
    #[must_use]
    pub fn renewed(mut self, lifetime: Duration) -> Self {
        let now = Utc::now().timestamp();
        self.iat = now;
        self.exp = now + lifetime.num_seconds();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).expect("valid email")
    }

    #[test]
    fn issued_token_is_active_and_roleless() {
        let token = SessionToken::issue(
            email("a@x.com"),
            Some("Alice".to_string()),
            None,
            Duration::hours(1),
        );

        assert_eq!(token.email().as_str(), "a@x.com");
        assert_eq!(token.name(), Some("Alice"));
        assert!(token.picture().is_none());
        assert!(!token.is_pending());
        assert!(token.role().is_none());
        assert_eq!(token.exp - token.iat, 3600);
    }

    #[test]
    fn renewed_pushes_expiry_forward() {
        let token = SessionToken::issue(email("a@x.com"), None, None, Duration::seconds(1));
        let old_exp = token.exp;

        let renewed = token.renewed(Duration::hours(2));
        assert!(renewed.exp > old_exp);
        assert_eq!(renewed.exp - renewed.iat, 7200);
        assert_eq!(renewed.email().as_str(), "a@x.com");
    }

    #[test]
    fn serializes_with_camel_case_claims() {
        let mut token = SessionToken::issue(email("a@x.com"), None, None, Duration::hours(1));
        token.set_pending(true);
        token.set_role(Some(Role::new("staff")));

        let json = serde_json::to_value(&token).expect("serialize");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["isPending"], true);
        assert_eq!(json["userRole"], "staff");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn deserializes_token_without_optional_claims() {
        let json = r#"{"email": "a@x.com", "iat": 1, "exp": 2}"#;
        let token: SessionToken = serde_json::from_str(json).expect("deserialize");
        assert!(!token.is_pending());
        assert!(token.role().is_none());
    }
}
