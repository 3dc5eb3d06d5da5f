//! Sign-in admission policy.
//!
//! Deployments differ in how strictly they gate sign-in: some only trust a
//! set of company email domains, some rely entirely on the external user
//! service to register and approve staff, and most combine both. This policy
//! captures those choices in one place.

use serde::{Deserialize, Serialize};
use tourdesk_core::EmailAddress;

use crate::auth::Identity;
use crate::error::AuthenticationError;

/// Configuration for admitting users at sign-in.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInPolicy {
    /// Allowed email domains as a comma-separated string.
    /// Empty means any domain is accepted.
    #[serde(default)]
    allowed_domains: String,
    /// Whether the external user service is consulted at sign-in and on
    /// every token refresh.
    /// Default: true
    #[serde(default = "default_true")]
    check_upstream: bool,
    /// Whether accounts awaiting approval may sign in to see the pending
    /// notice. When false, pending accounts are rejected outright.
    /// Default: true
    #[serde(default = "default_true")]
    allow_pending: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SignInPolicy {
    fn default() -> Self {
        Self {
            allowed_domains: String::new(),
            check_upstream: true,
            allow_pending: true,
        }
    }
}

impl SignInPolicy {
    /// Creates a policy restricted to the given domains.
    #[must_use]
    pub fn with_allowed_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self {
            allowed_domains,
            ..Self::default()
        }
    }

    /// Sets whether the external user service is consulted.
    #[must_use]
    pub fn check_upstream(mut self, check: bool) -> Self {
        self.check_upstream = check;
        self
    }

    /// Sets whether pending accounts may sign in.
    #[must_use]
    pub fn allow_pending(mut self, allow: bool) -> Self {
        self.allow_pending = allow;
        self
    }

    /// Returns the allowed domains, lowercased. Empty means unrestricted.
    #[must_use]
    pub fn allowed_domains(&self) -> Vec<String> {
        self.allowed_domains
            .split(',')
            .map(|d| d.trim().trim_start_matches('@').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect()
    }

    /// Returns true if the external user service should be consulted.
    #[must_use]
    pub fn checks_upstream(&self) -> bool {
        self.check_upstream
    }

    /// Returns true if pending accounts may sign in.
    #[must_use]
    pub fn allows_pending(&self) -> bool {
        self.allow_pending
    }

    /// Returns true if the email's domain passes the allow-list.
    #[must_use]
    pub fn admits_domain(&self, email: &EmailAddress) -> bool {
        let allowed = self.allowed_domains();
        allowed.is_empty() || allowed.contains(&email.domain())
    }

    /// Runs the local admission checks that precede any external call.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::IdentityMissing`] if the identity has
    /// no usable email, or [`AuthenticationError::DomainNotAllowed`] if the
    /// domain is not allowed.
    pub fn admit(&self, identity: &Identity) -> Result<EmailAddress, AuthenticationError> {
        let email = identity
            .email
            .as_deref()
            .and_then(|raw| EmailAddress::parse(raw).ok())
            .ok_or(AuthenticationError::IdentityMissing)?;

        if !self.admits_domain(&email) {
            return Err(AuthenticationError::DomainNotAllowed {
                email: email.to_string(),
            });
        }

        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_unrestricted() {
        let policy = SignInPolicy::default();
        assert!(policy.allowed_domains().is_empty());
        assert!(policy.checks_upstream());
        assert!(policy.allows_pending());

        let email = policy.admit(&Identity::new("a@anywhere.org")).expect("admit");
        assert_eq!(email.as_str(), "a@anywhere.org");
    }

    #[test]
    fn allowed_domains_are_normalized() {
        let policy: SignInPolicy =
            serde_json::from_str(r#"{"allowed_domains": " X.com, @tours.example ,,"}"#)
                .expect("deserialize");
        assert_eq!(policy.allowed_domains(), vec!["x.com", "tours.example"]);
    }

    #[test]
    fn admit_rejects_missing_email() {
        let policy = SignInPolicy::default();
        assert_eq!(
            policy.admit(&Identity::default()),
            Err(AuthenticationError::IdentityMissing)
        );
        assert_eq!(
            policy.admit(&Identity::new("   ")),
            Err(AuthenticationError::IdentityMissing)
        );
    }

    #[test]
    fn admit_rejects_foreign_domain() {
        let policy = SignInPolicy::with_allowed_domains(["x.com"]);
        assert_eq!(
            policy.admit(&Identity::new("a@y.com")),
            Err(AuthenticationError::DomainNotAllowed {
                email: "a@y.com".to_string()
            })
        );
    }

    #[test]
    fn admit_matches_domain_case_insensitively() {
        let policy = SignInPolicy::with_allowed_domains(["x.com", "tours.example"]);
        assert!(policy.admit(&Identity::new("a@X.COM")).is_ok());
        assert!(policy.admit(&Identity::new("b@tours.example")).is_ok());
    }

    #[test]
    fn subdomains_are_not_implicitly_allowed() {
        let policy = SignInPolicy::with_allowed_domains(["x.com"]);
        assert!(policy.admit(&Identity::new("a@mail.x.com")).is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let policy: SignInPolicy = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(policy, SignInPolicy::default());
    }
}
