//! The sign-in callback chain.
//!
//! Three stages run around every authentication cycle:
//!
//! 1. **Validate** ([`CallbackChain::sign_in`]): on initial login, admit or
//!    reject the identity using the [`SignInPolicy`] and the user-status
//!    service, then issue a token stamped with the verdict.
//! 2. **Enrich** ([`CallbackChain::enrich`]): on every token refresh,
//!    re-query the user-status service and overwrite the cached pending flag
//!    and role so they track the latest verdict.
//! 3. **Project** ([`CallbackChain::project`]): copy token fields into the
//!    client-visible [`SessionView`].
//!
//! Validate-stage failures block the login (pending approval excepted).
//! Enrich-stage failures are logged and the previous token fields are kept.

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{AuthCheckRequest, AuthResult, Identity};
use crate::error::AuthenticationError;
use crate::policy::SignInPolicy;
use crate::role::Role;
use crate::service::UserStatusService;
use crate::session::SessionView;
use crate::token::SessionToken;

/// Provider name reported to the user-status service by default.
pub const DEFAULT_PROVIDER: &str = "google";

/// Runs the validate, enrich and project stages.
#[derive(Clone)]
pub struct CallbackChain {
    status: Arc<dyn UserStatusService>,
    policy: SignInPolicy,
    provider: String,
    token_lifetime: Duration,
}

impl CallbackChain {
    /// Creates a chain backed by the given user-status service.
    #[must_use]
    pub fn new(
        status: Arc<dyn UserStatusService>,
        policy: SignInPolicy,
        token_lifetime: Duration,
    ) -> Self {
        Self {
            status,
            policy,
            provider: DEFAULT_PROVIDER.to_string(),
            token_lifetime,
        }
    }

    /// Sets the provider name reported to the user-status service.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Runs the chain for one authentication cycle.
    ///
    /// Without a prior token this is an initial login and runs the validate
    /// stage for `identity`. With a prior token it runs the enrich stage and
    /// `identity` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only for initial logins that the validate stage
    /// rejects, or when there is neither an identity nor a prior token.
    pub async fn run(
        &self,
        identity: Option<&Identity>,
        prior: Option<SessionToken>,
    ) -> Result<SessionToken, AuthenticationError> {
        match (identity, prior) {
            (_, Some(prior)) => Ok(self.enrich(prior).await),
            (Some(identity), None) => self.sign_in(identity).await,
            (None, None) => Err(AuthenticationError::IdentityMissing),
        }
    }

    /// Validate stage: admits or rejects an initial login.
    ///
    /// On success the returned token already carries the verdict from this
    /// stage's user-status call.
    ///
    /// # Errors
    ///
    /// - [`AuthenticationError::IdentityMissing`] if there is no email
    /// - [`AuthenticationError::DomainNotAllowed`] if the allow-list excludes it
    /// - [`AuthenticationError::UpstreamRejected`] if the service denies the
    ///   user, is unreachable, or reports pending while the policy forbids
    ///   pending sign-ins
    pub async fn sign_in(&self, identity: &Identity) -> Result<SessionToken, AuthenticationError> {
        let email = self.policy.admit(identity).inspect_err(|e| {
            warn!(
                email = identity.email.as_deref().unwrap_or_default(),
                error = %e,
                "Sign-in rejected before user-status check"
            );
        })?;

        let mut token = SessionToken::issue(
            email,
            identity.name.clone(),
            identity.image_url.clone(),
            self.token_lifetime,
        );

        if !self.policy.checks_upstream() {
            info!(email = %token.email(), "Sign-in approved by allow-list");
            return Ok(token);
        }

        match self.verdict(&token).await {
            Ok(role) => {
                info!(
                    email = %token.email(),
                    role = role.as_ref().map(Role::as_str).unwrap_or_default(),
                    "Sign-in approved"
                );
                token.set_role(role);
                Ok(token)
            }
            Err(AuthenticationError::UpstreamPending { reason }) if self.policy.allows_pending() => {
                info!(
                    email = %token.email(),
                    reason = %reason,
                    "Account pending approval, allowing sign-in for redirect"
                );
                token.set_pending(true);
                Ok(token)
            }
            Err(AuthenticationError::UpstreamPending { reason }) => {
                warn!(email = %token.email(), reason = %reason, "Sign-in rejected: account pending");
                Err(AuthenticationError::UpstreamRejected {
                    status: Some(403),
                    reason,
                })
            }
            Err(AuthenticationError::UpstreamUnreachable { details }) => {
                warn!(
                    email = %token.email(),
                    error = %details,
                    "Sign-in rejected: user-status service unavailable"
                );
                Err(AuthenticationError::UpstreamRejected {
                    status: None,
                    reason: details,
                })
            }
            Err(e) => {
                warn!(email = %token.email(), error = %e, "Sign-in rejected");
                Err(e)
            }
        }
    }

    /// Enrich stage: refreshes the cached verdict and renews the token.
    ///
    /// Approval clears the pending flag and replaces the role (an approval
    /// without a role keeps the cached one). Pending sets the flag and keeps
    /// the role. Rejection or an unreachable service leaves both untouched.
    pub async fn enrich(&self, mut token: SessionToken) -> SessionToken {
        if self.policy.checks_upstream() {
            match self.verdict(&token).await {
                Ok(role) => {
                    token.set_pending(false);
                    if role.is_some() {
                        token.set_role(role);
                    }
                }
                Err(AuthenticationError::UpstreamPending { .. }) => {
                    token.set_pending(true);
                }
                Err(e) => {
                    warn!(
                        email = %token.email(),
                        error = %e,
                        "Token refresh could not reach a verdict, keeping cached status"
                    );
                }
            }
        }

        debug!(
            email = %token.email(),
            pending = token.is_pending(),
            "Token refreshed"
        );
        token.renewed(self.token_lifetime)
    }

    /// Project stage: builds the client-visible session.
    #[must_use]
    pub fn project(&self, token: &SessionToken) -> SessionView {
        SessionView::from(token)
    }

    /// Asks the user-status service about the token's user.
    ///
    /// Approval yields the returned role; every other outcome is mapped onto
    /// the error taxonomy so each stage can decide what is fatal.
    async fn verdict(&self, token: &SessionToken) -> Result<Option<Role>, AuthenticationError> {
        let request = AuthCheckRequest {
            email: token.email().to_string(),
            name: token.name().map(str::to_string),
            image: token.picture().map(str::to_string),
            provider: self.provider.clone(),
        };

        match self.status.check(&request).await? {
            AuthResult::Approved { role } => Ok(role),
            AuthResult::Pending { reason } => Err(AuthenticationError::UpstreamPending { reason }),
            AuthResult::Rejected { status, reason } => Err(AuthenticationError::UpstreamRejected {
                status: Some(status),
                reason,
            }),
        }
    }
}

impl std::fmt::Debug for CallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackChain")
            .field("policy", &self.policy)
            .field("provider", &self.provider)
            .field("token_lifetime", &self.token_lifetime)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Reply = Result<AuthResult, AuthenticationError>;

    /// Replays scripted replies in order and records every request.
    struct ScriptedStatus {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<AuthCheckRequest>>,
    }

    impl ScriptedStatus {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().expect("requests lock").len()
        }

        fn last_request(&self) -> AuthCheckRequest {
            self.requests
                .lock()
                .expect("requests lock")
                .last()
                .cloned()
                .expect("at least one request")
        }
    }

    #[async_trait]
    impl UserStatusService for ScriptedStatus {
        async fn check(&self, request: &AuthCheckRequest) -> Reply {
            self.requests
                .lock()
                .expect("requests lock")
                .push(request.clone());
            self.replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .expect("unexpected user-status call")
        }
    }

    fn approved(role: &str) -> Reply {
        Ok(AuthResult::Approved {
            role: Some(Role::new(role)),
        })
    }

    fn pending() -> Reply {
        Ok(AuthResult::Pending {
            reason: "User account is pending approval".to_string(),
        })
    }

    fn unreachable() -> Reply {
        Err(AuthenticationError::UpstreamUnreachable {
            details: "connection refused".to_string(),
        })
    }

    fn chain(status: Arc<ScriptedStatus>, policy: SignInPolicy) -> CallbackChain {
        CallbackChain::new(status, policy, Duration::hours(1))
    }

    #[tokio::test]
    async fn missing_email_is_rejected_without_calling_upstream() {
        let status = ScriptedStatus::new([]);
        let chain = chain(status.clone(), SignInPolicy::default());

        let result = chain.sign_in(&Identity::default()).await;

        assert_eq!(result, Err(AuthenticationError::IdentityMissing));
        assert_eq!(status.calls(), 0);
    }

    #[tokio::test]
    async fn excluded_domain_is_rejected_even_if_upstream_would_approve() {
        let status = ScriptedStatus::new([approved("staff")]);
        let chain = chain(status.clone(), SignInPolicy::with_allowed_domains(["x.com"]));

        let result = chain.sign_in(&Identity::new("a@y.com")).await;

        assert!(matches!(
            result,
            Err(AuthenticationError::DomainNotAllowed { .. })
        ));
        assert_eq!(status.calls(), 0);
    }

    #[tokio::test]
    async fn pending_approval_allows_sign_in_and_marks_token() {
        let status = ScriptedStatus::new([pending()]);
        let chain = chain(status, SignInPolicy::default());

        let token = chain
            .sign_in(&Identity::new("new@x.com"))
            .await
            .expect("pending users may sign in");

        assert!(token.is_pending());
        assert!(token.role().is_none());
    }

    #[tokio::test]
    async fn pending_is_rejected_when_policy_forbids_it() {
        let status = ScriptedStatus::new([pending()]);
        let chain = chain(status, SignInPolicy::default().allow_pending(false));

        let result = chain.sign_in(&Identity::new("new@x.com")).await;

        assert!(matches!(
            result,
            Err(AuthenticationError::UpstreamRejected {
                status: Some(403),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn upstream_rejection_blocks_sign_in() {
        let status = ScriptedStatus::new([Ok(AuthResult::Rejected {
            status: 403,
            reason: "User account is disabled".to_string(),
        })]);
        let chain = chain(status, SignInPolicy::default());

        let result = chain.sign_in(&Identity::new("gone@x.com")).await;

        assert_eq!(
            result,
            Err(AuthenticationError::UpstreamRejected {
                status: Some(403),
                reason: "User account is disabled".to_string()
            })
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_fails_closed_at_sign_in() {
        let status = ScriptedStatus::new([unreachable()]);
        let chain = chain(status, SignInPolicy::default());

        let result = chain.sign_in(&Identity::new("a@x.com")).await;

        assert!(matches!(
            result,
            Err(AuthenticationError::UpstreamRejected { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn admin_approval_is_projected_into_session() {
        let status = ScriptedStatus::new([approved("admin")]);
        let chain = chain(status, SignInPolicy::default());

        let token = chain
            .sign_in(&Identity::new("boss@x.com"))
            .await
            .expect("approved");
        let view = chain.project(&token);

        assert_eq!(view.user.role.as_deref(), Some("admin"));
        assert!(!view.user.is_pending);
    }

    #[tokio::test]
    async fn sign_in_sends_identity_to_upstream() {
        let status = ScriptedStatus::new([approved("staff")]);
        let chain = chain(status.clone(), SignInPolicy::default()).with_provider("google");

        let identity = Identity::new("a@x.com")
            .with_name(Some("Alice".to_string()))
            .with_image_url(Some("https://img.example/a.png".to_string()));
        chain.sign_in(&identity).await.expect("approved");

        let request = status.last_request();
        assert_eq!(request.email, "a@x.com");
        assert_eq!(request.name.as_deref(), Some("Alice"));
        assert_eq!(request.image.as_deref(), Some("https://img.example/a.png"));
        assert_eq!(request.provider, "google");
    }

    #[tokio::test]
    async fn allow_list_only_policy_skips_upstream() {
        let status = ScriptedStatus::new([]);
        let chain = chain(
            status.clone(),
            SignInPolicy::with_allowed_domains(["x.com"]).check_upstream(false),
        );

        let token = chain
            .sign_in(&Identity::new("a@x.com"))
            .await
            .expect("approved");
        let token = chain.enrich(token).await;

        assert!(!token.is_pending());
        assert_eq!(status.calls(), 0);
    }

    #[tokio::test]
    async fn enrich_failure_preserves_prior_role() {
        let status = ScriptedStatus::new([approved("staff"), unreachable()]);
        let chain = chain(status.clone(), SignInPolicy::default());

        let token = chain
            .sign_in(&Identity::new("a@x.com"))
            .await
            .expect("approved");
        let refreshed = chain.enrich(token).await;

        assert_eq!(refreshed.role(), Some(&Role::new("staff")));
        assert!(!refreshed.is_pending());
        assert_eq!(status.calls(), 2);
    }

    #[tokio::test]
    async fn enrich_failure_keeps_pending_flag() {
        let status = ScriptedStatus::new([
            pending(),
            Ok(AuthResult::Rejected {
                status: 500,
                reason: "internal error".to_string(),
            }),
        ]);
        let chain = chain(status, SignInPolicy::default());

        let token = chain
            .sign_in(&Identity::new("new@x.com"))
            .await
            .expect("pending allowed");
        let refreshed = chain.enrich(token).await;

        assert!(refreshed.is_pending());
    }

    #[tokio::test]
    async fn enrich_tracks_latest_verdict() {
        let status = ScriptedStatus::new([pending(), approved("guide"), pending()]);
        let chain = chain(status, SignInPolicy::default());

        let token = chain
            .sign_in(&Identity::new("new@x.com"))
            .await
            .expect("pending allowed");
        assert!(token.is_pending());

        let token = chain.enrich(token).await;
        assert!(!token.is_pending());
        assert_eq!(token.role(), Some(&Role::new("guide")));

        let token = chain.enrich(token).await;
        assert!(token.is_pending());
        assert_eq!(token.role(), Some(&Role::new("guide")));
    }

    #[tokio::test]
    async fn approval_without_role_keeps_cached_role() {
        let status = ScriptedStatus::new([approved("staff"), Ok(AuthResult::Approved { role: None })]);
        let chain = chain(status, SignInPolicy::default());

        let token = chain
            .sign_in(&Identity::new("a@x.com"))
            .await
            .expect("approved");
        let token = chain.enrich(token).await;

        assert_eq!(token.role(), Some(&Role::new("staff")));
    }

    #[tokio::test]
    async fn enrich_uses_token_identity() {
        let status = ScriptedStatus::new([approved("staff"), approved("staff")]);
        let chain = chain(status.clone(), SignInPolicy::default());

        let identity = Identity::new("a@x.com").with_name(Some("Alice".to_string()));
        let token = chain.sign_in(&identity).await.expect("approved");
        chain.enrich(token).await;

        let request = status.last_request();
        assert_eq!(request.email, "a@x.com");
        assert_eq!(request.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn run_dispatches_on_prior_token() {
        let status = ScriptedStatus::new([approved("staff"), approved("admin")]);
        let chain = chain(status.clone(), SignInPolicy::default());
        let identity = Identity::new("a@x.com");

        let first = chain.run(Some(&identity), None).await.expect("sign-in");
        assert_eq!(first.role(), Some(&Role::new("staff")));

        let second = chain.run(None, Some(first)).await.expect("refresh");
        assert_eq!(second.role(), Some(&Role::new("admin")));
        assert_eq!(status.calls(), 2);

        assert_eq!(
            chain.run(None, None).await,
            Err(AuthenticationError::IdentityMissing)
        );
    }

    #[tokio::test]
    async fn staff_scenario_with_allow_list() {
        let status = ScriptedStatus::new([approved("staff")]);
        let chain = chain(status, SignInPolicy::with_allowed_domains(["x.com"]));

        let token = chain
            .sign_in(&Identity::new("a@x.com"))
            .await
            .expect("approved");
        let view = chain.project(&token);

        assert_eq!(view.user.email, "a@x.com");
        assert_eq!(view.user.role.as_deref(), Some("staff"));
        assert!(!view.user.is_pending);
    }
}
