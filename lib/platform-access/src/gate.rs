//! Route authorization gate.
//!
//! The gate decides, for every page navigation, whether the request may
//! proceed or must be redirected. It is a pure function of the (already
//! refreshed) session token and the requested path: no I/O, no clock, so it
//! can run on every request and be evaluated repeatedly with the same answer.

use serde::Serialize;

use crate::token::SessionToken;

/// Authentication state of a request as seen by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// No valid session token.
    Anonymous,
    /// Signed in with an approved account.
    AuthenticatedActive,
    /// Signed in, account awaiting approval.
    AuthenticatedPending,
}

impl AccessState {
    /// Derives the state from an optional token.
    #[must_use]
    pub fn of(token: Option<&SessionToken>) -> Self {
        match token {
            None => Self::Anonymous,
            Some(t) if t.is_pending() => Self::AuthenticatedPending,
            Some(_) => Self::AuthenticatedActive,
        }
    }
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through.
    Allow,
    /// Send the browser elsewhere.
    Redirect(String),
}

/// Route layout the gate enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    sign_in_path: String,
    pending_path: String,
    home_path: String,
    public_prefixes: Vec<String>,
    bypass_prefixes: Vec<String>,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self {
            sign_in_path: "/auth/signin".to_string(),
            pending_path: "/auth/pending".to_string(),
            home_path: "/dashboard".to_string(),
            public_prefixes: vec!["/auth".to_string()],
            bypass_prefixes: vec![
                "/api".to_string(),
                "/static".to_string(),
                "/favicon.ico".to_string(),
                "/logo".to_string(),
            ],
        }
    }
}

impl RouteGate {
    /// Creates a gate with the default dashboard layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where signed-in, approved users land.
    #[must_use]
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    /// Returns the sign-in page path.
    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Returns the pending-notice page path.
    #[must_use]
    pub fn pending_path(&self) -> &str {
        &self.pending_path
    }

    /// Returns the home page path for approved users.
    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Returns true if the gate should run for this path at all.
    ///
    /// API routes and static assets are outside the gate's matcher.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        !self
            .bypass_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Returns true if anonymous users may view this path.
    ///
    /// The root and every path under a public prefix are public.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        path == "/"
            || self
                .public_prefixes
                .iter()
                .any(|prefix| is_under(path, prefix))
    }

    /// Decides whether the request proceeds.
    #[must_use]
    pub fn evaluate(&self, token: Option<&SessionToken>, path: &str) -> GateDecision {
        match AccessState::of(token) {
            AccessState::Anonymous if self.is_public(path) => GateDecision::Allow,
            AccessState::Anonymous => GateDecision::Redirect(self.sign_in_path.clone()),
            AccessState::AuthenticatedPending if !self.is_pending_page(path) => {
                GateDecision::Redirect(self.pending_path.clone())
            }
            AccessState::AuthenticatedActive if self.is_pending_page(path) => {
                GateDecision::Redirect(self.home_path.clone())
            }
            AccessState::AuthenticatedPending | AccessState::AuthenticatedActive => {
                GateDecision::Allow
            }
        }
    }

    fn is_pending_page(&self, path: &str) -> bool {
        path.trim_end_matches('/') == self.pending_path
    }
}

/// Returns true if `path` is `prefix` itself or a path segment below it.
fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use chrono::Duration;
    use tourdesk_core::EmailAddress;

    fn token(pending: bool) -> SessionToken {
        let mut token = SessionToken::issue(
            EmailAddress::parse("a@x.com").expect("valid"),
            None,
            None,
            Duration::hours(1),
        );
        token.set_pending(pending);
        token
    }

    const PUBLIC_PATHS: &[&str] = &["/", "/auth", "/auth/signin", "/auth/pending", "/auth/error"];
    const PROTECTED_PATHS: &[&str] = &[
        "/dashboard",
        "/dashboard/tours",
        "/dashboard/bookings",
        "/dashboard/settings",
        "/authors",
        "/reports/auth",
    ];

    #[test]
    fn access_state_from_token() {
        assert_eq!(AccessState::of(None), AccessState::Anonymous);
        assert_eq!(
            AccessState::of(Some(&token(false))),
            AccessState::AuthenticatedActive
        );
        assert_eq!(
            AccessState::of(Some(&token(true))),
            AccessState::AuthenticatedPending
        );
    }

    #[test]
    fn anonymous_allowed_on_public_paths() {
        let gate = RouteGate::new();
        for path in PUBLIC_PATHS {
            assert_eq!(gate.evaluate(None, path), GateDecision::Allow, "{path}");
        }
    }

    #[test]
    fn anonymous_redirected_to_sign_in_on_protected_paths() {
        let gate = RouteGate::new();
        for path in PROTECTED_PATHS {
            assert_eq!(
                gate.evaluate(None, path),
                GateDecision::Redirect("/auth/signin".to_string()),
                "{path}"
            );
        }
    }

    #[test]
    fn pending_user_always_sent_to_pending_page() {
        let gate = RouteGate::new();
        let pending = token(true);
        for path in PROTECTED_PATHS.iter().chain(&["/", "/auth/signin"]) {
            assert_eq!(
                gate.evaluate(Some(&pending), path),
                GateDecision::Redirect("/auth/pending".to_string()),
                "{path}"
            );
        }
        assert_eq!(
            gate.evaluate(Some(&pending), "/auth/pending"),
            GateDecision::Allow
        );
        assert_eq!(
            gate.evaluate(Some(&pending), "/auth/pending/"),
            GateDecision::Allow
        );
    }

    #[test]
    fn active_user_sent_away_from_pending_page() {
        let gate = RouteGate::new();
        assert_eq!(
            gate.evaluate(Some(&token(false)), "/auth/pending"),
            GateDecision::Redirect("/dashboard".to_string())
        );
    }

    #[test]
    fn active_user_allowed_elsewhere() {
        let gate = RouteGate::new();
        let active = token(false);
        for path in PROTECTED_PATHS.iter().chain(&["/", "/auth/signin"]) {
            assert_eq!(gate.evaluate(Some(&active), path), GateDecision::Allow, "{path}");
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let gate = RouteGate::new();
        let pending = token(true);
        let first = gate.evaluate(Some(&pending), "/dashboard");
        let second = gate.evaluate(Some(&pending), "/dashboard");
        assert_eq!(first, second);
    }

    #[test]
    fn staff_scenario_allows_dashboard() {
        let gate = RouteGate::new();
        let mut staff = token(false);
        staff.set_role(Some(Role::new("staff")));
        assert_eq!(gate.evaluate(Some(&staff), "/dashboard"), GateDecision::Allow);
    }

    #[test]
    fn matcher_skips_api_and_assets() {
        let gate = RouteGate::new();
        assert!(!gate.applies_to("/api/auth/session"));
        assert!(!gate.applies_to("/static/app.css"));
        assert!(!gate.applies_to("/favicon.ico"));
        assert!(!gate.applies_to("/logo-lg.png"));
        assert!(gate.applies_to("/dashboard"));
        assert!(gate.applies_to("/"));
    }

    #[test]
    fn custom_home_path() {
        let gate = RouteGate::new().with_home_path("/dashboard/tours");
        assert_eq!(
            gate.evaluate(Some(&token(false)), "/auth/pending"),
            GateDecision::Redirect("/dashboard/tours".to_string())
        );
    }
}
