//! Sign-in and route authorization for the tourdesk staff dashboard.
//!
//! This crate provides:
//! - The sign-in callback chain (`CallbackChain`): validate, enrich, project
//! - Signed session token claims (`SessionToken`) and the client-visible
//!   projection (`SessionView`)
//! - The route authorization gate (`RouteGate`)
//! - Admission policy (`SignInPolicy`) and error taxonomy
//! - Service traits for the external user API
//!
//! # Access Model
//!
//! Staff sign in through an OIDC provider. The external user service is the
//! source of truth for whether an account is active or pending approval and
//! which role it holds. That verdict is cached in the session token and
//! re-checked on every token refresh, so approvals and demotions take effect
//! on the next request rather than the next login.
//!
//! # Example
//!
//! ```
//! use chrono::Duration;
//! use tourdesk_core::EmailAddress;
//! use tourdesk_platform_access::{GateDecision, Role, RouteGate, SessionToken, SessionView};
//!
//! let mut token = SessionToken::issue(
//!     EmailAddress::parse("alice@tours.example").unwrap(),
//!     Some("Alice".to_string()),
//!     None,
//!     Duration::days(30),
//! );
//! token.set_role(Some(Role::new("staff")));
//!
//! let gate = RouteGate::new();
//! assert_eq!(gate.evaluate(Some(&token), "/dashboard"), GateDecision::Allow);
//! assert_eq!(
//!     gate.evaluate(None, "/dashboard"),
//!     GateDecision::Redirect("/auth/signin".to_string())
//! );
//!
//! let view = SessionView::from(&token);
//! assert_eq!(view.user.role.as_deref(), Some("staff"));
//! ```

pub mod auth;
pub mod callback;
pub mod error;
pub mod gate;
pub mod language;
pub mod oidc;
pub mod policy;
pub mod role;
pub mod service;
pub mod session;
pub mod token;

// Re-export main types at crate root
pub use auth::{
    AuthCheckRequest, AuthCheckResponse, AuthResult, Identity, PENDING_APPROVAL_MARKER,
    RemoteUser,
};
pub use callback::CallbackChain;
pub use error::{AuthenticationError, ProfileUpdateError};
pub use gate::{AccessState, GateDecision, RouteGate};
pub use language::Language;
pub use oidc::OidcConfig;
pub use policy::SignInPolicy;
pub use role::Role;
pub use service::{ProfileService, ProfileUpdate, UserStatusService};
pub use session::{SessionUser, SessionView};
pub use token::SessionToken;
