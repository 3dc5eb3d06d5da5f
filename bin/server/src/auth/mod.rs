//! Authentication module for the tourdesk server.
//!
//! This module provides:
//! - OIDC authentication with the staff identity provider
//! - Signed, stateless session tokens carried in a cookie
//! - The route gate middleware and session extractors for Axum routes
//!
//! # Session Model
//!
//! The session lives entirely in an HS256-signed cookie. On every gated
//! navigation the middleware decodes it, runs the enrich stage of the
//! [`CallbackChain`] (one call to the user API), re-signs the refreshed
//! token, and only then lets the [`RouteGate`] decide. Approvals and
//! demotions therefore take effect on the next page load.

pub mod middleware;
pub mod oidc;
pub mod routes;
pub mod token;

use std::sync::Arc;
use tourdesk_platform_access::{CallbackChain, ProfileService, RouteGate};

use crate::config::SessionConfig;

pub use middleware::{OptionalSession, RequireSession, session_gate};
pub use oidc::{IdentityProvider, OidcClient};
pub use routes::{callback, login, logout, session};
pub use token::TokenCodec;

/// Shared application state.
pub struct AppState {
    /// Validate, enrich and project stages.
    pub chain: CallbackChain,
    /// Route authorization rules.
    pub gate: RouteGate,
    /// Session token signer.
    pub tokens: TokenCodec,
    /// OIDC identity provider.
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Profile updates on the user API.
    pub profiles: Arc<dyn ProfileService>,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        chain: CallbackChain,
        identity_provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileService>,
        session_config: SessionConfig,
    ) -> Self {
        let tokens = TokenCodec::new(&session_config.signing_secret);
        Self {
            chain,
            gate: RouteGate::new(),
            tokens,
            identity_provider,
            profiles,
            session_config,
        }
    }
}
