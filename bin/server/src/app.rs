//! HTTP routing for the dashboard server.

use axum::{
    Router, middleware,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::{self, AppState};
use crate::{pages, profile};

/// Builds the application router.
///
/// Every route sits behind the session gate; the gate itself skips API and
/// static paths.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(pages::landing))
        .route("/auth/signin", get(pages::sign_in))
        .route("/auth/pending", get(pages::pending))
        .route("/dashboard", get(pages::dashboard))
        // Auth routes
        .route("/api/auth/login", get(auth::login))
        .route("/api/auth/callback", get(auth::callback))
        .route("/api/auth/logout", get(auth::logout).post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        // Profile
        .route(
            "/api/profile/language",
            get(profile::get_language).put(profile::set_language),
        )
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
