//! Authentication routes for login, callback, logout and session lookup.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tourdesk_platform_access::SessionView;
use tracing::{info, warn};

use super::{
    AppState,
    middleware::{refresh_session, removal_cookie, session_cookie},
    oidc::AuthState,
};
use crate::error::AuthError;

/// Auth state cookie name (for CSRF protection during OIDC flow).
const AUTH_STATE_COOKIE: &str = "auth_state";

/// Error code appended to the sign-in page when a login is refused.
pub const ACCESS_DENIED: &str = "AccessDenied";

/// Query parameters for the OIDC callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Initiates the OIDC login flow by redirecting to the identity provider.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let (auth_url, auth_state) = state.identity_provider.authorization_url();

    // Store the auth state in a secure cookie for validation on callback
    let auth_state_json = serde_json::to_string(&AuthStateData {
        csrf_token: auth_state.csrf_token,
        pkce_verifier: auth_state.pkce_verifier,
        nonce: auth_state.nonce,
    })
    .map_err(|e| AuthError::StateEncoding {
        details: e.to_string(),
    })?;

    let cookie = Cookie::build((AUTH_STATE_COOKIE, auth_state_json))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    Ok((jar.add(cookie), Redirect::to(&auth_url)))
}

/// Handles the OIDC callback after the user authenticates with the identity provider.
///
/// Runs the validate stage. An admitted user gets a session cookie and lands
/// on the home page, or on the pending notice if the account awaits approval.
/// A refused login goes back to the sign-in page with an error code.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let remove_auth_state = Cookie::build((AUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);
    let sign_in = state.gate.sign_in_path();
    let denied = format!("{sign_in}?error={ACCESS_DENIED}");

    if let Some(error) = query.error {
        warn!(error = %error, "Identity provider returned an error");
        return Ok((jar.add(remove_auth_state), Redirect::to(&denied)));
    }

    // Retrieve and validate auth state from cookie
    let auth_state_cookie = jar
        .get(AUTH_STATE_COOKIE)
        .ok_or(AuthError::MissingAuthState)?;

    let auth_state_data: AuthStateData =
        serde_json::from_str(auth_state_cookie.value()).map_err(|_| AuthError::InvalidAuthState)?;

    // Validate CSRF token
    if query.state.as_deref() != Some(auth_state_data.csrf_token.as_str()) {
        return Err(AuthError::CsrfMismatch);
    }

    let code = query.code.ok_or(AuthError::MissingCode)?;

    let auth_state = AuthState {
        csrf_token: auth_state_data.csrf_token,
        pkce_verifier: auth_state_data.pkce_verifier,
        nonce: auth_state_data.nonce,
    };

    let identity = match state
        .identity_provider
        .exchange_code(&code, &auth_state)
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "Token exchange failed");
            return Ok((jar.add(remove_auth_state), Redirect::to(&denied)));
        }
    };

    let token = match state.chain.sign_in(&identity).await {
        Ok(token) => token,
        Err(e) => {
            info!(error = %e, "Sign-in refused");
            return Ok((jar.add(remove_auth_state), Redirect::to(&denied)));
        }
    };

    let raw = state
        .tokens
        .encode(&token)
        .map_err(|report| AuthError::SessionEncoding {
            details: report.to_string(),
        })?;

    let landing = if token.is_pending() {
        state.gate.pending_path()
    } else {
        state.gate.home_path()
    };

    let jar = jar
        .add(session_cookie(raw, &state.session_config))
        .add(remove_auth_state);

    Ok((jar, Redirect::to(landing)))
}

/// Signs the user out by clearing the session cookie.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(removal_cookie()),
        Redirect::to(state.gate.sign_in_path()),
    )
}

/// Returns the refreshed client-visible session, or `null` when signed out.
pub async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<Option<SessionView>>) {
    let (token, jar) = refresh_session(&state, jar).await;
    let view = token.as_ref().map(|t| state.chain.project(t));
    (jar, Json(view))
}

/// Serializable auth state for cookie storage.
#[derive(Debug, Serialize, Deserialize)]
struct AuthStateData {
    csrf_token: String,
    pkce_verifier: String,
    nonce: String,
}
