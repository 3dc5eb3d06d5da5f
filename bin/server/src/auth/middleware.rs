//! Route gate middleware and session extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tourdesk_platform_access::{GateDecision, SessionToken};
use tracing::{debug, error};

use super::AppState;
use crate::config::SessionConfig;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Builds the cookie carrying a signed session token.
pub(crate) fn session_cookie(raw: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, raw))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(config.duration_minutes))
        .build()
}

/// Builds a cookie that clears the session.
pub(crate) fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Decodes the session cookie without contacting the user API.
pub(crate) fn decode_session(state: &AppState, jar: &CookieJar) -> Option<SessionToken> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match state.tokens.decode(cookie.value()) {
        Ok(token) => Some(token),
        Err(report) => {
            debug!(error = %report, "Ignoring unusable session cookie");
            None
        }
    }
}

/// Runs the enrich stage on the request's session and re-signs it.
///
/// Returns the refreshed token, if any, and the jar with the updated cookie.
/// A cookie that fails verification is cleared and the request proceeds as
/// anonymous.
pub async fn refresh_session(state: &AppState, jar: CookieJar) -> (Option<SessionToken>, CookieJar) {
    if jar.get(SESSION_COOKIE).is_none() {
        return (None, jar);
    }

    let Some(prior) = decode_session(state, &jar) else {
        return (None, jar.add(removal_cookie()));
    };

    let refreshed = state.chain.enrich(prior).await;

    match state.tokens.encode(&refreshed) {
        Ok(raw) => {
            let jar = jar.add(session_cookie(raw, &state.session_config));
            (Some(refreshed), jar)
        }
        Err(report) => {
            error!(error = %report, "Failed to re-sign refreshed session");
            (Some(refreshed), jar)
        }
    }
}

/// Middleware enforcing the route gate on page navigations.
///
/// Paths outside the gate's matcher pass straight through. For the rest, the
/// session is refreshed first so the decision sees the latest verdict; the
/// refreshed token is made available to handlers as a request extension.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !state.gate.applies_to(&path) {
        return next.run(request).await;
    }

    let (token, jar) = refresh_session(&state, jar).await;

    match state.gate.evaluate(token.as_ref(), &path) {
        GateDecision::Allow => {
            if let Some(token) = token {
                request.extensions_mut().insert(token);
            }
            (jar, next.run(request).await).into_response()
        }
        GateDecision::Redirect(target) => {
            debug!(path = %path, target = %target, "Route gate redirect");
            (jar, Redirect::to(&target)).into_response()
        }
    }
}

/// Extractor for optionally getting the current session.
///
/// Prefers the token refreshed by [`session_gate`]; outside the gate the
/// cookie is decoded as-is.
pub struct OptionalSession(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for OptionalSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = parts.extensions.get::<SessionToken>() {
            return Ok(OptionalSession(Some(token.clone())));
        }

        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(OptionalSession(decode_session(&app_state, &jar)))
    }
}

/// Extractor for requiring a signed-in user.
///
/// If there is no valid session, the user is redirected to the sign-in page.
pub struct RequireSession(pub SessionToken);

impl<S> FromRequestParts<S> for RequireSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalSession(token) = match OptionalSession::from_request_parts(parts, state).await
        {
            Ok(session) => session,
            Err(never) => match never {},
        };

        match token {
            Some(token) => Ok(RequireSession(token)),
            None => {
                let app_state = Arc::<AppState>::from_ref(state);
                Err(Redirect::to(app_state.gate.sign_in_path()).into_response())
            }
        }
    }
}
