//! Interface language preference.
//!
//! The preference lives in a long-lived cookie so it applies before sign-in.
//! Signed-in users also have it pushed to their profile on the user API; that
//! push is best-effort and never fails the request.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tourdesk_platform_access::language::UnsupportedLanguage;
use tourdesk_platform_access::{Language, ProfileUpdate};
use tracing::{debug, warn};

use crate::auth::{AppState, OptionalSession};
use crate::error::ProfileError;

/// Language preference cookie name.
pub const LANGUAGE_COOKIE: &str = "language";

/// Resolves the interface language from the cookie, then the browser.
pub fn request_language(jar: &CookieJar, headers: &HeaderMap) -> Language {
    let saved = jar.get(LANGUAGE_COOKIE).map(|c| c.value());
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    Language::resolve(saved, accept)
}

/// Body of a language change.
#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    language: String,
}

/// Current language and the choices on offer.
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    language: Language,
    available: Vec<LanguageOption>,
}

/// One selectable language.
#[derive(Debug, Serialize)]
pub struct LanguageOption {
    code: &'static str,
    name: &'static str,
}

/// Returns the resolved interface language.
pub async fn get_language(jar: CookieJar, headers: HeaderMap) -> Json<LanguageResponse> {
    Json(LanguageResponse {
        language: request_language(&jar, &headers),
        available: Language::ALL
            .iter()
            .map(|l| LanguageOption {
                code: l.code(),
                name: l.native_name(),
            })
            .collect(),
    })
}

/// Changes the interface language.
pub async fn set_language(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
    jar: CookieJar,
    Json(body): Json<LanguageRequest>,
) -> Result<impl IntoResponse, ProfileError> {
    let language: Language = body
        .language
        .parse()
        .map_err(|e: UnsupportedLanguage| ProfileError::UnsupportedLanguage { code: e.0 })?;

    if let Some(token) = session {
        let update = ProfileUpdate {
            language: Some(language),
        };
        match state.profiles.update_profile(token.email(), &update).await {
            Ok(()) => debug!(email = %token.email(), language = %language, "Saved language"),
            Err(e) => {
                warn!(email = %token.email(), error = %e, "Failed to save language to profile")
            }
        }
    }

    let cookie = Cookie::build((LANGUAGE_COOKIE, language.code()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::days(365));

    Ok((jar.add(cookie), StatusCode::NO_CONTENT))
}
