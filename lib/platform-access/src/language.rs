//! Dashboard display language.
//!
//! Staff pick a language in the dashboard; the choice is remembered in a
//! cookie and, when signed in, saved to their profile. Without a saved choice
//! the browser's `Accept-Language` header decides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "ja")]
    Japanese,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 3] = [Self::English, Self::Korean, Self::Japanese];

    /// Returns the language code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Korean => "ko",
            Self::Japanese => "ja",
        }
    }

    /// Returns the language's own name for itself.
    #[must_use]
    pub fn native_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Korean => "한국어",
            Self::Japanese => "日本語",
        }
    }

    /// Looks up a language by its exact code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// Picks a language from an `Accept-Language` header value.
    ///
    /// Only the first (most preferred) entry is considered. Korean and
    /// Japanese are matched by prefix; everything else falls back to English.
    #[must_use]
    pub fn detect(accept_language: &str) -> Self {
        let preferred = accept_language
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if preferred.starts_with("ko") {
            Self::Korean
        } else if preferred.starts_with("ja") {
            Self::Japanese
        } else {
            Self::English
        }
    }

    /// Resolves the language for a request.
    ///
    /// A saved choice wins if it is a supported code, then the browser
    /// preference, then English.
    #[must_use]
    pub fn resolve(saved: Option<&str>, accept_language: Option<&str>) -> Self {
        saved
            .and_then(Self::from_code)
            .or_else(|| accept_language.map(Self::detect))
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported language code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLanguage(pub String);

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = &self.0;
        write!(f, "unsupported language '{code}'")
    }
}

impl std::error::Error for UnsupportedLanguage {}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}
