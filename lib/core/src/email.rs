//! Email address type.
//!
//! Staff accounts are keyed by email address. The identity provider hands us
//! a raw string; everything downstream works with a parsed `EmailAddress`
//! so the domain can be checked against the sign-in allow-list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an email address fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input was empty or only whitespace.
    Empty,
    /// The input has no `@` separating local part and domain.
    MissingAt { input: String },
    /// The local part or domain is empty.
    MalformedParts { input: String },
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email address is empty"),
            Self::MissingAt { input } => {
                write!(f, "email address '{input}' has no '@'")
            }
            Self::MalformedParts { input } => {
                write!(f, "email address '{input}' has an empty local part or domain")
            }
        }
    }
}

impl std::error::Error for EmailError {}

/// A syntactically valid email address.
///
/// Only the shape `local@domain` is checked. The original casing is kept for
/// display and for the external user service; domain comparisons are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses an email address, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or not of the form `local@domain`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        let (local, domain) = trimmed
            .rsplit_once('@')
            .ok_or_else(|| EmailError::MissingAt {
                input: trimmed.to_string(),
            })?;

        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MalformedParts {
                input: trimmed.to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part, lowercased.
    #[must_use]
    pub fn domain(&self) -> String {
        self.0
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmailAddress {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_address() {
        let email = EmailAddress::parse("alice@example.com").expect("valid");
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn parse_trims_whitespace() {
        let email = EmailAddress::parse("  bob@x.com \n").expect("valid");
        assert_eq!(email.as_str(), "bob@x.com");
    }

    #[test]
    fn domain_is_lowercased() {
        let email = EmailAddress::parse("Carol@Tours.EXAMPLE").expect("valid");
        assert_eq!(email.domain(), "tours.example");
        assert_eq!(email.to_string(), "Carol@Tours.EXAMPLE");
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(EmailAddress::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn parse_rejects_missing_at() {
        let err = EmailAddress::parse("not-an-email").unwrap_err();
        assert!(matches!(err, EmailError::MissingAt { .. }));
        assert!(err.to_string().contains("not-an-email"));
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(matches!(
            EmailAddress::parse("@x.com"),
            Err(EmailError::MalformedParts { .. })
        ));
        assert!(matches!(
            EmailAddress::parse("a@"),
            Err(EmailError::MalformedParts { .. })
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: EmailAddress = serde_json::from_str("\"a@x.com\"").expect("deserialize");
        assert_eq!(ok.domain(), "x.com");

        let bad: Result<EmailAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
