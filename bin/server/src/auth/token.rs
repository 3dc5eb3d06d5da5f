//! Signing and verification of session tokens.
//!
//! Tokens are HS256 JWTs keyed by the configured signing secret. The claims
//! are [`SessionToken`]; `exp` is enforced on decode.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;
use tourdesk_platform_access::SessionToken;

/// Errors signing or verifying a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The claims could not be signed.
    Encode { details: String },
    /// The token has expired.
    Expired,
    /// The token is malformed or its signature does not verify.
    Invalid { details: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode { details } => write!(f, "failed to sign session token: {details}"),
            Self::Expired => write!(f, "session token has expired"),
            Self::Invalid { details } => write!(f, "invalid session token: {details}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec keyed by `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs the claims into a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if serialization or signing fails.
    pub fn encode(&self, token: &SessionToken) -> tourdesk_core::Result<String, TokenError> {
        let raw = encode(&Header::new(Algorithm::HS256), token, &self.encoding).map_err(|e| {
            TokenError::Encode {
                details: e.to_string(),
            }
        })?;
        Ok(raw)
    }

    /// Verifies a compact JWT and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] past `exp`, or
    /// [`TokenError::Invalid`] for any other verification failure.
    pub fn decode(&self, raw: &str) -> tourdesk_core::Result<SessionToken, TokenError> {
        let data = decode::<SessionToken>(raw, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid {
                    details: e.to_string(),
                },
            }
        })?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
