//! Client-visible session projection.
//!
//! The browser never sees the raw token. Pages and the session endpoint get
//! a [`SessionView`], a read-only copy of the token fields rebuilt on every
//! request.

use serde::{Deserialize, Serialize};

use crate::token::SessionToken;

/// User portion of the client-visible session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub is_pending: bool,
    pub role: Option<String>,
}

/// Client-visible session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub user: SessionUser,
}

impl From<&SessionToken> for SessionView {
    fn from(token: &SessionToken) -> Self {
        Self {
            user: SessionUser {
                name: token.name().map(str::to_string),
                email: token.email().to_string(),
                image: token.picture().map(str::to_string),
                is_pending: token.is_pending(),
                role: token.role().map(|r| r.as_str().to_string()),
            },
        }
    }
}
