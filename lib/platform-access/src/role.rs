//! Staff role as assigned by the external user service.
//!
//! The dashboard does not define its own role catalogue; it carries whatever
//! role string the user-status service returns (e.g. "admin", "staff",
//! "guide") and only interprets the admin role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role name that grants administrative capabilities.
pub const ADMIN_ROLE: &str = "admin";

/// A staff role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a role from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.eq_ignore_ascii_case(ADMIN_ROLE)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
