//! Authenticated principal and role model.
//!
//! DESIGN
//! ======
//! `Identity` is the one canonical shape of "the logged-in user". It is only
//! ever produced by the gateway's normalization step, so guard and view code
//! never see backend field-naming drift. Roles form a closed set; `RoleSet`
//! is a bitmask that cannot be empty.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Technician,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Employee, Role::Technician, Role::Customer];

    /// Lower-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
            Self::Technician => "technician",
            Self::Customer => "customer",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Admin => 1,
            Self::Employee => 1 << 1,
            Self::Technician => 1 << 2,
            Self::Customer => 1 << 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            "technician" => Ok(Self::Technician),
            "customer" => Ok(Self::Customer),
            _ => Err(UnknownRole(raw.to_owned())),
        }
    }
}

// =============================================================================
// ROLE SET
// =============================================================================

/// Non-empty set of roles.
///
/// There is no empty constructor, so a role requirement that admits nobody
/// cannot be built.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    #[must_use]
    pub fn single(role: Role) -> Self {
        Self(role.bit())
    }

    /// `first` plus any number of additional roles (duplicates are harmless).
    #[must_use]
    pub fn of(first: Role, rest: &[Role]) -> Self {
        Self(rest.iter().fold(first.bit(), |bits, role| bits | role.bit()))
    }

    #[must_use]
    pub fn all() -> Self {
        Self::of(Role::Admin, &Role::ALL)
    }

    #[must_use]
    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    #[must_use]
    pub fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Never true for a constructed set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self::single(role)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The resolved authenticated principal.
///
/// Replaced wholesale on every resolution; never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Backend identifier, stringified if the backend sends a number.
    pub id: String,
    /// Canonical (trimmed, lower-cased) email.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

impl Identity {
    /// "First Last", falling back to whichever part exists, then the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() { self.email.clone() } else { full.to_owned() }
    }

    /// Case-insensitive email comparison.
    #[must_use]
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    #[must_use]
    pub fn has_role_in(&self, roles: RoleSet) -> bool {
        roles.contains(self.role)
    }
}

/// Trim and lower-case an email; `None` unless it has exactly one `@` with
/// non-empty parts on both sides.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let mut parts = normalized.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Some(normalized),
        _ => None,
    }
}
