//! Access guard: pure render/redirect decisions for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! The view layer asks [`AccessGuard::evaluate`] before rendering anything
//! protected and performs the navigation itself. Nothing here does I/O or
//! touches session state.
//!
//! While the session is still resolving the answer is always
//! [`Decision::Indeterminate`]: redirecting at that point would bounce a
//! logged-in user to the login view on every refresh. Unauthenticated users
//! go to the login view; authenticated users with the wrong role go to the
//! home view, never to login.

pub mod routes;


use crate::identity::{Role, RoleSet};
use crate::store::SessionState;

/// What a protected view demands of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequirement {
    AnyAuthenticated,
    /// Role must be a member of the (non-empty) set.
    Roles(RoleSet),
}

impl AccessRequirement {
    #[must_use]
    pub fn roles(first: Role, rest: &[Role]) -> Self {
        Self::Roles(RoleSet::of(first, rest))
    }
}

impl From<RoleSet> for AccessRequirement {
    fn from(roles: RoleSet) -> Self {
        Self::Roles(roles)
    }
}

impl From<Role> for AccessRequirement {
    fn from(role: Role) -> Self {
        Self::Roles(RoleSet::single(role))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    DenyRedirectTo(String),
    /// Session still resolving; render a neutral waiting state.
    Indeterminate,
}

impl Decision {
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::DenyRedirectTo(target) => Some(target),
            _ => None,
        }
    }

    /// False only for `Indeterminate`, which must be re-evaluated later.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Indeterminate)
    }
}

/// Redirect destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Views {
    login: String,
    home: String,
}

impl Views {
    #[must_use]
    pub fn new(login: impl Into<String>, home: impl Into<String>) -> Self {
        Self { login: login.into(), home: home.into() }
    }

    /// Where anonymous users are sent.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Where authenticated users lacking a role are sent.
    #[must_use]
    pub fn home(&self) -> &str {
        &self.home
    }
}

#[derive(Debug, Clone)]
pub struct AccessGuard {
    views: Views,
}

impl AccessGuard {
    #[must_use]
    pub fn new(views: Views) -> Self {
        Self { views }
    }

    #[must_use]
    pub fn views(&self) -> &Views {
        &self.views
    }

    #[must_use]
    pub fn evaluate(&self, state: &SessionState, requirement: AccessRequirement) -> Decision {
        if state.resolving {
            return Decision::Indeterminate;
        }
        let Some(identity) = &state.identity else {
            return Decision::DenyRedirectTo(self.views.login.clone());
        };
        match requirement {
            AccessRequirement::AnyAuthenticated => Decision::Allow,
            AccessRequirement::Roles(roles) if identity.has_role_in(roles) => Decision::Allow,
            AccessRequirement::Roles(_) => Decision::DenyRedirectTo(self.views.home.clone()),
        }
    }
}
