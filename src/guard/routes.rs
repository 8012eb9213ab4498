//! Path-prefix table mapping locations to access requirements.
//!
//! Matching is segment-aware (`/admin` covers `/admin` and `/admin/users`,
//! not `/administrator`) and the longest matching prefix wins, so a broad
//! rule can be narrowed for a sub-tree. Paths with no rule are public.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use super::{AccessGuard, AccessRequirement, Decision};
use crate::store::SessionState;

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<(String, AccessRequirement)>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for `prefix`. Trailing slashes are ignored.
    #[must_use]
    pub fn protect(mut self, prefix: &str, requirement: impl Into<AccessRequirement>) -> Self {
        let prefix = normalize(prefix);
        let requirement = requirement.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == prefix) {
            Some(rule) => rule.1 = requirement,
            None => self.rules.push((prefix, requirement)),
        }
        self
    }

    /// Requirement for `path`, ignoring any query string or fragment.
    #[must_use]
    pub fn requirement_for(&self, path: &str) -> Option<AccessRequirement> {
        let path = normalize(path.split(['?', '#']).next().unwrap_or_default());
        self.rules
            .iter()
            .filter(|(prefix, _)| covers(prefix, &path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, requirement)| *requirement)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl AccessGuard {
    /// Evaluate the rule covering `path`; unprotected paths are always allowed.
    #[must_use]
    pub fn evaluate_path(&self, state: &SessionState, routes: &RouteTable, path: &str) -> Decision {
        match routes.requirement_for(path) {
            Some(requirement) => self.evaluate(state, requirement),
            None => Decision::Allow,
        }
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
