//! Scope requirements and authorization.
//!
//! A [`ScopeRequirement`] is satisfied when every scope it names is present in
//! the identity's granted scopes. Matching is exact string comparison; there
//! is no hierarchy or wildcard.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::ScopeError;
use crate::identity::Identity;

/// A set of scopes an operation requires (AND semantics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRequirement {
    required: BTreeSet<String>,
}

impl ScopeRequirement {
    /// Creates an empty requirement, which every identity satisfies.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a requirement for a single scope.
    pub fn one(scope: impl Into<String>) -> Self {
        Self::all([scope])
    }

    /// Creates a requirement for all of the given scopes.
    pub fn all(scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            required: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the required scopes.
    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Returns true if nothing is required.
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

/// Checks `identity` against `requirement`.
///
/// An empty requirement always passes. Otherwise every required scope must be
/// granted; the error lists the ones that are not. An identity with no scopes
/// never satisfies a non-empty requirement.
pub fn authorize(identity: &Identity, requirement: &ScopeRequirement) -> Result<(), ScopeError> {
    let missing: BTreeSet<String> = requirement
        .required
        .difference(identity.scopes())
        .cloned()
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    debug!(
        subject = identity.subject_id(),
        missing = ?missing,
        "scope check failed"
    );
    Err(ScopeError::InsufficientScope { missing })
}
