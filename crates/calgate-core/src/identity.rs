//! Authenticated identity and the per-request context that carries it.
//!
//! An [`Identity`] is created by the authentication gateway once an inbound
//! bearer credential has been validated. It is immutable and travels with a
//! single request inside a [`RequestContext`].
//!
//! The context is an explicit value owned by whoever services the request.
//! Nothing here is global or thread-local: a child execution receives its own
//! copy through [`RequestContext::fork`], and [`ContextScope`] clears the
//! context when the request ends, whichever way it ends.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

use tracing::trace;

use crate::error::MissingIdentity;

/// A validated caller identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    subject_id: String,
    scopes: BTreeSet<String>,
    raw_inbound_token: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(
        subject_id: impl Into<String>,
        scopes: impl IntoIterator<Item = impl Into<String>>,
        raw_inbound_token: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
            raw_inbound_token: raw_inbound_token.into(),
        }
    }

    /// Returns the subject (user) identifier.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Returns the granted scopes.
    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    /// Returns true if the identity was granted `scope`.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Returns the inbound bearer token, without the `Bearer ` prefix.
    pub fn raw_inbound_token(&self) -> &str {
        &self.raw_inbound_token
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject_id", &self.subject_id)
            .field("scopes", &self.scopes)
            .field("raw_inbound_token", &"[redacted]")
            .finish()
    }
}

/// Request-scoped holder of the authenticated identity.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Identity>,
}

impl RequestContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates an identity with this request, replacing any previous one.
    pub fn set(&mut self, identity: Identity) {
        trace!(subject = identity.subject_id(), "identity attached");
        self.identity = Some(identity);
    }

    /// Returns the identity attached to this request.
    pub fn get(&self) -> Result<&Identity, MissingIdentity> {
        self.identity.as_ref().ok_or(MissingIdentity)
    }

    /// Removes the identity, if any.
    pub fn clear(&mut self) {
        if self.identity.take().is_some() {
            trace!("identity cleared");
        }
    }

    /// Returns true if an identity is attached.
    pub fn is_set(&self) -> bool {
        self.identity.is_some()
    }

    /// Returns an independent copy of this context for a child execution.
    ///
    /// The child owns its copy; clearing either side does not affect the
    /// other.
    pub fn fork(&self) -> RequestContext {
        self.clone()
    }

    /// Starts a request on this context.
    ///
    /// The identity (if any) is attached for the lifetime of the returned
    /// scope and the context is cleared when the scope is dropped.
    pub fn enter(&mut self, identity: Option<Identity>) -> ContextScope<'_> {
        match identity {
            Some(identity) => self.set(identity),
            None => self.clear(),
        }
        ContextScope { context: self }
    }
}

/// Guard returned by [`RequestContext::enter`]; clears the context on drop.
#[derive(Debug)]
pub struct ContextScope<'a> {
    context: &'a mut RequestContext,
}

impl Deref for ContextScope<'_> {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.context.clear();
    }
}
