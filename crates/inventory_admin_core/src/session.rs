//! crates/inventory_admin_core/src/session.rs
//!
//! The process-wide holder of the authenticated identity.
//!
//! The store never validates token freshness and never clears itself when a
//! request fails; reacting to an expired credential is the caller's job.

use crate::domain::Identity;
use std::sync::{PoisonError, RwLock};

/// What the store holds at a given moment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    /// True only until the initial bootstrap has run.
    pub resolving: bool,
}

#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<SessionSnapshot>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// A store whose identity has not been resolved yet.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionSnapshot {
                identity: None,
                resolving: true,
            }),
        }
    }

    /// A store that skips the resolving phase.
    pub fn resolved(identity: Option<Identity>) -> Self {
        Self {
            inner: RwLock::new(SessionSnapshot {
                identity,
                resolving: false,
            }),
        }
    }

    /// Ends the resolving phase with whatever the bootstrap found.
    ///
    /// Returns `false` and changes nothing if the phase already ended; there is
    /// no way back into resolving.
    pub fn finish_resolving(&self, identity: Option<Identity>) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.resolving {
            return false;
        }
        guard.identity = identity;
        guard.resolving = false;
        true
    }

    /// Replaces the current identity unconditionally.
    pub fn establish(&self, identity: Identity) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.identity = Some(identity);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.identity = None;
    }

    pub fn current(&self) -> SessionSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current().identity
    }

    /// The bearer credential to attach to outgoing requests.
    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .identity
            .as_ref()
            .and_then(|identity| identity.token.clone())
    }
}
