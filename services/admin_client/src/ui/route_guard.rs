//! services/admin_client/src/ui/route_guard.rs
//!
//! Gates the product-management view behind an authenticated identity.

use inventory_admin_core::domain::Identity;
use inventory_admin_core::session::SessionStore;
use std::sync::Arc;
use tracing::info;

/// The views the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    SignUp,
    Products,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Resolving,
    Authenticated,
    Unauthenticated,
}

/// What the guarded slot should render.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardView {
    /// Identity resolution is pending; children must not render.
    Placeholder,
    Redirect(Route),
    Protected(Identity),
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
    state: GuardState,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            state: GuardState::Resolving,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Re-reads the session and decides what to render.
    ///
    /// Once the guard has left `Resolving` it never returns to it.
    pub fn evaluate(&mut self) -> GuardView {
        let snapshot = self.session.current();
        if self.state == GuardState::Resolving && snapshot.resolving {
            return GuardView::Placeholder;
        }

        let next = if snapshot.identity.is_some() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        };
        if next != self.state {
            info!(from = ?self.state, to = ?next, "Route guard transition");
            self.state = next;
        }

        match snapshot.identity {
            Some(identity) => GuardView::Protected(identity),
            None => GuardView::Redirect(Route::SignIn),
        }
    }
}
