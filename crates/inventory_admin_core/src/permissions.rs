//! crates/inventory_admin_core/src/permissions.rs
//!
//! The single source of truth for role-gated catalog mutations. Both button
//! enablement and the action handlers ask `can_mutate`.

use crate::domain::{Identity, Role};

/// A catalog mutation a user may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Create,
    Edit,
    Delete,
}

impl MutationAction {
    /// Notification text shown when the action is refused.
    pub fn denied_message(self) -> &'static str {
        match self {
            MutationAction::Create => "You do not have permission to create products",
            MutationAction::Edit => "You do not have permission to edit this product",
            MutationAction::Delete => "You do not have permission to delete this product",
        }
    }
}

/// Whether `identity` may perform `action`. Anonymous visitors never may.
pub fn can_mutate(identity: Option<&Identity>, action: MutationAction) -> bool {
    match action {
        MutationAction::Create | MutationAction::Edit | MutationAction::Delete => {
            identity.is_some_and(|identity| identity.role == Role::Superuser)
        }
    }
}
