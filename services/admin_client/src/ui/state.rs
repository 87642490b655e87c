//! services/admin_client/src/ui/state.rs
//!
//! Defines the ambient state shared by every controller.

use crate::config::Config;
use crate::ui::notifications::NotificationChannel;
use inventory_admin_core::ports::{InventoryApi, SessionPersistence};
use inventory_admin_core::session::SessionStore;
use std::sync::Arc;

//=========================================================================================
// AppContext (Shared Across All Controllers)
//=========================================================================================

/// Created once at startup and handed to each controller that needs it.
/// Every field is a shared handle, so cloning is cheap.
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn InventoryApi>,
    pub session: Arc<SessionStore>,
    pub persistence: Arc<dyn SessionPersistence>,
    pub notifications: Arc<NotificationChannel>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(
        config: Arc<Config>,
        api: Arc<dyn InventoryApi>,
        session: Arc<SessionStore>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        let notifications = Arc::new(NotificationChannel::new(config.toast_duration));
        Self {
            api,
            session,
            persistence,
            notifications,
            config,
        }
    }
}
