//! services/admin_client/src/ui/delete_dialog.rs
//!
//! The confirm/cancel gate in front of product deletion.

use crate::ui::notifications::NotificationChannel;
use inventory_admin_core::domain::Product;
use inventory_admin_core::ports::InventoryApi;
use tracing::{error, info, warn};

const FALLBACK_MESSAGE: &str = "Delete failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteState {
    #[default]
    Idle,
    Confirming {
        product_id: String,
        product_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { product_id: String },
    Failed(String),
    /// Confirm was pressed with nothing pending.
    NothingPending,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteConfirmation {
    state: DeleteState,
}

impl DeleteConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DeleteState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DeleteState::Confirming { .. })
    }

    pub fn open(&mut self, product: &Product) {
        self.state = DeleteState::Confirming {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
        };
    }

    pub fn cancel(&mut self) {
        self.state = DeleteState::Idle;
    }

    /// Sends the delete request. The dialog returns to `Idle` whatever the
    /// outcome; a failure is reported through `notifications`.
    pub async fn confirm(
        &mut self,
        api: &dyn InventoryApi,
        notifications: &NotificationChannel,
    ) -> DeleteOutcome {
        let DeleteState::Confirming { product_id, .. } = std::mem::take(&mut self.state) else {
            error!("Delete confirmed with no product pending");
            return DeleteOutcome::NothingPending;
        };

        match api.delete_product(&product_id).await {
            Ok(()) => {
                info!(%product_id, "Product deleted");
                DeleteOutcome::Deleted { product_id }
            }
            Err(e) => {
                warn!(%product_id, error = %e, "Product deletion failed");
                let message = e.user_message(FALLBACK_MESSAGE);
                notifications.error(message.clone());
                DeleteOutcome::Failed(message)
            }
        }
    }
}
