//! crates/inventory_admin_core/src/ports.rs
//!
//! Defines the service contracts (traits) the admin client's controllers depend on.
//! The REST gateway and the identity persistence live behind these traits so the
//! controllers can be driven against in-memory substitutes.

use async_trait::async_trait;
use crate::domain::{
    Credentials, Identity, Product, ProductFilters, ProductPage, ProductSubmission,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    /// The server answered with a non-2xx status.
    #[error("Request failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Request { status: u16, message: Option<String> },
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),
    /// The response or local state could not be interpreted.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The text to show the user: the server's structured message when there is
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            PortError::Request {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PortError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// One operation per server action. Implementations attach the current bearer
/// credential to every request and never retry.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    // --- Auth ---
    async fn register(&self, credentials: &Credentials) -> PortResult<Identity>;

    async fn login(&self, credentials: &Credentials) -> PortResult<Identity>;

    // --- Products ---
    async fn list_products(&self, filters: &ProductFilters) -> PortResult<ProductPage>;

    async fn get_product(&self, id: &str) -> PortResult<Product>;

    async fn create_product(&self, submission: ProductSubmission) -> PortResult<Product>;

    async fn update_product(&self, id: &str, submission: ProductSubmission)
        -> PortResult<Product>;

    async fn delete_product(&self, id: &str) -> PortResult<()>;
}

/// Storage that keeps the identity alive across restarts.
pub trait SessionPersistence: Send + Sync {
    /// Reads the stored identity, if any.
    fn load(&self) -> PortResult<Option<Identity>>;

    fn save(&self, identity: &Identity) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}
