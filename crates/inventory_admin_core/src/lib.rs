pub mod domain;
pub mod permissions;
pub mod ports;
pub mod session;
pub mod validation;

pub use domain::{
    Credentials, Identity, ImageAttachment, Notification, Owner, Product, ProductFilters,
    ProductPage, ProductSubmission, Role, Severity,
};
pub use permissions::{can_mutate, MutationAction};
pub use ports::{InventoryApi, PortError, PortResult, SessionPersistence};
pub use session::{SessionSnapshot, SessionStore};
pub use validation::{CredentialErrors, ProductDraft, ProductErrors, ProductField};
