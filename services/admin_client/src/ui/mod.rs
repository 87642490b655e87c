pub mod auth;
pub mod delete_dialog;
pub mod notifications;
pub mod product_form;
pub mod product_list;
pub mod route_guard;
pub mod state;

pub use auth::{AuthMode, AuthOutcome, AuthService, SignInForm};
pub use delete_dialog::{DeleteConfirmation, DeleteOutcome, DeleteState};
pub use notifications::NotificationChannel;
pub use product_form::{FormMode, FormOutcome, ProductForm};
pub use product_list::{ListState, ProductListView, RowActions};
pub use route_guard::{GuardState, GuardView, Route, RouteGuard};
pub use state::AppContext;
