//! services/admin_client/src/ui/auth.rs
//!
//! Session lifecycle (bootstrap, sign-in, sign-up, sign-out) and the
//! sign-in/sign-up form controller.

use crate::ui::route_guard::Route;
use crate::ui::state::AppContext;
use inventory_admin_core::domain::{Credentials, Identity};
use inventory_admin_core::ports::PortResult;
use inventory_admin_core::session::SessionSnapshot;
use inventory_admin_core::validation::{validate_credentials, CredentialErrors};
use tracing::{info, warn};

//=========================================================================================
// AuthService
//=========================================================================================

/// Moves identities between the server, the `SessionStore` and its persistence.
#[derive(Clone)]
pub struct AuthService {
    ctx: AppContext,
}

impl AuthService {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Restores the persisted identity and ends the store's resolving phase.
    /// Only the first call has any effect.
    pub fn bootstrap(&self) -> SessionSnapshot {
        if !self.ctx.session.current().resolving {
            return self.ctx.session.current();
        }

        let restored = match self.ctx.persistence.load() {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Failed to restore the saved session: {}", e);
                None
            }
        };
        if let Some(identity) = &restored {
            info!(user = identity.display_name(), "Restored saved session");
        }
        self.ctx.session.finish_resolving(restored);
        self.ctx.session.current()
    }

    pub async fn login(&self, credentials: &Credentials) -> PortResult<Identity> {
        let identity = self.ctx.api.login(credentials).await?;
        self.establish(&identity);
        Ok(identity)
    }

    pub async fn register(&self, credentials: &Credentials) -> PortResult<Identity> {
        let identity = self.ctx.api.register(credentials).await?;
        self.establish(&identity);
        Ok(identity)
    }

    pub fn logout(&self) {
        self.ctx.session.clear();
        if let Err(e) = self.ctx.persistence.clear() {
            warn!("Failed to clear the saved session: {}", e);
        }
        info!("Signed out");
    }

    fn establish(&self, identity: &Identity) {
        self.ctx.session.establish(identity.clone());
        if let Err(e) = self.ctx.persistence.save(identity) {
            warn!("Failed to save the session: {}", e);
        }
        info!(user = identity.display_name(), role = ?identity.role, "Signed in");
    }
}

//=========================================================================================
// SignInForm
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn route(self) -> Route {
        match self {
            AuthMode::SignIn => Route::SignIn,
            AuthMode::SignUp => Route::SignUp,
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Login failed",
            AuthMode::SignUp => "Registration failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Field errors were found; nothing was sent.
    Invalid,
    /// The session now holds `identity`; navigate to `next`.
    SignedIn { identity: Identity, next: Route },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SignInForm {
    mode: AuthMode,
    pub credentials: Credentials,
    field_errors: CredentialErrors,
    error: Option<String>,
}

impl SignInForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            credentials: Credentials::default(),
            field_errors: CredentialErrors::default(),
            error: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn field_errors(&self) -> &CredentialErrors {
        &self.field_errors
    }

    /// The inline error shown above the form.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, auth: &AuthService) -> AuthOutcome {
        self.error = None;
        if let Err(errors) = validate_credentials(&self.credentials) {
            self.field_errors = errors;
            return AuthOutcome::Invalid;
        }
        self.field_errors = CredentialErrors::default();

        let result = match self.mode {
            AuthMode::SignIn => auth.login(&self.credentials).await,
            AuthMode::SignUp => auth.register(&self.credentials).await,
        };
        match result {
            Ok(identity) => AuthOutcome::SignedIn {
                identity,
                next: Route::Products,
            },
            Err(e) => {
                let message = e.user_message(self.mode.fallback_message());
                self.error = Some(message.clone());
                AuthOutcome::Failed(message)
            }
        }
    }
}
