//! services/admin_client/src/ui/product_form.rs
//!
//! The create/update product form: client-side validation, sparse multipart
//! submission, and inline plus toast reporting of server rejections.

use crate::ui::notifications::NotificationChannel;
use inventory_admin_core::domain::{ImageAttachment, Product};
use inventory_admin_core::ports::InventoryApi;
use inventory_admin_core::validation::{ProductDraft, ProductErrors, ProductField};
use tracing::{info, warn};

const FALLBACK_MESSAGE: &str = "Operation failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { product_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Validation failed; no request was sent.
    Invalid,
    /// The server accepted the submission and the form closed.
    Saved(Product),
    /// The server rejected the submission; the form stays open.
    Failed(String),
    /// The form was already closed.
    Closed,
}

#[derive(Debug, Clone)]
pub struct ProductForm {
    mode: FormMode,
    draft: ProductDraft,
    image: Option<ImageAttachment>,
    field_errors: ProductErrors,
    submit_error: Option<String>,
    submitting: bool,
    open: bool,
}

impl ProductForm {
    pub fn for_create() -> Self {
        Self::with(FormMode::Create, ProductDraft::default())
    }

    /// An edit form prefilled from `product`.
    pub fn for_edit(product: &Product) -> Self {
        Self::with(
            FormMode::Edit {
                product_id: product.id.clone(),
            },
            ProductDraft::from_product(product),
        )
    }

    fn with(mode: FormMode, draft: ProductDraft) -> Self {
        Self {
            mode,
            draft,
            image: None,
            field_errors: ProductErrors::default(),
            submit_error: None,
            submitting: false,
            open: true,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn set_field(&mut self, field: ProductField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn field_errors(&self) -> &ProductErrors {
        &self.field_errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Cancel: drops any submission error and closes.
    pub fn close(&mut self) {
        self.submit_error = None;
        self.open = false;
    }

    /// Validates, then sends exactly one create or update request.
    pub async fn submit(
        &mut self,
        api: &dyn InventoryApi,
        notifications: &NotificationChannel,
    ) -> FormOutcome {
        if !self.open {
            return FormOutcome::Closed;
        }
        self.submit_error = None;

        if let Err(errors) = self.draft.validate() {
            self.field_errors = errors;
            return FormOutcome::Invalid;
        }
        self.field_errors = ProductErrors::default();

        let submission = self.draft.to_submission(self.image.clone());
        self.submitting = true;
        let result = match &self.mode {
            FormMode::Create => api.create_product(submission).await,
            FormMode::Edit { product_id } => api.update_product(product_id, submission).await,
        };
        self.submitting = false;

        match result {
            Ok(product) => {
                info!(product_id = %product.id, mode = ?self.mode, "Product saved");
                self.submit_error = None;
                self.open = false;
                FormOutcome::Saved(product)
            }
            Err(e) => {
                warn!(mode = ?self.mode, error = %e, "Product submission rejected");
                let message = e.user_message(FALLBACK_MESSAGE);
                notifications.error(message.clone());
                self.submit_error = Some(message.clone());
                FormOutcome::Failed(message)
            }
        }
    }
}
