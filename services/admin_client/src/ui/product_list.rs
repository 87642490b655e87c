//! services/admin_client/src/ui/product_list.rs
//!
//! The product dashboard controller. It owns the active filters and the
//! current page, debounces search input, gates row actions by role, and
//! refetches the page after every successful mutation.

use crate::ui::delete_dialog::{DeleteConfirmation, DeleteOutcome, DeleteState};
use crate::ui::product_form::{FormOutcome, ProductForm};
use crate::ui::state::AppContext;
use inventory_admin_core::domain::{Product, ProductFilters, ProductPage};
use inventory_admin_core::permissions::{can_mutate, MutationAction};
use inventory_admin_core::ports::PortResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const FETCH_FAILED: &str = "Failed to fetch products";

//=========================================================================================
// View State
//=========================================================================================

/// Everything the dashboard renders, apart from the form and dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    pub search: String,
    pub category: String,
    /// 1-based; 0 is treated as 1.
    pub page: u32,
    pub products: ProductPage,
    pub loading: bool,
    pub error: Option<String>,
}

impl ListState {
    pub fn filters(&self) -> ProductFilters {
        ProductFilters {
            search: non_blank(&self.search),
            category: non_blank(&self.category),
            page: self.page.max(1),
        }
    }
}

/// Which row/toolbar buttons are enabled for the current identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowActions {
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

struct Inner {
    ctx: AppContext,
    state: Mutex<ListState>,
    form: tokio::sync::Mutex<Option<ProductForm>>,
    delete_dialog: tokio::sync::Mutex<DeleteConfirmation>,
    pending_search: Mutex<Option<CancellationToken>>,
    /// Bumped by every fetch; only the newest fetch may apply its response.
    generation: AtomicU64,
}

/// A cheap handle; clones drive the same dashboard.
#[derive(Clone)]
pub struct ProductListView {
    inner: Arc<Inner>,
}

impl ProductListView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                state: Mutex::new(ListState {
                    page: 1,
                    ..ListState::default()
                }),
                form: tokio::sync::Mutex::new(None),
                delete_dialog: tokio::sync::Mutex::new(DeleteConfirmation::new()),
                pending_search: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> ListState {
        self.lock_state().clone()
    }

    pub fn filters(&self) -> ProductFilters {
        self.lock_state().filters()
    }

    //=====================================================================================
    // Fetching
    //=====================================================================================

    /// Loads one page and replaces the current page wholesale.
    ///
    /// Overlapping fetches are not cancelled on the wire, but a response that
    /// arrives after a newer fetch has started is dropped.
    pub async fn fetch_page(&self, filters: ProductFilters) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_state().loading = true;
        debug!(generation, ?filters, "Fetching product page");

        let result = self.inner.ctx.api.list_products(&filters).await;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding stale product page");
            return;
        }

        let failure = {
            let mut state = self.lock_state();
            state.loading = false;
            match result {
                Ok(page) => {
                    state.products = page;
                    state.error = None;
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Failed to fetch products");
                    state.error = Some(FETCH_FAILED.to_string());
                    Some(e)
                }
            }
        };
        if let Some(e) = failure {
            self.inner
                .ctx
                .notifications
                .error(e.user_message(FETCH_FAILED));
        }
    }

    /// Fetches again with the active filters.
    pub async fn refetch(&self) {
        self.fetch_page(self.filters()).await;
    }

    /// Records the search text and schedules a fetch once typing pauses.
    /// Each call cancels the previously scheduled fetch.
    ///
    /// Outside a tokio runtime the text is still recorded, but no fetch is
    /// scheduled.
    pub fn set_search(&self, text: impl Into<String>) {
        {
            let mut state = self.lock_state();
            state.search = text.into();
            state.page = 1;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; search will not be fetched");
            return;
        };

        let token = CancellationToken::new();
        {
            let mut pending = self
                .inner
                .pending_search
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = pending.replace(token.clone()) {
                previous.cancel();
            }
        }

        let view = self.clone();
        let delay = self.inner.ctx.config.search_debounce;
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => view.refetch().await,
            }
        });
    }

    /// Changes the category filter and fetches immediately.
    pub async fn set_category(&self, category: impl Into<String>) {
        {
            let mut state = self.lock_state();
            state.category = category.into();
            state.page = 1;
        }
        self.refetch().await;
    }

    /// Moves to a 1-based page and fetches immediately.
    pub async fn set_page(&self, page: u32) {
        self.lock_state().page = page.max(1);
        self.refetch().await;
    }

    //=====================================================================================
    // Permissions
    //=====================================================================================

    pub fn row_actions(&self) -> RowActions {
        let identity = self.inner.ctx.session.identity();
        RowActions {
            create: can_mutate(identity.as_ref(), MutationAction::Create),
            edit: can_mutate(identity.as_ref(), MutationAction::Edit),
            delete: can_mutate(identity.as_ref(), MutationAction::Delete),
        }
    }

    /// Enforces `can_mutate` at the point of invocation. A refusal raises one
    /// error notification and changes nothing else.
    fn permit(&self, action: MutationAction) -> bool {
        let identity = self.inner.ctx.session.identity();
        if can_mutate(identity.as_ref(), action) {
            return true;
        }
        warn!(?action, user = identity.as_ref().map(|i| i.display_name()), "Mutation refused");
        self.inner.ctx.notifications.error(action.denied_message());
        false
    }

    //=====================================================================================
    // Product form
    //=====================================================================================

    pub async fn open_create(&self) -> bool {
        if !self.permit(MutationAction::Create) {
            return false;
        }
        *self.inner.form.lock().await = Some(ProductForm::for_create());
        true
    }

    pub async fn open_edit(&self, product: &Product) -> bool {
        if !self.permit(MutationAction::Edit) {
            return false;
        }
        *self.inner.form.lock().await = Some(ProductForm::for_edit(product));
        true
    }

    /// Loads `product_id` and opens the edit form for it. The permission
    /// check comes first, so a refusal sends no request and yields `Ok(None)`.
    pub async fn open_edit_by_id(&self, product_id: &str) -> PortResult<Option<Product>> {
        if !self.permit(MutationAction::Edit) {
            return Ok(None);
        }
        let product = self.inner.ctx.api.get_product(product_id).await?;
        *self.inner.form.lock().await = Some(ProductForm::for_edit(&product));
        Ok(Some(product))
    }

    /// A copy of the open form, for rendering.
    pub async fn form(&self) -> Option<ProductForm> {
        self.inner.form.lock().await.clone()
    }

    /// Applies `edit` to the open form. Returns `None` when no form is open.
    pub async fn edit_form<R>(&self, edit: impl FnOnce(&mut ProductForm) -> R) -> Option<R> {
        self.inner.form.lock().await.as_mut().map(edit)
    }

    /// Submits the open form; a successful save closes it and refetches.
    pub async fn submit_form(&self) -> FormOutcome {
        let outcome = {
            let mut slot = self.inner.form.lock().await;
            let Some(form) = slot.as_mut() else {
                return FormOutcome::Closed;
            };
            let outcome = form
                .submit(self.inner.ctx.api.as_ref(), &self.inner.ctx.notifications)
                .await;
            if !form.is_open() {
                *slot = None;
            }
            outcome
        };

        if let FormOutcome::Saved(product) = &outcome {
            info!(product_id = %product.id, "Refreshing after save");
            self.refetch().await;
        }
        outcome
    }

    pub async fn close_form(&self) {
        if let Some(mut form) = self.inner.form.lock().await.take() {
            form.close();
        }
    }

    //=====================================================================================
    // Deletion
    //=====================================================================================

    pub async fn open_delete(&self, product: &Product) -> bool {
        if !self.permit(MutationAction::Delete) {
            return false;
        }
        self.inner.delete_dialog.lock().await.open(product);
        true
    }

    /// Loads `product_id` and asks for confirmation. A refusal sends no
    /// request and yields `Ok(None)`.
    pub async fn open_delete_by_id(&self, product_id: &str) -> PortResult<Option<Product>> {
        if !self.permit(MutationAction::Delete) {
            return Ok(None);
        }
        let product = self.inner.ctx.api.get_product(product_id).await?;
        self.inner.delete_dialog.lock().await.open(&product);
        Ok(Some(product))
    }

    pub async fn delete_state(&self) -> DeleteState {
        self.inner.delete_dialog.lock().await.state().clone()
    }

    pub async fn cancel_delete(&self) {
        self.inner.delete_dialog.lock().await.cancel();
    }

    /// Confirms the pending deletion; a success refetches.
    pub async fn confirm_delete(&self) -> DeleteOutcome {
        let outcome = self
            .inner
            .delete_dialog
            .lock()
            .await
            .confirm(self.inner.ctx.api.as_ref(), &self.inner.ctx.notifications)
            .await;

        if matches!(outcome, DeleteOutcome::Deleted { .. }) {
            self.refetch().await;
        }
        outcome
    }

    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, product, ApiCall, RecordingApi};
    use inventory_admin_core::domain::{Role, Severity};
    use inventory_admin_core::ports::PortError;
    use inventory_admin_core::validation::ProductField;
    use rstest::rstest;
    use std::time::Duration;

    fn dashboard(role: Option<Role>) -> (ProductListView, Arc<RecordingApi>, AppContext) {
        let api = RecordingApi::with_products(vec![product("p1"), product("p2")]);
        let ctx = context(Arc::clone(&api), role);
        (ProductListView::new(ctx.clone()), api, ctx)
    }

    #[test]
    fn search_outside_a_runtime_is_recorded_without_fetching() {
        let (view, api, _) = dashboard(Some(Role::Standard));

        view.set_search("milk");

        assert_eq!(view.state().search, "milk");
        assert_eq!(view.filters().search.as_deref(), Some("milk"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_replaces_the_page() {
        let (view, api, _) = dashboard(Some(Role::Standard));
        view.refetch().await;

        let state = view.state();
        assert_eq!(state.products.items.len(), 2);
        assert_eq!(state.products.page_number, 1);
        assert!(!state.loading);
        assert_eq!(api.list_calls(), vec![ProductFilters::default()]);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_rows_and_shows_an_error() {
        let (view, api, ctx) = dashboard(Some(Role::Standard));
        view.refetch().await;
        api.fail_lists_with(Some(PortError::Network("down".into())));

        view.refetch().await;

        let state = view.state();
        assert_eq!(state.error.as_deref(), Some(FETCH_FAILED));
        assert!(!state.loading);
        assert_eq!(state.products.items.len(), 2);
        assert_eq!(ctx.notifications.current().unwrap().severity, Severity::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_within_the_debounce_window_fetches_once() {
        let (view, api, _) = dashboard(Some(Role::Standard));

        for prefix in ["m", "mi", "mil", "milk"] {
            view.set_search(prefix);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        let calls = api.list_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].search.as_deref(), Some("milk"));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_longer_than_the_window_fetch_each_time() {
        let (view, api, _) = dashboard(Some(Role::Standard));

        view.set_search("mi");
        tokio::time::sleep(Duration::from_millis(600)).await;
        view.set_search("milk");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let searches: Vec<_> = api.list_calls().into_iter().map(|f| f.search).collect();
        assert_eq!(searches, vec![Some("mi".to_string()), Some("milk".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn category_change_fetches_immediately_with_current_search() {
        let (view, api, _) = dashboard(Some(Role::Standard));
        view.set_page(3).await;
        view.set_search("milk");
        tokio::time::sleep(Duration::from_millis(600)).await;

        view.set_category("dairy").await;

        let last = api.list_calls().pop().unwrap();
        assert_eq!(last.search.as_deref(), Some("milk"));
        assert_eq!(last.category.as_deref(), Some("dairy"));
        assert_eq!(last.page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_responses_are_discarded() {
        let (view, api, _) = dashboard(Some(Role::Standard));
        api.delay_lists([Duration::from_millis(300), Duration::from_millis(100)]);

        let slow = view.fetch_page(ProductFilters { page: 1, ..Default::default() });
        let fast = view.fetch_page(ProductFilters { page: 2, ..Default::default() });
        tokio::join!(slow, fast);

        let state = view.state();
        assert_eq!(state.products.page_number, 2);
        assert!(!state.loading);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(Role::Standard))]
    #[tokio::test]
    async fn non_superusers_cannot_edit_or_delete(#[case] role: Option<Role>) {
        let (view, api, ctx) = dashboard(role);
        let mut events = ctx.notifications.subscribe();

        assert!(!view.open_edit(&product("p1")).await);
        let edit_toast = events.try_recv().unwrap();
        assert_eq!(edit_toast.message, MutationAction::Edit.denied_message());
        assert_eq!(edit_toast.severity, Severity::Error);
        assert!(events.try_recv().is_err());

        assert!(!view.open_delete(&product("p1")).await);
        assert_eq!(
            events.try_recv().unwrap().message,
            MutationAction::Delete.denied_message()
        );
        assert!(events.try_recv().is_err());

        assert!(view.form().await.is_none());
        assert_eq!(view.delete_state().await, DeleteState::Idle);
        assert!(api.calls().is_empty());
        assert_eq!(
            view.row_actions(),
            RowActions { create: false, edit: false, delete: false }
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(Role::Standard))]
    #[tokio::test]
    async fn refused_edit_or_delete_by_id_sends_no_request(#[case] role: Option<Role>) {
        let (view, api, ctx) = dashboard(role);
        let mut events = ctx.notifications.subscribe();

        assert_eq!(view.open_edit_by_id("p1").await, Ok(None));
        assert_eq!(view.open_delete_by_id("p1").await, Ok(None));

        assert!(api.calls().is_empty());
        assert_eq!(events.try_recv().unwrap().message, MutationAction::Edit.denied_message());
        assert_eq!(
            events.try_recv().unwrap().message,
            MutationAction::Delete.denied_message()
        );
        assert!(view.form().await.is_none());
        assert_eq!(view.delete_state().await, DeleteState::Idle);
    }

    #[tokio::test]
    async fn superuser_loads_the_product_before_editing_or_deleting() {
        let (view, api, _) = dashboard(Some(Role::Superuser));

        assert_eq!(view.open_edit_by_id("p1").await, Ok(Some(product("p1"))));
        assert_eq!(view.open_delete_by_id("p2").await, Ok(Some(product("p2"))));
        let missing = view.open_delete_by_id("p404").await;

        assert!(matches!(missing, Err(PortError::Request { status: 404, .. })));
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::Get("p1".into()),
                ApiCall::Get("p2".into()),
                ApiCall::Get("p404".into())
            ]
        );
        assert!(view.form().await.is_some());
        assert!(matches!(
            view.delete_state().await,
            DeleteState::Confirming { product_id, .. } if product_id == "p2"
        ));
    }

    #[tokio::test]
    async fn superuser_row_actions_are_enabled() {
        let (view, _, _) = dashboard(Some(Role::Superuser));
        assert_eq!(
            view.row_actions(),
            RowActions { create: true, edit: true, delete: true }
        );
    }

    #[tokio::test]
    async fn saving_the_form_refetches_once_with_active_filters() {
        let (view, api, _) = dashboard(Some(Role::Superuser));
        view.set_category("dairy").await;
        assert!(view.open_edit(&product("p1")).await);
        view.edit_form(|form| form.set_field(ProductField::Name, "Skim milk"))
            .await
            .unwrap();

        let outcome = view.submit_form().await;

        assert!(matches!(outcome, FormOutcome::Saved(_)));
        assert!(view.form().await.is_none());
        let calls = api.calls();
        let after_save: Vec<_> = calls
            .iter()
            .skip_while(|call| !matches!(call, ApiCall::Update(..)))
            .collect();
        assert_eq!(after_save.len(), 2);
        let ApiCall::List(filters) = after_save[1] else {
            panic!("expected a refetch, got {after_save:?}");
        };
        assert_eq!(filters.category.as_deref(), Some("dairy"));
    }

    #[tokio::test]
    async fn creating_a_product_refetches_once_with_active_filters() {
        let (view, api, _) = dashboard(Some(Role::Superuser));
        view.set_category("dairy").await;
        view.set_page(2).await;
        assert!(view.open_create().await);
        view.edit_form(|form| {
            form.set_field(ProductField::Name, "Greek yogurt");
            form.set_field(ProductField::ProductCode, "YGT-7");
            form.set_field(ProductField::Price, "3.20");
            form.set_field(ProductField::Category, "dairy");
            form.set_field(ProductField::ManufactureDate, "2024-05-01");
            form.set_field(ProductField::ExpiryDate, "2024-05-20");
        })
        .await
        .unwrap();

        let outcome = view.submit_form().await;

        assert!(matches!(outcome, FormOutcome::Saved(_)));
        assert!(view.form().await.is_none());
        let calls = api.calls();
        let after_create: Vec<_> = calls
            .iter()
            .skip_while(|call| !matches!(call, ApiCall::Create(_)))
            .collect();
        assert_eq!(after_create.len(), 2);
        let ApiCall::List(filters) = after_create[1] else {
            panic!("expected a refetch, got {after_create:?}");
        };
        assert_eq!(filters.category.as_deref(), Some("dairy"));
        assert_eq!(filters.page, 2);
    }

    #[tokio::test]
    async fn invalid_form_does_not_refetch() {
        let (view, api, _) = dashboard(Some(Role::Superuser));
        assert!(view.open_create().await);

        assert_eq!(view.submit_form().await, FormOutcome::Invalid);

        assert!(api.calls().is_empty());
        assert!(view.form().await.is_some_and(|form| form.is_open()));
    }

    #[tokio::test]
    async fn rejected_form_stays_open_without_refetch() {
        let (view, api, _) = dashboard(Some(Role::Superuser));
        api.fail_mutations_with(Some(PortError::Request {
            status: 422,
            message: Some("Invalid category".into()),
        }));
        assert!(view.open_edit(&product("p1")).await);

        let outcome = view.submit_form().await;

        assert_eq!(outcome, FormOutcome::Failed("Invalid category".into()));
        assert!(view.form().await.is_some());
        assert!(api.list_calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_refetches() {
        let (view, api, _) = dashboard(Some(Role::Superuser));
        view.set_search("milk");
        assert!(view.open_delete(&product("p1")).await);

        let outcome = view.confirm_delete().await;

        assert_eq!(outcome, DeleteOutcome::Deleted { product_id: "p1".into() });
        assert_eq!(view.delete_state().await, DeleteState::Idle);
        let calls = api.calls();
        assert_eq!(calls[0], ApiCall::Delete("p1".into()));
        let ApiCall::List(filters) = &calls[1] else {
            panic!("expected a refetch, got {calls:?}");
        };
        assert_eq!(filters.search.as_deref(), Some("milk"));
    }

    #[tokio::test]
    async fn failed_delete_closes_without_refetch() {
        let (view, api, ctx) = dashboard(Some(Role::Superuser));
        api.fail_mutations_with(Some(PortError::Request {
            status: 404,
            message: Some("Product not found".into()),
        }));
        assert!(view.open_delete(&product("p1")).await);

        let outcome = view.confirm_delete().await;

        assert_eq!(outcome, DeleteOutcome::Failed("Product not found".into()));
        assert_eq!(view.delete_state().await, DeleteState::Idle);
        assert_eq!(api.calls(), vec![ApiCall::Delete("p1".into())]);
        assert_eq!(ctx.notifications.current().unwrap().message, "Product not found");
    }
}
