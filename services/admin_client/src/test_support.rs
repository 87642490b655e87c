//! In-memory substitutes for the ports, used by the controller tests.

use crate::config::Config;
use crate::ui::state::AppContext;
use async_trait::async_trait;
use chrono::NaiveDate;
use inventory_admin_core::domain::{
    Credentials, Identity, Product, ProductFilters, ProductPage, ProductSubmission, Role,
};
use inventory_admin_core::ports::{InventoryApi, PortError, PortResult, SessionPersistence};
use inventory_admin_core::session::SessionStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Register(Credentials),
    Login(Credentials),
    List(ProductFilters),
    Get(String),
    Create(ProductSubmission),
    Update(String, ProductSubmission),
    Delete(String),
}

/// Records every call and answers from canned data.
#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    products: Mutex<Vec<Product>>,
    auth_result: Mutex<Option<PortResult<Identity>>>,
    list_error: Mutex<Option<PortError>>,
    mutation_error: Mutex<Option<PortError>>,
    list_delays: Mutex<VecDeque<Duration>>,
}

impl RecordingApi {
    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        let api = Self::default();
        *api.products.lock().unwrap() = products;
        Arc::new(api)
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<ProductFilters> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::List(filters) => Some(filters),
                _ => None,
            })
            .collect()
    }

    pub fn answer_auth_with(&self, result: PortResult<Identity>) {
        *self.auth_result.lock().unwrap() = Some(result);
    }

    pub fn fail_lists_with(&self, error: Option<PortError>) {
        *self.list_error.lock().unwrap() = error;
    }

    pub fn fail_mutations_with(&self, error: Option<PortError>) {
        *self.mutation_error.lock().unwrap() = error;
    }

    /// Each subsequent list call waits for the next queued delay.
    pub fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        self.list_delays.lock().unwrap().extend(delays);
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn auth(&self) -> PortResult<Identity> {
        self.auth_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(identity(Role::Standard)))
    }

    fn mutation<T>(&self, ok: T) -> PortResult<T> {
        match self.mutation_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(ok),
        }
    }
}

#[async_trait]
impl InventoryApi for RecordingApi {
    async fn register(&self, credentials: &Credentials) -> PortResult<Identity> {
        self.record(ApiCall::Register(credentials.clone()));
        self.auth()
    }

    async fn login(&self, credentials: &Credentials) -> PortResult<Identity> {
        self.record(ApiCall::Login(credentials.clone()));
        self.auth()
    }

    async fn list_products(&self, filters: &ProductFilters) -> PortResult<ProductPage> {
        self.record(ApiCall::List(filters.clone()));
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.list_error.lock().unwrap().clone() {
            return Err(error);
        }
        let items = self.products.lock().unwrap().clone();
        Ok(ProductPage {
            total_count: items.len() as u64,
            items,
            page_number: filters.page,
        })
    }

    async fn get_product(&self, id: &str) -> PortResult<Product> {
        self.record(ApiCall::Get(id.to_string()));
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(PortError::Request {
                status: 404,
                message: Some("Product not found".into()),
            })
    }

    async fn create_product(&self, submission: ProductSubmission) -> PortResult<Product> {
        self.record(ApiCall::Create(submission));
        self.mutation(product("new"))
    }

    async fn update_product(
        &self,
        id: &str,
        submission: ProductSubmission,
    ) -> PortResult<Product> {
        self.record(ApiCall::Update(id.to_string(), submission));
        self.mutation(product(id))
    }

    async fn delete_product(&self, id: &str) -> PortResult<()> {
        self.record(ApiCall::Delete(id.to_string()));
        self.mutation(())
    }
}

/// Persistence held in memory.
#[derive(Default)]
pub struct MemoryPersistence {
    pub stored: Mutex<Option<Identity>>,
}

impl SessionPersistence for MemoryPersistence {
    fn load(&self) -> PortResult<Option<Identity>> {
        Ok(self.stored.lock().unwrap().clone())
    }

    fn save(&self, identity: &Identity) -> PortResult<()> {
        *self.stored.lock().unwrap() = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

pub fn identity(role: Role) -> Identity {
    Identity {
        id: "u1".into(),
        name: Some("Ada".into()),
        email: Some("ada@example.com".into()),
        role,
        token: Some("tok-1".into()),
    }
}

pub fn product(id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: "Whole milk".into(),
        product_code: "MLK-1".into(),
        price: 2.5,
        category: "dairy".into(),
        manufacture_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        expiry_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        status: "active".into(),
        owner: None,
        image: None,
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

/// A context whose session already holds an identity of `role`
/// (or nobody, for `None`).
pub fn context(api: Arc<RecordingApi>, role: Option<Role>) -> AppContext {
    context_with(
        api,
        Arc::new(SessionStore::resolved(role.map(identity))),
        Arc::new(MemoryPersistence::default()),
    )
}

pub fn context_with(
    api: Arc<RecordingApi>,
    session: Arc<SessionStore>,
    persistence: Arc<MemoryPersistence>,
) -> AppContext {
    AppContext::new(Arc::new(test_config()), api, session, persistence)
}
