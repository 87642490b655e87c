//! services/admin_client/src/adapters/http.rs
//!
//! This module contains the reqwest-backed REST gateway. It implements the
//! `InventoryApi` port from the `core` crate.
//!
//! The gateway owns transport details only: URL building, the bearer header,
//! multipart encoding, status mapping and JSON decoding. It never retries and
//! sets no timeout beyond the transport defaults.

use async_trait::async_trait;
use inventory_admin_core::domain::{
    Credentials, Identity, Product, ProductFilters, ProductPage, ProductSubmission,
};
use inventory_admin_core::ports::{InventoryApi, PortError, PortResult};
use inventory_admin_core::session::SessionStore;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST gateway that implements the `InventoryApi` port.
///
/// Every request carries `Authorization: Bearer <token>` when the shared
/// `SessionStore` holds a token; otherwise it is sent as-is.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl HttpGateway {
    /// Creates a new `HttpGateway` with a default reqwest client.
    pub fn new(base_url: &Url, session: Arc<SessionStore>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, session))
    }

    pub fn with_client(client: Client, base_url: &Url, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            base_url: base_url.clone(),
            session,
        }
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PortError::Unexpected(format!("'{}' cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> PortResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Sending request");
        let builder = self.client.request(method, url);
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends the request and returns the raw success body.
    async fn execute(&self, builder: RequestBuilder, operation: &'static str) -> PortResult<Vec<u8>> {
        let response = builder.send().await.map_err(|e| {
            warn!(operation, error = %e, "Request did not complete");
            map_transport_error(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_status_error(status, body.as_ref());
            warn!(operation, status = status.as_u16(), %error, "Request was rejected");
            return Err(error);
        }
        Ok(body.to_vec())
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        operation: &'static str,
    ) -> PortResult<T> {
        let body = self.execute(builder, operation).await?;
        serde_json::from_slice::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(|e| {
                warn!(operation, error = %e, "Response body could not be decoded");
                PortError::Unexpected(format!("invalid {operation} response: {e}"))
            })
    }
}

//=========================================================================================
// `InventoryApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl InventoryApi for HttpGateway {
    async fn register(&self, credentials: &Credentials) -> PortResult<Identity> {
        let builder = self.request(Method::POST, &["auth", "register"])?.json(credentials);
        let body: IdentityBody = self.execute_json(builder, "register").await?;
        Ok(body.into_identity())
    }

    async fn login(&self, credentials: &Credentials) -> PortResult<Identity> {
        let builder = self.request(Method::POST, &["auth", "login"])?.json(credentials);
        let body: IdentityBody = self.execute_json(builder, "login").await?;
        Ok(body.into_identity())
    }

    async fn list_products(&self, filters: &ProductFilters) -> PortResult<ProductPage> {
        let builder = self
            .request(Method::GET, &["products"])?
            .query(&filters.query_pairs());
        let body: ProductListBody = self.execute_json(builder, "list products").await?;
        Ok(body.into_page(filters.page.max(1)))
    }

    async fn get_product(&self, id: &str) -> PortResult<Product> {
        let builder = self.request(Method::GET, &["products", id])?;
        let body: ProductBody = self.execute_json(builder, "get product").await?;
        Ok(body.into_product())
    }

    async fn create_product(&self, submission: ProductSubmission) -> PortResult<Product> {
        let builder = self
            .request(Method::POST, &["products"])?
            .multipart(multipart_form(submission)?);
        let body: ProductBody = self.execute_json(builder, "create product").await?;
        Ok(body.into_product())
    }

    async fn update_product(
        &self,
        id: &str,
        submission: ProductSubmission,
    ) -> PortResult<Product> {
        let builder = self
            .request(Method::PUT, &["products", id])?
            .multipart(multipart_form(submission)?);
        let body: ProductBody = self.execute_json(builder, "update product").await?;
        Ok(body.into_product())
    }

    async fn delete_product(&self, id: &str) -> PortResult<()> {
        let builder = self.request(Method::DELETE, &["products", id])?;
        self.execute(builder, "delete product").await?;
        Ok(())
    }
}

//=========================================================================================
// Wire Shapes
//=========================================================================================

/// Success bodies may or may not be wrapped in `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityBody {
    WithUser {
        user: Identity,
        #[serde(default)]
        token: Option<String>,
    },
    Bare(Identity),
}

impl IdentityBody {
    fn into_identity(self) -> Identity {
        match self {
            IdentityBody::WithUser { mut user, token } => {
                if user.token.is_none() {
                    user.token = token;
                }
                user
            }
            IdentityBody::Bare(identity) => identity,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductBody {
    Keyed { product: Product },
    Bare(Product),
}

impl ProductBody {
    fn into_product(self) -> Product {
        match self {
            ProductBody::Keyed { product } => product,
            ProductBody::Bare(product) => product,
        }
    }
}

/// Rows stay raw so that one malformed product does not fail the whole page.
#[derive(Deserialize)]
struct ProductListBody {
    products: Vec<serde_json::Value>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    page: Option<u32>,
}

impl ProductListBody {
    fn into_page(self, requested_page: u32) -> ProductPage {
        let total_count = self.total.unwrap_or(self.products.len() as u64);
        let items = self
            .products
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Product>(raw) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Skipping product row that could not be decoded");
                    None
                }
            })
            .collect();
        ProductPage {
            page_number: self.page.unwrap_or(requested_page),
            total_count,
            items,
        }
    }
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn multipart_form(submission: ProductSubmission) -> PortResult<Form> {
    let mut form = Form::new();
    for (name, value) in submission.fields {
        form = form.text(name, value);
    }
    if let Some(image) = submission.image {
        let part = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| PortError::Unexpected(format!("invalid image content type: {e}")))?;
        form = form.part("image", part);
    }
    Ok(form)
}

fn map_transport_error(error: reqwest::Error) -> PortError {
    PortError::Network(error.to_string())
}

/// Maps a non-2xx response onto `PortError::Request`, preferring the body's
/// `message` over its `error`.
fn map_status_error(status: StatusCode, body: &[u8]) -> PortError {
    let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .or(parsed.error.filter(|e| !e.trim().is_empty()));
    PortError::Request {
        status: status.as_u16(),
        message,
    }
}
