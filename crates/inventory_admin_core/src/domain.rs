//! crates/inventory_admin_core/src/domain.rs
//!
//! Defines the pure, core data structures of the admin client.
//! Serde attributes describe the REST wire shape; nothing here performs I/O.

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

//=========================================================================================
// Identity
//=========================================================================================

/// Authorization level of an identity. Only `Superuser` may mutate the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superuser,
    /// Any role string the server sends other than `superuser`, or none at all.
    #[default]
    #[serde(other)]
    Standard,
}

/// The authenticated user record plus its role and credential token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Identity {
    /// Name shown to the user: the display name, else the email, else the id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn is_superuser(&self) -> bool {
        self.role == Role::Superuser
    }
}

/// Email/password pair sent to the sign-in and sign-up endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

//=========================================================================================
// Product
//=========================================================================================

/// Reference to the identity that owns a product. The server sends either a
/// bare id or a populated user object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    Id(String),
    User {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl Owner {
    pub fn id(&self) -> &str {
        match self {
            Owner::Id(id) => id,
            Owner::User { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Owner::Id(id) => id,
            Owner::User {
                id, name, email, ..
            } => name.as_deref().or(email.as_deref()).unwrap_or(id),
        }
    }
}

/// A perishable inventory item as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub product_code: String,
    pub price: f64,
    pub category: String,
    #[serde(deserialize_with = "calendar_date")]
    pub manufacture_date: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub image: Option<String>,
}

/// One server-paginated slice of the catalog. Rebuilt on every fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    /// 1-based.
    pub page_number: u32,
    pub total_count: u64,
}

/// The filters a list fetch is issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    /// 1-based.
    pub page: u32,
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            page: 1,
        }
    }
}

impl ProductFilters {
    /// Query pairs for the list endpoint. Blank search/category are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        pairs.push(("page", self.page.max(1).to_string()));
        pairs
    }
}

/// A file chosen in the product form, sent as the `image` multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A sparse multipart payload for create/update: only the fields that carry a
/// value, plus the image if one was chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSubmission {
    pub fields: Vec<(&'static str, String)>,
    pub image: Option<ImageAttachment>,
}

impl ProductSubmission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

//=========================================================================================
// Notification
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message shown to the user. A newer one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
        }
    }
}

//=========================================================================================
// Serde helpers
//=========================================================================================

/// Accepts `YYYY-MM-DD` or a full timestamp and keeps the calendar date.
fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("'{raw}' is not a date or timestamp"))
    })
}

/// Parses the date part of `raw`, ignoring anything after a `T`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
