//! crates/inventory_admin_core/src/validation.rs
//!
//! Client-side validation for the product form and the sign-in/sign-up forms.
//! A failed validation is field-scoped and means no request is sent.

use crate::domain::{Credentials, ImageAttachment, Product, ProductSubmission};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

//=========================================================================================
// Field-scoped errors
//=========================================================================================

/// Validation messages keyed by the field they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord> {
    errors: BTreeMap<F, String>,
}

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    /// Records `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: F, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<F: Ord + Copy + fmt::Display> fmt::Display for FieldErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

//=========================================================================================
// Product form
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductField {
    Name,
    ProductCode,
    Price,
    Category,
    ManufactureDate,
    ExpiryDate,
}

impl ProductField {
    pub const ALL: [ProductField; 6] = [
        ProductField::Name,
        ProductField::ProductCode,
        ProductField::Price,
        ProductField::Category,
        ProductField::ManufactureDate,
        ProductField::ExpiryDate,
    ];

    /// The multipart field name the server expects.
    pub fn wire_name(self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::ProductCode => "productCode",
            ProductField::Price => "price",
            ProductField::Category => "category",
            ProductField::ManufactureDate => "manufactureDate",
            ProductField::ExpiryDate => "expiryDate",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.wire_name() == name)
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

pub type ProductErrors = FieldErrors<ProductField>;

pub const REQUIRED: &str = "Required";
pub const MUST_BE_NUMBER: &str = "Must be a number";
pub const MUST_BE_POSITIVE: &str = "Must be positive";
pub const INVALID_DATE: &str = "Invalid date";
pub const EXPIRY_NOT_AFTER_MANUFACTURE: &str = "Expiry date must be after manufacture date";

/// The raw text of the product form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub product_code: String,
    pub price: String,
    pub category: String,
    pub manufacture_date: String,
    pub expiry_date: String,
}

impl ProductDraft {
    /// Prefills the form from an existing product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            product_code: product.product_code.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            manufacture_date: product.manufacture_date.format("%Y-%m-%d").to_string(),
            expiry_date: product.expiry_date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn get(&self, field: ProductField) -> &str {
        match field {
            ProductField::Name => &self.name,
            ProductField::ProductCode => &self.product_code,
            ProductField::Price => &self.price,
            ProductField::Category => &self.category,
            ProductField::ManufactureDate => &self.manufacture_date,
            ProductField::ExpiryDate => &self.expiry_date,
        }
    }

    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Name => self.name = value,
            ProductField::ProductCode => self.product_code = value,
            ProductField::Price => self.price = value,
            ProductField::Category => self.category = value,
            ProductField::ManufactureDate => self.manufacture_date = value,
            ProductField::ExpiryDate => self.expiry_date = value,
        }
    }

    pub fn validate(&self) -> Result<(), ProductErrors> {
        let mut errors = ProductErrors::default();

        for field in [ProductField::Name, ProductField::ProductCode, ProductField::Category] {
            if self.get(field).trim().is_empty() {
                errors.add(field, REQUIRED);
            }
        }

        let price = self.price.trim();
        if price.is_empty() {
            errors.add(ProductField::Price, REQUIRED);
        } else {
            match price.parse::<f64>() {
                Ok(value) if !value.is_finite() => errors.add(ProductField::Price, MUST_BE_NUMBER),
                Ok(value) if value <= 0.0 => errors.add(ProductField::Price, MUST_BE_POSITIVE),
                Ok(_) => {}
                Err(_) => errors.add(ProductField::Price, MUST_BE_NUMBER),
            }
        }

        let manufactured = check_date(&mut errors, ProductField::ManufactureDate, &self.manufacture_date);
        let expires = check_date(&mut errors, ProductField::ExpiryDate, &self.expiry_date);
        if let (Some(manufactured), Some(expires)) = (manufactured, expires) {
            if expires <= manufactured {
                errors.add(ProductField::ExpiryDate, EXPIRY_NOT_AFTER_MANUFACTURE);
            }
        }

        errors.into_result()
    }

    /// Builds the sparse payload: only fields with a non-blank value, plus the image.
    pub fn to_submission(&self, image: Option<ImageAttachment>) -> ProductSubmission {
        let fields = ProductField::ALL
            .into_iter()
            .filter_map(|field| {
                let value = self.get(field).trim();
                (!value.is_empty()).then(|| (field.wire_name(), value.to_string()))
            })
            .collect();
        ProductSubmission { fields, image }
    }
}

fn check_date(
    errors: &mut ProductErrors,
    field: ProductField,
    raw: &str,
) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    // Form input is a bare calendar date; timestamps are a wire format only.
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    if parsed.is_none() {
        errors.add(field, INVALID_DATE);
    }
    parsed
}

//=========================================================================================
// Sign-in / sign-up form
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialField {
    Email,
    Password,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialField::Email => f.write_str("email"),
            CredentialField::Password => f.write_str("password"),
        }
    }
}

pub type CredentialErrors = FieldErrors<CredentialField>;

pub fn validate_credentials(credentials: &Credentials) -> Result<(), CredentialErrors> {
    let mut errors = CredentialErrors::default();
    let email = credentials.email.trim();
    if email.is_empty() {
        errors.add(CredentialField::Email, REQUIRED);
    } else if !email.contains('@') {
        errors.add(CredentialField::Email, "Invalid email");
    }
    if credentials.password.is_empty() {
        errors.add(CredentialField::Password, REQUIRED);
    }
    errors.into_result()
}
