//! Product domain model.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes.
//! - `name` is non-blank and `price` is finite and non-negative.

use crate::model::resource::{
    available_flag, FieldError, Resource, ResourceId, ResourcePatch, Visibility,
};
use serde::{Deserialize, Serialize};

/// Stored product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ResourceId,
    pub name: String,
    pub price: f64,
    /// Serialized as `available` to match the external schema.
    #[serde(rename = "available", with = "available_flag")]
    pub visibility: Visibility,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds, bumped on every write.
    pub updated_at: i64,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.visibility.is_active()
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub price: f64,
}

impl ProductFields {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Partial update payload for a product.
///
/// `id` is accepted so RPC payloads can carry routing identity, but it is
/// always stripped before the merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ResourcePatch for ProductPatch {
    fn without_id(self) -> Self {
        Self { id: None, ..self }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }
}

impl Resource for Product {
    const KIND: &'static str = "Product";

    type Fields = ProductFields;
    type Patch = ProductPatch;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn validate_fields(fields: &ProductFields) -> Result<(), FieldError> {
        validate_name(&fields.name)?;
        validate_price(fields.price)
    }

    fn validate_patch(patch: &ProductPatch) -> Result<(), FieldError> {
        if let Some(name) = patch.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(FieldError::new("name", "must not be blank"));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), FieldError> {
    if !price.is_finite() {
        return Err(FieldError::new("price", "must be a finite number"));
    }
    if price < 0.0 {
        return Err(FieldError::new("price", "must not be negative"));
    }
    Ok(())
}
