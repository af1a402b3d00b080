//! Persistence codec for cart lines.
//!
//! The persisted form is a JSON array of flat records:
//!
//! ```json
//! [{"id":"p2","name":"Torta","price":300,"category":"general","quantity":2}]
//! ```
//!
//! `price` is a JSON number written with the amount's exact digits, so a
//! reload never rounds it through a float. Decoding is lenient about optional fields and
//! strict about shape: anything that is not an array of records is an error
//! the store turns into an empty cart.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{DEFAULT_CATEGORY, Product, ProductId};

/// Errors from encoding or decoding persisted cart state.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("malformed cart payload: {0}")]
    Decode(#[source] serde_json::Error),
}

/// One persisted cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

const fn default_quantity() -> i64 {
    1
}

impl From<&Product> for CartRecord {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().clone(),
            name: product.name().to_string(),
            price: product.unit_price(),
            category: product.category().to_string(),
            quantity: i64::from(product.quantity()),
        }
    }
}

/// Serialize cart lines in iteration order.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode<'a>(products: impl IntoIterator<Item = &'a Product>) -> Result<String, CodecError> {
    let records: Vec<CartRecord> = products.into_iter().map(CartRecord::from).collect();
    serde_json::to_string(&records).map_err(CodecError::Encode)
}

/// Rebuild cart lines from a persisted payload.
///
/// Records with a quantity of zero or less are dropped. Repeated ids are
/// merged into the first occurrence by summing quantities.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the payload is not a JSON array of
/// cart records.
pub fn decode(payload: &str) -> Result<Vec<Product>, CodecError> {
    let records: Vec<CartRecord> = serde_json::from_str(payload).map_err(CodecError::Decode)?;

    let mut lines: IndexMap<ProductId, Product> = IndexMap::with_capacity(records.len());
    for record in records {
        let Ok(quantity) = u32::try_from(record.quantity) else {
            tracing::debug!(product_id = %record.id, quantity = record.quantity, "Skipping persisted line with invalid quantity");
            continue;
        };
        if quantity == 0 {
            tracing::debug!(product_id = %record.id, "Skipping persisted line with zero quantity");
            continue;
        }

        if let Some(existing) = lines.get_mut(&record.id) {
            let merged = existing.quantity().saturating_add(quantity);
            existing.set_quantity(merged);
            continue;
        }

        let product = Product::new(record.id.clone(), record.name, record.price)
            .with_category(record.category)
            .with_quantity(quantity);
        lines.insert(record.id, product);
    }

    Ok(lines.into_values().collect())
}
