use super::order::Cents;
use serde::{Deserialize, Serialize};

/// A catalog entry as observed by the checkout core.
///
/// The core only ever reads products: prices are snapshotted into orders at
/// creation time and stock is validated but never decremented here. Catalog
/// maintenance lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price_cents: Cents,
    pub stock: u32,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price_cents: u64, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price_cents: Cents::new(price_cents),
            stock,
        }
    }
}
