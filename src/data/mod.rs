//! Core data models for the shelf-life service
//!
//! This module contains the product record served by the API and the
//! [`ProductStore`] seam through which the lookup service reads it.

pub mod catalog;

pub use catalog::{builtin_products, Catalog, CatalogStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A perishable product and how long it keeps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Row identifier
    pub id: u32,
    /// Display name, unique across the catalog ignoring case
    #[serde(rename = "productName")]
    pub name: String,
    /// Days from "now" until the product expires
    pub shelf_life_days: u32,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, shelf_life_days: u32) -> Self {
        Self {
            id,
            name: name.into(),
            shelf_life_days,
        }
    }

    /// Case-insensitive exact name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Case-insensitive substring match; `fragment` must already be lower-cased
    pub fn name_contains(&self, fragment: &str) -> bool {
        self.name.to_lowercase().contains(fragment)
    }
}

/// Errors that can occur when loading or reading products
#[derive(Debug, Error)]
pub enum StoreError {
    /// The catalog file could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share a name (ignoring case)
    #[error("Duplicate product name in catalog: '{0}'")]
    DuplicateProduct(String),

    /// A product has a blank name
    #[error("Product {0} has an empty name")]
    EmptyName(u32),
}

/// Read-only access to the product table
///
/// Store access is the only suspension point on a request path, so the trait
/// is async even though the bundled implementation is in memory.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetches the product whose name equals `name`, ignoring case
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Returns every product whose name contains `fragment`, ignoring case,
    /// in catalog order
    async fn search(&self, fragment: &str) -> Result<Vec<Product>, StoreError>;
}
