//! Product catalog
//!
//! Holds the product table in memory. The table is either the built-in seed
//! list below or a JSON file of the form
//! `[{ "id": 1, "productName": "Whole Milk", "shelfLifeDays": 7 }, ...]`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_trait::async_trait;

use super::{Product, ProductStore, StoreError};

/// Built-in seed products: (name, shelf life in days)
static SEED_PRODUCTS: [(&str, u32); 12] = [
    ("Whole Milk", 7),
    ("Greek Yogurt", 14),
    ("Cheddar Cheese", 28),
    ("Eggs", 21),
    ("Sourdough Bread", 5),
    ("Strawberry Shortcake", 3),
    ("Strawberries", 5),
    ("Chicken Breast", 2),
    ("Ground Beef", 2),
    ("Salmon Fillet", 2),
    ("Baby Spinach", 6),
    ("Hummus", 10),
];

/// Returns the built-in seed products with ids assigned in order from 1
pub fn builtin_products() -> Vec<Product> {
    SEED_PRODUCTS
        .iter()
        .zip(1u32..)
        .map(|(&(name, days), id)| Product::new(id, name, days))
        .collect()
}

/// A validated, ordered product table
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog, rejecting blank names and duplicate names
    pub fn new(products: Vec<Product>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();

        for product in &products {
            if product.name.trim().is_empty() {
                return Err(StoreError::EmptyName(product.id));
            }
            if !seen.insert(product.name.to_lowercase()) {
                return Err(StoreError::DuplicateProduct(product.name.clone()));
            }
        }

        Ok(Self { products })
    }

    /// The built-in seed catalog
    pub fn builtin() -> Self {
        Self {
            products: builtin_products(),
        }
    }

    /// Loads a catalog from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&content)?;
        Self::new(products)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Finds a product by exact name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.name_matches(name))
    }

    /// All products whose name contains `fragment`, ignoring case
    pub fn search(&self, fragment: &str) -> Vec<Product> {
        let fragment = fragment.to_lowercase();
        self.products
            .iter()
            .filter(|product| product.name_contains(&fragment))
            .cloned()
            .collect()
    }
}

/// [`ProductStore`] backed by an in-memory [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog: Catalog,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl ProductStore for CatalogStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.catalog.find_by_name(name).cloned())
    }

    async fn search(&self, fragment: &str) -> Result<Vec<Product>, StoreError> {
        Ok(self.catalog.search(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("products.json");
        fs::write(&path, content).expect("Failed to write catalog file");
        path
    }

    #[test]
    fn test_builtin_catalog_has_12_entries() {
        assert_eq!(Catalog::builtin().len(), 12);
    }

    #[test]
    fn test_builtin_products_have_unique_ids_and_names() {
        let products = builtin_products();
        let ids: HashSet<u32> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());

        assert!(
            Catalog::new(products).is_ok(),
            "Seed list should pass catalog validation"
        );
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let catalog = Catalog::builtin();

        let product = catalog.find_by_name("whole milk").expect("Should find milk");
        assert_eq!(product.name, "Whole Milk");
        assert_eq!(product.shelf_life_days, 7);
    }

    #[test]
    fn test_find_by_name_requires_exact_match() {
        let catalog = Catalog::builtin();

        assert!(catalog.find_by_name("Milk").is_none());
        assert!(catalog.find_by_name("Whole Milk 2%").is_none());
    }

    #[test]
    fn test_search_matches_substring_in_catalog_order() {
        let catalog = Catalog::builtin();

        let names: Vec<String> = catalog.search("STRAW").into_iter().map(|p| p.name).collect();

        assert_eq!(names, vec!["Strawberry Shortcake", "Strawberries"]);
    }

    #[test]
    fn test_search_with_no_match_is_empty() {
        assert!(Catalog::builtin().search("durian").is_empty());
    }

    #[test]
    fn test_new_rejects_duplicate_names_ignoring_case() {
        let result = Catalog::new(vec![
            Product::new(1, "Eggs", 21),
            Product::new(2, "EGGS", 14),
        ]);

        assert!(matches!(result, Err(StoreError::DuplicateProduct(name)) if name == "EGGS"));
    }

    #[test]
    fn test_new_rejects_blank_names() {
        let result = Catalog::new(vec![Product::new(9, "   ", 1)]);

        assert!(matches!(result, Err(StoreError::EmptyName(9))));
    }

    #[test]
    fn test_from_json_file_loads_products() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_catalog(
            &dir,
            r#"[
                { "id": 1, "productName": "Kimchi", "shelfLifeDays": 90 },
                { "id": 2, "productName": "Tofu", "shelfLifeDays": 0 }
            ]"#,
        );

        let catalog = Catalog::from_json_file(&path).expect("Catalog should load");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[0], Product::new(1, "Kimchi", 90));
        assert_eq!(catalog.products()[1].shelf_life_days, 0);
    }

    #[test]
    fn test_from_json_file_missing_file_is_io_error() {
        let dir = TempDir::new().expect("Failed to create temp directory");

        let result = Catalog::from_json_file(&dir.path().join("missing.json"));

        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_from_json_file_rejects_negative_shelf_life() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_catalog(
            &dir,
            r#"[{ "id": 1, "productName": "Tofu", "shelfLifeDays": -1 }]"#,
        );

        let result = Catalog::from_json_file(&path);

        assert!(matches!(result, Err(StoreError::Parse(_))));
    }

    #[tokio::test]
    async fn test_catalog_store_implements_product_store() {
        let store = CatalogStore::new(Catalog::builtin());

        let found = store.find_by_name("EGGS").await.expect("Store should not fail");
        assert_eq!(found.map(|p| p.shelf_life_days), Some(21));

        let missing = store.find_by_name("Durian").await.expect("Store should not fail");
        assert!(missing.is_none());

        let matches = store.search("bee").await.expect("Store should not fail");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Ground Beef");
    }
}
