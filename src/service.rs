//! Lookup service
//!
//! Answers the two questions the client asks: "when does product X expire in
//! zone Y" and "which products match Q". The store, cache and clock are all
//! injected so each can be replaced in tests.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::cache::SearchCache;
use crate::clock::Clock;
use crate::data::{Product, ProductStore, StoreError};
use crate::expiration::{compute_expiration, ExpirationDate, ExpirationError, TimeZoneSpec};

/// Errors returned by [`LookupService`]
#[derive(Debug, Error)]
pub enum LookupError {
    /// No product has exactly this name
    #[error("Product not found: '{0}'")]
    ProductNotFound(String),

    /// The expiration could not be computed
    #[error(transparent)]
    Expiration(#[from] ExpirationError),

    /// The product store failed
    #[error("Product store error: {0}")]
    Store(#[from] StoreError),
}

/// A product's expiration as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationResult {
    pub product_name: String,
    pub shelf_life_days: u32,
    pub expiration_date: ExpirationDate,
}

/// Orchestrates the product store, search cache and expiration calculator
pub struct LookupService {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn SearchCache>,
    clock: Arc<dyn Clock>,
}

impl LookupService {
    pub fn new(
        store: Arc<dyn ProductStore>,
        cache: Arc<dyn SearchCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
        }
    }

    /// The shared search cache, for the background sweeper
    pub fn cache(&self) -> Arc<dyn SearchCache> {
        Arc::clone(&self.cache)
    }

    /// Looks up `name` (exact, ignoring case) and computes its expiration in `zone`
    ///
    /// The clock is only read once the product has been found.
    pub async fn get_shelf_life(
        &self,
        name: &str,
        zone: &TimeZoneSpec,
    ) -> Result<ExpirationResult, LookupError> {
        let product = self
            .store
            .find_by_name(name)
            .await?
            .ok_or_else(|| LookupError::ProductNotFound(name.to_string()))?;

        let expiration_date = compute_expiration(product.shelf_life_days, zone, self.clock.now())?;

        Ok(ExpirationResult {
            product_name: product.name,
            shelf_life_days: product.shelf_life_days,
            expiration_date,
        })
    }

    /// Returns products whose name contains `partial_name`, ignoring case
    ///
    /// An empty query matches nothing. Results are cached per lower-cased
    /// query; concurrent misses on one key may both hit the store.
    pub async fn search_products(&self, partial_name: &str) -> Result<Vec<Product>, LookupError> {
        let key = partial_name.to_lowercase();
        if key.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(products) = self.cache.get(&key) {
            debug!(query = %key, hits = products.len(), "Search cache hit");
            return Ok(products);
        }

        let products = self.store.search(&key).await?;
        debug!(query = %key, hits = products.len(), "Search cache miss");

        self.cache.insert(key, products.clone());
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use crate::cache::TtlCache;
    use crate::clock::ManualClock;
    use crate::data::{Catalog, CatalogStore};

    /// Wraps the built-in catalog and counts store calls
    struct CountingStore {
        inner: CatalogStore,
        finds: AtomicUsize,
        searches: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: CatalogStore::new(Catalog::builtin()),
                finds: AtomicUsize::new(0),
                searches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProductStore for CountingStore {
        async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_name(name).await
        }

        async fn search(&self, fragment: &str) -> Result<Vec<Product>, StoreError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.inner.search(fragment).await
        }
    }

    /// A store that is always down
    struct FailingStore;

    #[async_trait]
    impl ProductStore for FailingStore {
        async fn find_by_name(&self, _name: &str) -> Result<Option<Product>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("connection refused")))
        }

        async fn search(&self, _fragment: &str) -> Result<Vec<Product>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("connection refused")))
        }
    }

    struct Fixture {
        service: LookupService,
        store: Arc<CountingStore>,
        clock: Arc<ManualClock>,
    }

    fn create_service() -> Fixture {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let store = Arc::new(CountingStore::new());
        let cache = Arc::new(TtlCache::with_clock(
            std::time::Duration::from_secs(600),
            clock.clone(),
        ));
        let service = LookupService::new(store.clone(), cache, clock.clone());

        Fixture {
            service,
            store,
            clock,
        }
    }

    fn gmt(hours: i32) -> TimeZoneSpec {
        TimeZoneSpec::FixedOffset { hours }
    }

    #[tokio::test]
    async fn test_get_shelf_life_computes_expiration() {
        let fixture = create_service();

        let result = fixture
            .service
            .get_shelf_life("chicken breast", &gmt(-5))
            .await
            .expect("Lookup should succeed");

        assert_eq!(result.product_name, "Chicken Breast");
        assert_eq!(result.shelf_life_days, 2);
        assert_eq!(result.expiration_date.month, "01");
        assert_eq!(result.expiration_date.date, "02");
        assert_eq!(result.expiration_date.day_of_week, "Tuesday");
        assert_eq!(result.expiration_date.time, "07:00 PM");
    }

    #[tokio::test]
    async fn test_get_shelf_life_unknown_product_skips_calculation() {
        let fixture = create_service();

        let result = fixture.service.get_shelf_life("Durian", &gmt(0)).await;

        assert!(matches!(result, Err(LookupError::ProductNotFound(name)) if name == "Durian"));
        assert_eq!(fixture.store.finds.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.clock.reads(), 0, "Calculator should not run for a missing product");
    }

    #[tokio::test]
    async fn test_get_shelf_life_requires_exact_name() {
        let fixture = create_service();

        let result = fixture.service.get_shelf_life("Straw", &gmt(0)).await;

        assert!(matches!(result, Err(LookupError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_shelf_life_propagates_calculator_errors() {
        let clock = Arc::new(ManualClock::new(chrono::DateTime::<Utc>::MAX_UTC));
        let store = Arc::new(CountingStore::new());
        let service = LookupService::new(store, Arc::new(TtlCache::default()), clock);

        let result = service.get_shelf_life("Eggs", &gmt(0)).await;

        assert!(matches!(
            result,
            Err(LookupError::Expiration(ExpirationError::OutOfRange(21)))
        ));
    }

    #[tokio::test]
    async fn test_get_shelf_life_reports_store_failure() {
        let service = LookupService::new(
            Arc::new(FailingStore),
            Arc::new(TtlCache::default()),
            Arc::new(ManualClock::new(Utc::now())),
        );

        let result = service.get_shelf_life("Eggs", &gmt(0)).await;

        assert!(matches!(result, Err(LookupError::Store(_))));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let fixture = create_service();

        let results = fixture.service.search_products("straw").await.unwrap();

        assert!(results.iter().any(|p| p.name == "Strawberry Shortcake"));

        let upper = fixture.service.search_products("STRAW").await.unwrap();
        assert_eq!(upper, results);
    }

    #[tokio::test]
    async fn test_search_empty_query_returns_empty_without_store_access() {
        let fixture = create_service();

        let results = fixture.service.search_products("").await.unwrap();

        assert!(results.is_empty());
        assert_eq!(fixture.store.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_no_match_returns_empty() {
        let fixture = create_service();

        let results = fixture.service.search_products("durian").await.unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_within_ttl_hits_cache() {
        let fixture = create_service();

        let first = fixture.service.search_products("cheese").await.unwrap();
        fixture.clock.advance(Duration::minutes(9));
        let second = fixture.service.search_products("Cheese").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fixture.store.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_after_ttl_reloads_from_store() {
        let fixture = create_service();

        fixture.service.search_products("cheese").await.unwrap();
        fixture.clock.advance(Duration::minutes(10));
        fixture.service.search_products("cheese").await.unwrap();

        assert_eq!(fixture.store.searches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_caches_empty_results() {
        let fixture = create_service();

        fixture.service.search_products("durian").await.unwrap();
        fixture.service.search_products("durian").await.unwrap();

        assert_eq!(fixture.store.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_store_failure_is_not_cached() {
        let cache = Arc::new(TtlCache::default());
        let service = LookupService::new(
            Arc::new(FailingStore),
            cache.clone(),
            Arc::new(ManualClock::new(Utc::now())),
        );

        let result = service.search_products("milk").await;

        assert!(matches!(result, Err(LookupError::Store(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expiration_result_serializes_with_client_field_names() {
        let result = ExpirationResult {
            product_name: "Eggs".to_string(),
            shelf_life_days: 21,
            expiration_date: ExpirationDate {
                month: "01".to_string(),
                date: "22".to_string(),
                day_of_week: "Monday".to_string(),
                time: "12:00 AM".to_string(),
            },
        };

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["productName"], "Eggs");
        assert_eq!(json["shelfLifeDays"], 21);
        assert_eq!(json["expirationDate"]["dayOfWeek"], "Monday");
    }
}
