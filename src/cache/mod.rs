//! Cache module for search results
//!
//! This module provides the shared search cache used by the lookup service and
//! a background sweeper that periodically drops expired entries. The cache is
//! handed to the service as a trait object so tests can substitute their own
//! clock or cache.

mod manager;
mod sweeper;

pub use manager::{SearchCache, TtlCache, DEFAULT_SEARCH_TTL_SECS};
pub use sweeper::{spawn_sweeper, SweeperConfig, SweeperHandle};
