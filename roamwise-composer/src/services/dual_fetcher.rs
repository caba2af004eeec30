//! Dual-strategy category fetching
//!
//! For one category, the point-radius and bounding-box queries run
//! concurrently and resolve into a single [`FetchOutcome`]:
//! point results when non-empty, bounds results otherwise, else empty.
//! The lists are never merged.

use std::sync::Arc;
use tracing::debug;

use super::provider_client::PlaceProvider;
use crate::models::{Category, Destination, FetchOutcome, ProviderRecord};

/// Resolves one authoritative list per category from two provider strategies
#[derive(Clone)]
pub struct DualStrategyFetcher {
    provider: Arc<dyn PlaceProvider>,
}

impl DualStrategyFetcher {
    pub fn new(provider: Arc<dyn PlaceProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn PlaceProvider> {
        &self.provider
    }

    /// Fetch one category for a destination
    ///
    /// Without destination bounds the bounds tier is empty and no call is made.
    pub async fn fetch(
        &self,
        category: Category,
        destination: &Destination,
        currency: &str,
    ) -> FetchOutcome {
        let point_fetch = self
            .provider
            .fetch_by_point(category, destination.point, currency);

        let bounds_fetch = async {
            match destination.bounds {
                Some(bounds) => self.provider.fetch_by_bounds(category, bounds, currency).await,
                None => Vec::<ProviderRecord>::new(),
            }
        };

        let (point, bounds) = tokio::join!(point_fetch, bounds_fetch);

        debug!(
            category = %category,
            source = self.provider.source_id(),
            point_count = point.len(),
            bounds_count = bounds.len(),
            "Both fetch strategies completed"
        );

        let outcome = FetchOutcome::resolve(point, bounds);

        debug!(
            category = %category,
            strategy = outcome.strategy(),
            count = outcome.len(),
            "Category resolved"
        );

        outcome
    }
}
