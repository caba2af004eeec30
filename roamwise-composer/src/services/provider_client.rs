//! Geo-data provider client
//!
//! Queries the `list-by-latlng` and `list-in-boundary` endpoints per category.
//! Every failure mode (missing key, transport error, non-2xx status,
//! malformed payload) degrades to an empty list plus a warning: a category
//! with no data thins the trip, it never aborts it. No retries.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use roamwise_common::config::ProviderConfig;
use roamwise_common::{GeoBounds, GeoPoint};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::projection;
use crate::models::{Category, ProviderRecord};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Provider client errors
///
/// Internal to the client; callers only ever see empty lists.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider API key not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Source of lodging/dining/attraction records
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Provider identifier for logs
    fn source_id(&self) -> &'static str;

    /// Records within the search radius of a point
    async fn fetch_by_point(
        &self,
        category: Category,
        point: GeoPoint,
        currency: &str,
    ) -> Vec<ProviderRecord>;

    /// Records inside a bounding box
    async fn fetch_by_bounds(
        &self,
        category: Category,
        bounds: GeoBounds,
        currency: &str,
    ) -> Vec<ProviderRecord>;

    /// Whether the provider can serve requests at all (API key configured etc.)
    fn is_available(&self) -> bool {
        true
    }
}

/// `{"data": [...]}` envelope; entries stay raw until projection
#[derive(Debug, Deserialize)]
struct ProviderEnvelope {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Travel Advisor (RapidAPI) client
pub struct TravelAdvisorClient {
    http_client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
    result_limit: u32,
    search_radius_km: u32,
    lang: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl TravelAdvisorClient {
    pub fn new(config: &ProviderConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            host: config.host.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            result_limit: config.result_limit,
            search_radius_km: config.search_radius_km,
            lang: config.lang.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    fn point_query(&self, point: GeoPoint, currency: &str) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", point.lat.to_string()),
            ("longitude", point.lng.to_string()),
            ("distance", self.search_radius_km.to_string()),
            ("limit", self.result_limit.to_string()),
            ("currency", currency.to_string()),
            ("lang", self.lang.clone()),
        ]
    }

    fn bounds_query(&self, bounds: GeoBounds, currency: &str) -> Vec<(&'static str, String)> {
        vec![
            ("bl_latitude", bounds.southwest.lat.to_string()),
            ("bl_longitude", bounds.southwest.lng.to_string()),
            ("tr_latitude", bounds.northeast.lat.to_string()),
            ("tr_longitude", bounds.northeast.lng.to_string()),
            ("limit", self.result_limit.to_string()),
            ("currency", currency.to_string()),
            ("lang", self.lang.clone()),
        ]
    }

    /// One GET against `{base}/{category}/{endpoint}`, projected
    async fn get_records(
        &self,
        category: Category,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}/{}", self.base_url, category.as_str(), endpoint);
        debug!(category = %category, url = %url, "Querying provider");

        let response = self
            .http_client
            .get(&url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(status.as_u16(), error_text));
        }

        let envelope: ProviderEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(projection::project_all(category, &envelope.data))
    }
}

/// Collapse an error into the empty list the pipeline expects
fn degrade(
    category: Category,
    strategy: &'static str,
    result: Result<Vec<ProviderRecord>, ProviderError>,
) -> Vec<ProviderRecord> {
    match result {
        Ok(records) => {
            debug!(
                category = %category,
                strategy,
                count = records.len(),
                "Provider returned records"
            );
            records
        }
        Err(ProviderError::NotConfigured) => {
            debug!(category = %category, strategy, "Provider not configured, skipping");
            Vec::new()
        }
        Err(e) => {
            warn!(
                category = %category,
                strategy,
                error = %e,
                "Provider call failed, treating as empty"
            );
            Vec::new()
        }
    }
}

#[async_trait]
impl PlaceProvider for TravelAdvisorClient {
    fn source_id(&self) -> &'static str {
        "TravelAdvisor"
    }

    async fn fetch_by_point(
        &self,
        category: Category,
        point: GeoPoint,
        currency: &str,
    ) -> Vec<ProviderRecord> {
        let query = self.point_query(point, currency);
        let result = self.get_records(category, "list-by-latlng", &query).await;
        degrade(category, "point", result)
    }

    async fn fetch_by_bounds(
        &self,
        category: Category,
        bounds: GeoBounds,
        currency: &str,
    ) -> Vec<ProviderRecord> {
        let query = self.bounds_query(bounds, currency);
        let result = self.get_records(category, "list-in-boundary", &query).await;
        degrade(category, "bounds", result)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_unavailable() {
        let client = TravelAdvisorClient::new(&ProviderConfig::default(), Some("  ".to_string()))
            .unwrap();
        assert!(!client.is_available());

        let client =
            TravelAdvisorClient::new(&ProviderConfig::default(), Some("key".to_string())).unwrap();
        assert!(client.is_available());
        assert_eq!(client.source_id(), "TravelAdvisor");
    }

    #[test]
    fn test_zero_rate_limit_clamped() {
        let config = ProviderConfig {
            requests_per_second: 0,
            ..ProviderConfig::default()
        };
        assert!(TravelAdvisorClient::new(&config, None).is_ok());
    }

    #[test]
    fn test_bounds_query_uses_corners() {
        let client = TravelAdvisorClient::new(&ProviderConfig::default(), None).unwrap();
        let bounds = GeoBounds::new(
            GeoPoint::new(53.2, -6.4).unwrap(),
            GeoPoint::new(53.4, -6.1).unwrap(),
        )
        .unwrap();

        let query = client.bounds_query(bounds, "EUR");

        assert!(query.contains(&("bl_latitude", "53.2".to_string())));
        assert!(query.contains(&("tr_longitude", "-6.1".to_string())));
        assert!(query.contains(&("currency", "EUR".to_string())));
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_empty_without_network() {
        let config = ProviderConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ProviderConfig::default()
        };
        let client = TravelAdvisorClient::new(&config, None).unwrap();

        let records = client
            .fetch_by_point(Category::Hotels, GeoPoint::new(0.0, 0.0).unwrap(), "USD")
            .await;

        assert!(records.is_empty());
    }
}
