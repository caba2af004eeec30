//! Provider categories, projected records, and the per-category fetch outcome

use roamwise_common::GeoPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Data domain fetched independently per trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hotels,
    Restaurants,
    Attractions,
}

impl Category {
    /// Path segment used by the provider endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hotels => "hotels",
            Category::Restaurants => "restaurants",
            Category::Attractions => "attractions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lodging/dining/attraction record after field projection
///
/// Identity is `external_id`, which is only unique within one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub category: Category,
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub num_reviews: Option<u64>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Remaining allow-listed, category-specific fields
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

/// Which strategy produced a category's list
///
/// Exactly one variant holds per category per trip-creation attempt. The
/// lists carried by `FromPoint` and `FromBounds` are never empty.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Empty,
    FromPoint(Vec<ProviderRecord>),
    FromBounds(Vec<ProviderRecord>),
}

impl FetchOutcome {
    /// Two-tier fallback: point results win when present, bounds otherwise
    ///
    /// Never unions the lists; the strategies key overlapping places differently.
    pub fn resolve(point: Vec<ProviderRecord>, bounds: Vec<ProviderRecord>) -> Self {
        if !point.is_empty() {
            FetchOutcome::FromPoint(point)
        } else if !bounds.is_empty() {
            FetchOutcome::FromBounds(bounds)
        } else {
            FetchOutcome::Empty
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            FetchOutcome::Empty => "empty",
            FetchOutcome::FromPoint(_) => "point",
            FetchOutcome::FromBounds(_) => "bounds",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FetchOutcome::Empty => 0,
            FetchOutcome::FromPoint(records) | FetchOutcome::FromBounds(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Vec<ProviderRecord> {
        match self {
            FetchOutcome::Empty => Vec::new(),
            FetchOutcome::FromPoint(records) | FetchOutcome::FromBounds(records) => records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ProviderRecord {
        ProviderRecord {
            category: Category::Hotels,
            external_id: id.to_string(),
            name: format!("Hotel {}", id),
            address: String::new(),
            location: None,
            rating: None,
            num_reviews: None,
            photo_url: None,
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn test_point_wins_when_non_empty() {
        let point = vec![record("p1"), record("p2")];
        let bounds = vec![record("b1")];

        let outcome = FetchOutcome::resolve(point.clone(), bounds);

        assert_eq!(outcome, FetchOutcome::FromPoint(point.clone()));
        assert_eq!(outcome.into_records(), point);
    }

    #[test]
    fn test_bounds_used_when_point_empty() {
        let bounds = vec![record("b1")];

        let outcome = FetchOutcome::resolve(Vec::new(), bounds.clone());

        assert_eq!(outcome.strategy(), "bounds");
        assert_eq!(outcome.into_records(), bounds);
    }

    #[test]
    fn test_both_empty_is_empty_list() {
        let outcome = FetchOutcome::resolve(Vec::new(), Vec::new());

        assert_eq!(outcome, FetchOutcome::Empty);
        assert!(outcome.is_empty());
        assert_eq!(outcome.into_records(), Vec::<ProviderRecord>::new());
    }

    #[test]
    fn test_single_point_record_beats_larger_bounds_list() {
        // Emptiness is the only criterion; list length is not compared
        let point = vec![record("p1")];
        let bounds = (0..20).map(|i| record(&format!("b{}", i))).collect();

        let outcome = FetchOutcome::resolve(point, bounds);

        assert_eq!(outcome.strategy(), "point");
        assert_eq!(outcome.len(), 1);
    }

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Restaurants).unwrap(), "\"restaurants\"");
        assert_eq!(Category::Attractions.to_string(), "attractions");
    }
}
