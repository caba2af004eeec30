//! Generated narrative and structured-fact content
//!
//! Every field defaults to its empty representation so a partially filled
//! reply from the generative backend still deserializes.

use serde::{Deserialize, Serialize};

/// Traveler review of the destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub reviewer: String,
    pub rating: f64,
    pub comment: String,
}

/// Security or fraud warning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub title: String,
    pub description: String,
    pub severity: String,
}

/// Way of getting around at the destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOption {
    pub mode: String,
    pub description: String,
    pub estimated_cost: String,
}

/// Local currency facts; zeroed when unknown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFacts {
    pub code: String,
    pub symbol: String,
    pub name: String,
    /// Units of local currency per one unit of the trip's currency
    pub exchange_rate: f64,
}

/// Local guide listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guide {
    pub name: String,
    pub specialty: String,
    pub languages: Vec<String>,
    pub rating: f64,
    pub contact: String,
    pub bio: String,
}

/// Reply of the itinerary-facts request group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItineraryFacts {
    pub overview: String,
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub security_alerts: Vec<Alert>,
    pub fraud_alerts: Vec<Alert>,
    pub transportation: Vec<TransportOption>,
    pub currency: Option<CurrencyFacts>,
    pub languages: Vec<String>,
}

/// Reply of the local-guides request group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideListing {
    pub guides: Vec<Guide>,
}

/// Content bundle as flattened into the trip aggregate
///
/// No optional leaves: absent content is `""`, `[]` or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub overview: String,
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub security_alerts: Vec<Alert>,
    pub fraud_alerts: Vec<Alert>,
    pub transportation: Vec<TransportOption>,
    /// Stored as `local_currency`; the aggregate's own `currency` is the trip currency
    #[serde(rename = "local_currency")]
    pub currency: CurrencyFacts,
    pub languages: Vec<String>,
    pub local_guides: Vec<Guide>,
}

impl GeneratedContent {
    /// Coerce the two request groups into the bundle
    pub fn from_groups(facts: Option<ItineraryFacts>, guides: Vec<Guide>) -> Self {
        let facts = facts.unwrap_or_default();

        Self {
            overview: facts.overview,
            rating: facts.rating,
            reviews: facts.reviews,
            security_alerts: facts.security_alerts,
            fraud_alerts: facts.fraud_alerts,
            transportation: facts.transportation,
            currency: facts.currency.unwrap_or_default(),
            languages: facts.languages,
            local_guides: guides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_groups_coerce_to_empty() {
        let content = GeneratedContent::from_groups(None, Vec::new());

        assert_eq!(content, GeneratedContent::default());
        assert_eq!(content.overview, "");
        assert_eq!(content.currency.exchange_rate, 0.0);

        let json = serde_json::to_value(&content).unwrap();
        assert!(json.as_object().unwrap().values().all(|v| !v.is_null()));
        assert!(json.get("local_currency").is_some());
    }

    #[test]
    fn test_partial_facts_deserialize_with_defaults() {
        let facts: ItineraryFacts =
            serde_json::from_str(r#"{"overview": "Lisbon is hilly.", "languages": ["Portuguese"]}"#)
                .unwrap();

        assert_eq!(facts.overview, "Lisbon is hilly.");
        assert!(facts.reviews.is_empty());
        assert!(facts.currency.is_none());

        let content = GeneratedContent::from_groups(Some(facts), Vec::new());
        assert_eq!(content.languages, vec!["Portuguese".to_string()]);
        assert_eq!(content.currency, CurrencyFacts::default());
    }

    #[test]
    fn test_guides_carried_through() {
        let guide = Guide {
            name: "Aoife".to_string(),
            ..Guide::default()
        };

        let content = GeneratedContent::from_groups(None, vec![guide.clone()]);

        assert_eq!(content.local_guides, vec![guide]);
    }
}
