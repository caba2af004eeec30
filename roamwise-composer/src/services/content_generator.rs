//! Narrative and structured-fact content for a destination
//!
//! Two independent request groups: itinerary facts and local guides. Each
//! sends a fixed instruction turn and a worked exemplar ahead of the actual
//! prompt, rebuilt for every call. Backend failures and unparseable replies
//! are logged and come back as `None` / empty lists.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::gemini_client::{ChatTurn, GeneratorError, TextGenerator};
use crate::models::{BudgetTier, Guide, GuideListing, ItineraryFacts};

const FACTS_INSTRUCTIONS: &str = "You are a travel research assistant. Answer every request \
with a single JSON object and nothing else: no prose, no markdown. Use exactly these keys: \
\"overview\" (string, 2-4 sentences naming the destination), \"rating\" (number 0-5), \
\"reviews\" (array of {\"reviewer\", \"rating\", \"comment\"}), \"security_alerts\" and \
\"fraud_alerts\" (arrays of {\"title\", \"description\", \"severity\"} with severity one of \
low/medium/high), \"transportation\" (array of {\"mode\", \"description\", \"estimated_cost\"}), \
\"currency\" ({\"code\", \"symbol\", \"name\", \"exchange_rate\"} relative to the trip currency), \
\"languages\" (array of strings).\n\nDestination: Kyoto, Japan\nDays: 3\nTravelers: 1\n\
Budget: low\nInterests: Temples, Food";

const FACTS_EXEMPLAR: &str = r#"{"overview":"Kyoto, Japan's former imperial capital, packs over a thousand temples, wooden machiya streets and a celebrated food culture into a walkable city.","rating":4.8,"reviews":[{"reviewer":"Mika","rating":5,"comment":"Fushimi Inari at sunrise was unforgettable."}],"security_alerts":[{"title":"Crowded stations","description":"Keep bags closed at Kyoto Station during rush hour.","severity":"low"}],"fraud_alerts":[{"title":"Unlicensed guides","description":"Decline unofficial guides approaching at temple gates.","severity":"low"}],"transportation":[{"mode":"Bus","description":"City buses reach most temples; buy a day pass.","estimated_cost":"700 JPY per day"}],"currency":{"code":"JPY","symbol":"¥","name":"Japanese Yen","exchange_rate":151.2},"languages":["Japanese"]}"#;

const GUIDES_INSTRUCTIONS: &str = "You are a travel research assistant. Answer every request \
with a single JSON object and nothing else: no prose, no markdown. Use the shape \
{\"guides\": [{\"name\", \"specialty\", \"languages\" (array of strings), \"rating\" (number 0-5), \
\"contact\", \"bio\"}]} and list up to five local guides.\n\nDestination: Kyoto, Japan";

const GUIDES_EXEMPLAR: &str = r#"{"guides":[{"name":"Haruto Sato","specialty":"Zen temples and gardens","languages":["Japanese","English"],"rating":4.9,"contact":"haruto@example.com","bio":"Former monk offering quiet morning temple walks."}]}"#;

/// Guide replies come back either wrapped or as a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum GuideReply {
    Wrapped(GuideListing),
    Bare(Vec<Guide>),
}

/// Produces the generated parts of a trip
#[derive(Clone)]
pub struct ContentGenerator {
    backend: Arc<dyn TextGenerator>,
}

impl ContentGenerator {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn TextGenerator> {
        &self.backend
    }

    /// Overview, reviews, alerts, transportation, currency and languages
    pub async fn generate_itinerary_facts(
        &self,
        destination_label: &str,
        days: u32,
        travelers: u32,
        budget: BudgetTier,
        interests: &[String],
    ) -> Option<ItineraryFacts> {
        let interests = if interests.is_empty() {
            "General sightseeing".to_string()
        } else {
            interests.join(", ")
        };
        let prompt = format!(
            "Destination: {}\nDays: {}\nTravelers: {}\nBudget: {}\nInterests: {}",
            destination_label, days, travelers, budget, interests
        );

        let turns = [
            ChatTurn::user(FACTS_INSTRUCTIONS),
            ChatTurn::model(FACTS_EXEMPLAR),
            ChatTurn::user(prompt),
        ];

        match self.request::<ItineraryFacts>(&turns).await {
            Ok(facts) => {
                debug!(
                    destination = %destination_label,
                    reviews = facts.reviews.len(),
                    transportation = facts.transportation.len(),
                    "Itinerary facts generated"
                );
                Some(facts)
            }
            Err(e) => {
                log_degraded("itinerary_facts", destination_label, &e);
                None
            }
        }
    }

    /// Local guide listings
    pub async fn generate_local_guides(&self, destination_label: &str) -> Vec<Guide> {
        let turns = [
            ChatTurn::user(GUIDES_INSTRUCTIONS),
            ChatTurn::model(GUIDES_EXEMPLAR),
            ChatTurn::user(format!("Destination: {}", destination_label)),
        ];

        match self.request::<GuideReply>(&turns).await {
            Ok(reply) => {
                let guides = match reply {
                    GuideReply::Wrapped(listing) => listing.guides,
                    GuideReply::Bare(guides) => guides,
                };
                debug!(
                    destination = %destination_label,
                    count = guides.len(),
                    "Local guides generated"
                );
                guides
            }
            Err(e) => {
                log_degraded("local_guides", destination_label, &e);
                Vec::new()
            }
        }
    }

    async fn request<T: DeserializeOwned>(&self, turns: &[ChatTurn]) -> Result<T, GeneratorError> {
        let text = self.backend.generate(turns).await?;
        parse_structured(&text)
    }
}

fn log_degraded(group: &'static str, destination: &str, error: &GeneratorError) {
    match error {
        GeneratorError::NotConfigured => {
            debug!(group, destination = %destination, "Generator not configured, skipping");
        }
        _ => {
            warn!(
                group,
                destination = %destination,
                backend_error = %error,
                "Content generation failed, leaving fields empty"
            );
        }
    }
}

/// Parse backend text as JSON, tolerating markdown fences and chatter
///
/// Tries the fence-stripped text first, then the outermost `{...}` or `[...]` span.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, GeneratorError> {
    let stripped = strip_code_fences(text);

    let first_error = match serde_json::from_str::<T>(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (stripped.find(open), stripped.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<T>(&stripped[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(GeneratorError::ParseError(first_error.to_string()))
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend replying with canned text and recording the turns it saw
    struct CannedBackend {
        reply: Result<String, ()>,
        seen: Mutex<Vec<Vec<ChatTurn>>>,
    }

    impl CannedBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedBackend {
        fn backend_id(&self) -> &'static str {
            "Canned"
        }

        async fn generate(&self, turns: &[ChatTurn]) -> Result<String, GeneratorError> {
            self.seen.lock().unwrap().push(turns.to_vec());
            self.reply
                .clone()
                .map_err(|_| GeneratorError::ApiError(503, "unavailable".to_string()))
        }
    }

    #[test]
    fn test_exemplars_parse() {
        let facts: ItineraryFacts = parse_structured(FACTS_EXEMPLAR).unwrap();
        assert_eq!(facts.currency.unwrap().code, "JPY");

        let guides: GuideListing = parse_structured(GUIDES_EXEMPLAR).unwrap();
        assert_eq!(guides.guides.len(), 1);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"overview\": \"Porto\"}\n```";
        let facts: ItineraryFacts = parse_structured(text).unwrap();
        assert_eq!(facts.overview, "Porto");
    }

    #[test]
    fn test_parse_json_with_surrounding_chatter() {
        let text = "Sure! Here you go:\n{\"overview\": \"Oslo\"}\nEnjoy.";
        let facts: ItineraryFacts = parse_structured(text).unwrap();
        assert_eq!(facts.overview, "Oslo");
    }

    #[test]
    fn test_parse_malformed_is_error() {
        let err = parse_structured::<ItineraryFacts>("{\"overview\": ").unwrap_err();
        assert!(matches!(err, GeneratorError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_facts_prompt_is_stateless() {
        let backend = Arc::new(CannedBackend::ok(r#"{"overview": "Dublin is lively."}"#));
        let generator = ContentGenerator::new(backend.clone());

        let interests = vec!["History".to_string(), "Food".to_string()];
        generator
            .generate_itinerary_facts("Dublin, Ireland", 4, 2, BudgetTier::Medium, &interests)
            .await;
        generator
            .generate_itinerary_facts("Lisbon, Portugal", 2, 1, BudgetTier::Low, &[])
            .await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        // Same fixed preamble, no turns carried over from the first call
        assert_eq!(seen[0].len(), 3);
        assert_eq!(seen[1].len(), 3);
        assert_eq!(seen[0][..2], seen[1][..2]);
        assert!(seen[0][2].text.contains("Dublin, Ireland"));
        assert!(seen[0][2].text.contains("History, Food"));
        assert!(seen[1][2].text.contains("General sightseeing"));
    }

    #[tokio::test]
    async fn test_backend_failure_yields_none() {
        let generator = ContentGenerator::new(Arc::new(CannedBackend::failing()));

        let facts = generator
            .generate_itinerary_facts("Dublin, Ireland", 4, 2, BudgetTier::Medium, &[])
            .await;
        let guides = generator.generate_local_guides("Dublin, Ireland").await;

        assert!(facts.is_none());
        assert!(guides.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_none() {
        let generator =
            ContentGenerator::new(Arc::new(CannedBackend::ok("I cannot help with that.")));

        let facts = generator
            .generate_itinerary_facts("Dublin, Ireland", 4, 2, BudgetTier::Medium, &[])
            .await;

        assert!(facts.is_none());
    }

    #[tokio::test]
    async fn test_guides_accept_bare_array() {
        let generator = ContentGenerator::new(Arc::new(CannedBackend::ok(
            r#"[{"name": "Niamh", "specialty": "Literary pubs"}]"#,
        )));

        let guides = generator.generate_local_guides("Dublin, Ireland").await;

        assert_eq!(guides.len(), 1);
        assert_eq!(guides[0].name, "Niamh");
    }
}
