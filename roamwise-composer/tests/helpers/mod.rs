//! Shared test doubles and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use roamwise_common::{GeoBounds, GeoPoint};
use roamwise_composer::db::TripStore;
use roamwise_composer::models::{
    Category, Destination, ProviderRecord, TripAggregate, TripRequest, TripSummary,
};
use roamwise_composer::services::{
    ChatTurn, ContentGenerator, DualStrategyFetcher, GeneratorError, PlaceProvider, TextGenerator,
    TripComposer,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Single-connection in-memory database with the composer's tables
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    roamwise_composer::db::init_tables(&pool)
        .await
        .expect("Failed to initialize tables");
    pool
}

pub fn record(category: Category, id: &str, name: &str) -> ProviderRecord {
    ProviderRecord {
        category,
        external_id: id.to_string(),
        name: name.to_string(),
        address: String::new(),
        location: None,
        rating: Some(4.5),
        num_reviews: None,
        photo_url: None,
        details: BTreeMap::new(),
    }
}

pub fn dublin() -> Destination {
    Destination {
        label: "Dublin, Ireland".to_string(),
        point: GeoPoint::new(53.3498, -6.2603).unwrap(),
        bounds: Some(
            GeoBounds::new(
                GeoPoint::new(53.2987, -6.3871).unwrap(),
                GeoPoint::new(53.4108, -6.1145).unwrap(),
            )
            .unwrap(),
        ),
    }
}

pub fn dublin_request() -> TripRequest {
    TripRequest {
        owner_id: "user-42".to_string(),
        destination: dublin(),
        start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
        travelers: 2,
        budget: "medium".to_string(),
        interests: vec!["History".to_string(), "Food".to_string()],
        currency: "EUR".to_string(),
    }
}

/// Provider answering from fixed per-category lists
#[derive(Default)]
pub struct StubProvider {
    pub point: HashMap<Category, Vec<ProviderRecord>>,
    pub bounds: HashMap<Category, Vec<ProviderRecord>>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn with_point(mut self, category: Category, records: Vec<ProviderRecord>) -> Self {
        self.point.insert(category, records);
        self
    }

    pub fn with_bounds(mut self, category: Category, records: Vec<ProviderRecord>) -> Self {
        self.bounds.insert(category, records);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Dublin data: hotels and attractions by point, restaurants only by bounds
    pub fn dublin() -> Self {
        Self::default()
            .with_point(
                Category::Hotels,
                vec![
                    record(Category::Hotels, "h1", "The Shelbourne"),
                    record(Category::Hotels, "h2", "The Merrion"),
                ],
            )
            .with_bounds(
                Category::Hotels,
                vec![record(Category::Hotels, "h9", "Airport Lodge")],
            )
            .with_bounds(
                Category::Restaurants,
                vec![record(Category::Restaurants, "r1", "Chapter One")],
            )
            .with_point(
                Category::Attractions,
                vec![record(Category::Attractions, "a1", "Trinity College")],
            )
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceProvider for StubProvider {
    fn source_id(&self) -> &'static str {
        "Stub"
    }

    async fn fetch_by_point(
        &self,
        category: Category,
        _point: GeoPoint,
        _currency: &str,
    ) -> Vec<ProviderRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.point.get(&category).cloned().unwrap_or_default()
    }

    async fn fetch_by_bounds(
        &self,
        category: Category,
        _bounds: GeoBounds,
        _currency: &str,
    ) -> Vec<ProviderRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.bounds.get(&category).cloned().unwrap_or_default()
    }
}

/// Generator replying per request group; `None` replies fail
pub struct StubGenerator {
    pub facts_reply: Option<String>,
    pub guides_reply: Option<String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new(facts_reply: Option<&str>, guides_reply: Option<&str>) -> Self {
        Self {
            facts_reply: facts_reply.map(str::to_string),
            guides_reply: guides_reply.map(str::to_string),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn dublin() -> Self {
        Self::new(
            Some(
                "```json\n{\"overview\": \"Dublin mixes Georgian squares, literary pubs and a lively food scene.\", \
                 \"rating\": 4.6, \"languages\": [\"English\", \"Irish\"], \
                 \"currency\": {\"code\": \"EUR\", \"symbol\": \"€\", \"name\": \"Euro\", \"exchange_rate\": 1.0}}\n```",
            ),
            Some(r#"{"guides": [{"name": "Niamh Byrne", "specialty": "Literary walks"}]}"#),
        )
    }

    pub fn failing() -> Self {
        Self::new(None, None)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn backend_id(&self) -> &'static str {
        "Stub"
    }

    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        // The facts prompt carries the trip length, the guides prompt does not
        let is_facts = turns.last().map(|t| t.text.contains("Days:")).unwrap_or(false);
        let reply = if is_facts {
            &self.facts_reply
        } else {
            &self.guides_reply
        };

        reply
            .clone()
            .ok_or_else(|| GeneratorError::ApiError(503, "overloaded".to_string()))
    }
}

/// In-memory store recording writes, optionally failing every put
#[derive(Default)]
pub struct RecordingStore {
    pub trips: Mutex<Vec<TripAggregate>>,
    pub fail_puts: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            trips: Mutex::new(Vec::new()),
            fail_puts: true,
        }
    }

    pub fn len(&self) -> usize {
        self.trips.lock().unwrap().len()
    }
}

#[async_trait]
impl TripStore for RecordingStore {
    async fn put(
        &self,
        _owner_id: &str,
        _trip_id: Uuid,
        trip: &TripAggregate,
    ) -> roamwise_common::Result<()> {
        if self.fail_puts {
            return Err(roamwise_common::Error::Internal("disk full".to_string()));
        }
        self.trips.lock().unwrap().push(trip.clone());
        Ok(())
    }

    async fn get(
        &self,
        owner_id: &str,
        trip_id: Uuid,
    ) -> roamwise_common::Result<Option<TripAggregate>> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.owner_id == owner_id && t.trip_id == trip_id)
            .cloned())
    }

    async fn delete(&self, owner_id: &str, trip_id: Uuid) -> roamwise_common::Result<bool> {
        let mut trips = self.trips.lock().unwrap();
        let before = trips.len();
        trips.retain(|t| !(t.owner_id == owner_id && t.trip_id == trip_id));
        Ok(trips.len() < before)
    }

    async fn list(&self, owner_id: &str) -> roamwise_common::Result<Vec<TripSummary>> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .map(TripSummary::from)
            .collect())
    }
}

pub fn composer(
    provider: Arc<StubProvider>,
    generator: Arc<StubGenerator>,
    store: Arc<dyn TripStore>,
) -> TripComposer {
    TripComposer::new(
        DualStrategyFetcher::new(provider),
        ContentGenerator::new(generator),
        store,
    )
}
