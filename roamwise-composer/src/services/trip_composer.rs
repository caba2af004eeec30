//! Trip composition pipeline
//!
//! Validates a request, fans out the three category fetches and the two
//! content groups concurrently, merges everything into one [`TripAggregate`]
//! and writes it once. Cancellation or the deadline before PERSISTING drops
//! all in-flight work and nothing is written.

use chrono::{DateTime, Utc};
use roamwise_common::DateRange;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::content_generator::ContentGenerator;
use super::dual_fetcher::DualStrategyFetcher;
use crate::db::TripStore;
use crate::models::{
    BudgetTier, Category, CompositionState, FailureReason, FetchOutcome, GeneratedContent, Guide,
    ItineraryFacts, TripAggregate, TripRequest, ValidatedTripRequest,
};

/// Failures visible to the caller of [`TripComposer::create_trip`]
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persist error: {0}")]
    PersistError(String),

    #[error("Trip creation cancelled")]
    Cancelled,
}

impl CompositionError {
    pub fn reason(&self) -> FailureReason {
        match self {
            CompositionError::InvalidInput(_) => FailureReason::InvalidInput,
            CompositionError::PersistError(_) => FailureReason::PersistError,
            CompositionError::Cancelled => FailureReason::Cancelled,
        }
    }
}

impl From<roamwise_common::Error> for CompositionError {
    fn from(err: roamwise_common::Error) -> Self {
        match err {
            roamwise_common::Error::InvalidInput(msg) => CompositionError::InvalidInput(msg),
            other => CompositionError::InvalidInput(other.to_string()),
        }
    }
}

/// Everything the FETCHING state gathers
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResults {
    pub hotels: FetchOutcome,
    pub restaurants: FetchOutcome,
    pub attractions: FetchOutcome,
    pub facts: Option<ItineraryFacts>,
    pub guides: Vec<Guide>,
}

/// Tracks and logs one composition's state
struct Progress {
    trip_id: Uuid,
    state: CompositionState,
}

impl Progress {
    fn new(trip_id: Uuid) -> Self {
        debug!(trip_id = %trip_id, state = ?CompositionState::Validating, "Composition started");
        Self {
            trip_id,
            state: CompositionState::Validating,
        }
    }

    fn advance(&mut self, next: CompositionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(trip_id = %self.trip_id, from = ?self.state, to = ?next, "Composition state change");
        self.state = next;
    }

    fn fail(&mut self, error: CompositionError) -> CompositionError {
        self.advance(CompositionState::Failed(error.reason()));
        warn!(
            trip_id = %self.trip_id,
            reason = ?error.reason(),
            error = %error,
            "Trip composition failed"
        );
        error
    }
}

/// Orchestrates fetcher, generator and store for one trip at a time
pub struct TripComposer {
    fetcher: DualStrategyFetcher,
    generator: ContentGenerator,
    store: Arc<dyn TripStore>,
}

impl TripComposer {
    pub fn new(
        fetcher: DualStrategyFetcher,
        generator: ContentGenerator,
        store: Arc<dyn TripStore>,
    ) -> Self {
        Self {
            fetcher,
            generator,
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn TripStore> {
        &self.store
    }

    /// Run the whole pipeline, returning the new trip id
    pub async fn create_trip(
        &self,
        request: TripRequest,
        cancel: CancellationToken,
        deadline: Duration,
    ) -> Result<Uuid, CompositionError> {
        // An unrepresentable deadline never fires
        let expires_at = tokio::time::Instant::now().checked_add(deadline);
        let trip_id = Uuid::new_v4();
        let mut progress = Progress::new(trip_id);

        let validated = match validate(&request) {
            Ok(validated) => validated,
            Err(e) => return Err(progress.fail(e)),
        };

        progress.advance(CompositionState::Fetching);
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(progress.fail(CompositionError::Cancelled)),
            _ = deadline_elapsed(expires_at) => {
                debug!(
                    trip_id = %trip_id,
                    deadline_ms = deadline.as_millis() as u64,
                    "Deadline elapsed"
                );
                return Err(progress.fail(CompositionError::Cancelled));
            }
            results = self.fetch_all(&validated) => results,
        };

        progress.advance(CompositionState::Merging);
        let aggregate = merge(&validated, trip_id, Utc::now(), results);

        let expired = expires_at.is_some_and(|at| tokio::time::Instant::now() >= at);
        if cancel.is_cancelled() || expired {
            return Err(progress.fail(CompositionError::Cancelled));
        }

        progress.advance(CompositionState::Persisting);
        if let Err(e) = self
            .store
            .put(&validated.owner_id, trip_id, &aggregate)
            .await
        {
            return Err(progress.fail(CompositionError::PersistError(e.to_string())));
        }

        progress.advance(CompositionState::Done);
        info!(
            trip_id = %trip_id,
            owner_id = %validated.owner_id,
            destination = %validated.destination.label,
            hotels = aggregate.hotels.len(),
            restaurants = aggregate.restaurants.len(),
            attractions = aggregate.attractions.len(),
            "Trip created"
        );

        Ok(trip_id)
    }

    /// The five concurrent calls of the FETCHING state
    pub async fn fetch_all(&self, request: &ValidatedTripRequest) -> FetchResults {
        let destination = &request.destination;
        let currency = request.currency.as_str();

        let (hotels, restaurants, attractions, facts, guides) = tokio::join!(
            self.fetcher.fetch(Category::Hotels, destination, currency),
            self.fetcher.fetch(Category::Restaurants, destination, currency),
            self.fetcher.fetch(Category::Attractions, destination, currency),
            self.generator.generate_itinerary_facts(
                &destination.label,
                request.dates.days(),
                request.travelers,
                request.budget,
                &request.interests,
            ),
            self.generator.generate_local_guides(&destination.label),
        );

        FetchResults {
            hotels,
            restaurants,
            attractions,
            facts,
            guides,
        }
    }
}

async fn deadline_elapsed(expires_at: Option<tokio::time::Instant>) {
    match expires_at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// VALIDATING: reject bad input before any network call
pub fn validate(request: &TripRequest) -> Result<ValidatedTripRequest, CompositionError> {
    if request.owner_id.trim().is_empty() {
        return Err(CompositionError::InvalidInput("Owner id is blank".to_string()));
    }

    let destination = &request.destination;
    if destination.label.trim().is_empty() {
        return Err(CompositionError::InvalidInput(
            "Destination label is blank".to_string(),
        ));
    }
    destination.point.validate()?;
    if let Some(bounds) = &destination.bounds {
        bounds.validate()?;
    }

    if request.travelers < 1 {
        return Err(CompositionError::InvalidInput(
            "At least one traveler is required".to_string(),
        ));
    }

    let dates = DateRange::new(request.start_date, request.end_date)?;

    let budget: BudgetTier = request
        .budget
        .parse()
        .map_err(CompositionError::InvalidInput)?;

    let currency = request.currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CompositionError::InvalidInput(format!(
            "Currency must be a three-letter code, got {:?}",
            request.currency
        )));
    }

    let interests = request
        .interests
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();

    Ok(ValidatedTripRequest {
        owner_id: request.owner_id.trim().to_string(),
        destination: destination.clone(),
        dates,
        travelers: request.travelers,
        budget,
        interests,
        currency,
    })
}

/// MERGING: flatten outcomes into the aggregate
///
/// Pure: the same inputs always produce the same aggregate.
pub fn merge(
    request: &ValidatedTripRequest,
    trip_id: Uuid,
    created_at: DateTime<Utc>,
    results: FetchResults,
) -> TripAggregate {
    TripAggregate {
        trip_id,
        owner_id: request.owner_id.clone(),
        destination: request.destination.clone(),
        dates: request.dates.into(),
        travelers: request.travelers,
        budget: request.budget,
        interests: request.interests.clone(),
        currency: request.currency.clone(),
        hotels: results.hotels.into_records(),
        restaurants: results.restaurants.into_records(),
        attractions: results.attractions.into_records(),
        content: GeneratedContent::from_groups(results.facts, results.guides),
        created_at,
    }
}
