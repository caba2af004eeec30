//! Trip requests, the persisted trip aggregate, and the composition state machine
//!
//! Composition progresses through:
//! VALIDATING → FETCHING → MERGING → PERSISTING → DONE
//! with FAILED reachable from VALIDATING, PERSISTING, and from FETCHING or
//! MERGING on cancellation.

use chrono::{DateTime, NaiveDate, Utc};
use roamwise_common::dates::TripDates;
use roamwise_common::{DateRange, GeoBounds, GeoPoint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::content::GeneratedContent;
use super::place::ProviderRecord;

/// Spending level the trip is planned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
    Luxury,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Medium => "medium",
            BudgetTier::High => "high",
            BudgetTier::Luxury => "luxury",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "budget" => Ok(BudgetTier::Low),
            "medium" | "moderate" => Ok(BudgetTier::Medium),
            "high" => Ok(BudgetTier::High),
            "luxury" => Ok(BudgetTier::Luxury),
            other => Err(format!("Unknown budget tier: {}", other)),
        }
    }
}

/// Where the trip goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Human label, e.g. "Dublin, Ireland"
    pub label: String,
    pub point: GeoPoint,
    /// Viewport of the destination; without it the bounds strategy is skipped
    #[serde(default)]
    pub bounds: Option<GeoBounds>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Trip-creation request as received from the caller
///
/// Fields are unchecked; see [`ValidatedTripRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub owner_id: String,
    pub destination: Destination,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
    pub budget: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Request after the VALIDATING state
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTripRequest {
    pub owner_id: String,
    pub destination: Destination,
    pub dates: DateRange,
    pub travelers: u32,
    pub budget: BudgetTier,
    pub interests: Vec<String>,
    pub currency: String,
}

/// The persisted trip
///
/// Created once; later changes replace whole fields or delete the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripAggregate {
    pub trip_id: Uuid,
    pub owner_id: String,
    pub destination: Destination,
    pub dates: TripDates,
    pub travelers: u32,
    pub budget: BudgetTier,
    pub interests: Vec<String>,
    pub currency: String,
    pub hotels: Vec<ProviderRecord>,
    pub restaurants: Vec<ProviderRecord>,
    pub attractions: Vec<ProviderRecord>,
    #[serde(flatten)]
    pub content: GeneratedContent,
    pub created_at: DateTime<Utc>,
}

/// Listing entry for an owner's trips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub trip_id: Uuid,
    pub destination: String,
    pub dates: TripDates,
    pub travelers: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&TripAggregate> for TripSummary {
    fn from(trip: &TripAggregate) -> Self {
        Self {
            trip_id: trip.trip_id,
            destination: trip.destination.label.clone(),
            dates: trip.dates,
            travelers: trip.travelers,
            created_at: trip.created_at,
        }
    }
}

/// Why a composition ended in FAILED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    InvalidInput,
    PersistError,
    Cancelled,
}

/// Trip composition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompositionState {
    /// Destination, dates and travelers checked; no network yet
    Validating,
    /// Provider and generator calls in flight
    Fetching,
    /// Outcomes flattened into the aggregate
    Merging,
    /// Single write to the trip store
    Persisting,
    /// Trip id handed to the caller
    Done,
    /// Absorbing failure state
    Failed(FailureReason),
}

impl CompositionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CompositionState::Done | CompositionState::Failed(_))
    }

    /// Allowed transitions of the state machine
    pub fn can_transition_to(&self, next: CompositionState) -> bool {
        use CompositionState::*;
        match (self, next) {
            (Validating, Fetching) => true,
            (Validating, Failed(FailureReason::InvalidInput)) => true,
            (Fetching, Merging) => true,
            (Fetching, Failed(FailureReason::Cancelled)) => true,
            (Merging, Persisting) => true,
            (Merging, Failed(FailureReason::Cancelled)) => true,
            (Persisting, Done) => true,
            (Persisting, Failed(FailureReason::PersistError)) => true,
            _ => false,
        }
    }
}
