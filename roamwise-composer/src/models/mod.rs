//! Data models for roamwise-composer
//!
//! - Provider categories, projected records and fetch outcomes
//! - Generated content bundle
//! - Trip request, aggregate and composition state machine

pub mod content;
pub mod place;
pub mod trip;

pub use content::{
    Alert, CurrencyFacts, GeneratedContent, Guide, GuideListing, ItineraryFacts, Review,
    TransportOption,
};
pub use place::{Category, FetchOutcome, ProviderRecord};
pub use trip::{
    BudgetTier, CompositionState, Destination, FailureReason, TripAggregate, TripRequest,
    TripSummary, ValidatedTripRequest,
};
