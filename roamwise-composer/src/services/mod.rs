//! Services for roamwise-composer
//!
//! Leaf clients first (provider, generative backend), then the dual-strategy
//! fetcher, the content generator and the trip composer on top.

pub mod content_generator;
pub mod dual_fetcher;
pub mod gemini_client;
pub mod projection;
pub mod provider_client;
pub mod trip_composer;

pub use content_generator::ContentGenerator;
pub use dual_fetcher::DualStrategyFetcher;
pub use gemini_client::{ChatRole, ChatTurn, GeminiClient, GeneratorError, TextGenerator};
pub use provider_client::{PlaceProvider, ProviderError, TravelAdvisorClient};
pub use trip_composer::{CompositionError, FetchResults, TripComposer};
