//! HTTP API handlers for roamwise-composer

pub mod health;
pub mod settings;
pub mod trips;

pub use health::health_routes;
pub use settings::settings_routes;
pub use trips::trip_routes;
