//! # Roamwise Common Library
//!
//! Shared code for the Roamwise services including:
//! - Error and result types
//! - Bootstrap configuration loading and root folder resolution
//! - Geographic value types (points, bounding boxes)
//! - Trip date-range arithmetic

pub mod config;
pub mod dates;
pub mod error;
pub mod geo;

pub use dates::DateRange;
pub use error::{Error, Result};
pub use geo::{GeoBounds, GeoPoint};
