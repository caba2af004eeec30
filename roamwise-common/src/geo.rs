//! Geographic value types

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Construct a point, rejecting non-finite or out-of-range coordinates
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check the coordinate invariant on an already-built point
    ///
    /// Points arrive through serde, which bypasses [`GeoPoint::new`].
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(Error::InvalidInput(format!(
                "Coordinates must be finite: ({}, {})",
                self.lat, self.lng
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidInput(format!(
                "Latitude out of range [-90, 90]: {}",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidInput(format!(
                "Longitude out of range [-180, 180]: {}",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Axis-aligned bounding box
///
/// Longitude wraparound across the antimeridian is not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub southwest: GeoPoint,
    pub northeast: GeoPoint,
}

impl GeoBounds {
    pub fn new(southwest: GeoPoint, northeast: GeoPoint) -> Result<Self> {
        let bounds = Self {
            southwest,
            northeast,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Both corners valid and `southwest.lat <= northeast.lat`
    pub fn validate(&self) -> Result<()> {
        self.southwest.validate()?;
        self.northeast.validate()?;
        if self.southwest.lat > self.northeast.lat {
            return Err(Error::InvalidInput(format!(
                "Bounds southwest latitude {} exceeds northeast latitude {}",
                self.southwest.lat, self.northeast.lat
            )));
        }
        Ok(())
    }
}
