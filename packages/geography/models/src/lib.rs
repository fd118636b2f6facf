#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic coordinate types.
//!
//! [`Coordinates`] travels from the geocoder through the advice response
//! to the map focus. On the wire it is a `[latitude, longitude]` pair,
//! which is the order map front-ends expect for a view centre.

use serde::{Deserialize, Serialize};

/// A WGS84 point, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Leicester city centre, where the map starts before any advice has
    /// been requested.
    pub const DEFAULT_FOCUS: Self = Self::new(52.633_331, -1.133_333);

    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `(longitude, latitude)`, the axis order used by `GeoJSON`.
    #[must_use]
    pub const fn lon_lat(self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::DEFAULT_FOCUS
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(c: Coordinates) -> Self {
        (c.latitude, c.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
