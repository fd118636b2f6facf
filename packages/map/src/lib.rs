#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map view model: police area polygons coloured by crime rate, and a
//! view that recentres on the shared map focus.

pub mod areas;
pub mod focus;
pub mod style;

pub use areas::PoliceAreas;
pub use focus::{FOCUS_ZOOM, INITIAL_ZOOM, MapFocus, MapView, Viewport};
pub use style::{RateBucket, RegionStyle};

use thiserror::Error;

/// Errors from loading police area boundaries.
#[derive(Debug, Error)]
pub enum MapError {
    /// Reading the boundary file failed.
    #[error("I/O error reading police areas: {0}")]
    Io(#[from] std::io::Error),

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error in police areas: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document parsed but is not a `FeatureCollection`.
    #[error("Police areas must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}
