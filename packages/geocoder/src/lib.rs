#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for free-text city names.
//!
//! Resolves a query such as `"Leicester"` to a latitude/longitude pair
//! using a Nominatim-compatible `/search` endpoint. Two services are
//! configured via TOML files in `services/`:
//!
//! 1. **maps.co** (priority 1): hosted Nominatim, API key from
//!    `GEOCODE_API_KEY`.
//! 2. **Nominatim / OpenStreetMap** (priority 2): public instance, no key.
//!
//! Exactly one service answers a query; there is no fallback chain and no
//! retry. The service is chosen with `GEOCODER_SERVICE` (see
//! [`service_registry::geocoder_from_env`]).

pub mod nominatim;
pub mod service_registry;

use crime_advice_geography_models::Coordinates;
use thiserror::Error;

/// A geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    /// Resolved point (first result of the search).
    pub coordinates: Coordinates,
    /// The provider's display name for the match, if any.
    pub display_name: Option<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Geocode API error: {status}")]
    Status {
        /// The HTTP status returned.
        status: reqwest::StatusCode,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The search returned an empty result set.
    #[error("No geocoding results for '{query}'")]
    NoResults {
        /// The query that matched nothing.
        query: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Resolves free-text place names to coordinates.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodes `query`, returning the first match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NoResults`] if nothing matches, or another
    /// [`GeocodeError`] if the request or response parsing fails.
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError>;
}
