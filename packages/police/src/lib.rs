#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Policing region lookup.
//!
//! Resolves a point to the police force responsible for it using the
//! `locate-neighbourhood` endpoint of the UK police data API. The force
//! identifier (e.g. `"leicestershire"`) is the join key into the crime
//! rate table.
//!
//! See <https://data.police.uk/docs/method/neighbourhood-locate/>

use crime_advice_geography_models::Coordinates;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public UK police data API.
pub const DEFAULT_BASE_URL: &str = "https://data.police.uk/api";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "POLICE_API_BASE_URL";

/// Errors from the region lookup.
#[derive(Debug, Error)]
pub enum PoliceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Police API error: {status}")]
    Status {
        /// The HTTP status returned.
        status: reqwest::StatusCode,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// The force and neighbourhood covering a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicingRegion {
    /// Force identifier (e.g. `"leicestershire"`).
    pub force: String,
    /// Neighbourhood code within the force, when reported.
    #[serde(default)]
    pub neighbourhood: Option<String>,
}

/// Resolves coordinates to a policing region.
#[async_trait::async_trait]
pub trait RegionLocator: Send + Sync {
    /// Finds the region containing `coordinates`.
    ///
    /// # Errors
    ///
    /// Returns [`PoliceError`] if the lookup fails.
    async fn locate(&self, coordinates: Coordinates) -> Result<PolicingRegion, PoliceError>;
}

/// Client for the UK police data API.
pub struct PoliceApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PoliceApiClient {
    /// Creates a client against `base_url` (without trailing slash).
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client using `POLICE_API_BASE_URL` or the public API.
    #[must_use]
    pub fn from_env(client: reqwest::Client) -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(client, base_url)
    }

    /// The configured API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl RegionLocator for PoliceApiClient {
    async fn locate(&self, coordinates: Coordinates) -> Result<PolicingRegion, PoliceError> {
        let url = format!("{}/locate-neighbourhood", self.base_url);
        let q = coordinates.to_string();

        log::debug!("Locating police force for {q}");

        let resp = self.client.get(&url).query(&[("q", q.as_str())]).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PoliceError::Status { status });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Extracts the region from a `locate-neighbourhood` response.
fn parse_response(body: &serde_json::Value) -> Result<PolicingRegion, PoliceError> {
    let force = body["force"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PoliceError::Parse {
            message: "Missing force in police API response".to_string(),
        })?
        .to_string();

    let neighbourhood = body["neighbourhood"].as_str().map(String::from);

    Ok(PolicingRegion {
        force,
        neighbourhood,
    })
}
