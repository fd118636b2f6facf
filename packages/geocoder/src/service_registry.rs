//! Compile-time registry of geocoding service configurations.
//!
//! Each geocoding provider is defined in a TOML file under `services/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_services`] and [`enabled_services`].

use serde::Deserialize;

use crate::GeocodeError;
use crate::nominatim::NominatimGeocoder;

/// Environment variable selecting a service by ID.
pub const GEOCODER_SERVICE_ENV: &str = "GEOCODER_SERVICE";

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"maps_co"`, `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be selected.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Selection order when no service is named; lower wins.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Nominatim-compatible `/search` endpoint.
    Nominatim {
        /// Full search URL (e.g., `"https://geocode.maps.co/search"`).
        base_url: String,
        /// Environment variable holding the API key, if the service
        /// needs one.
        #[serde(default)]
        api_key_env: Option<String>,
    },
}

const fn default_true() -> bool {
    true
}

impl GeocodingService {
    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Nominatim { base_url, .. } => base_url,
        }
    }

    /// Builds a geocoder for this service, reading its API key (if any)
    /// from the environment.
    ///
    /// A missing key is logged and the request is sent without one; the
    /// service decides whether that is acceptable.
    #[must_use]
    pub fn build(&self, client: reqwest::Client) -> NominatimGeocoder {
        match &self.provider {
            ProviderConfig::Nominatim {
                base_url,
                api_key_env,
            } => {
                let api_key = api_key_env.as_ref().and_then(|var| {
                    let key = std::env::var(var).ok().filter(|k| !k.is_empty());
                    if key.is_none() {
                        log::warn!("{var} not set; geocoding via {} without an API key", self.name);
                    }
                    key
                });
                NominatimGeocoder::new(client, base_url.clone(), api_key)
            }
        }
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("maps_co", include_str!("../services/maps_co.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 2;

/// Returns all geocoding service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse geocoding service '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> =
        all_services().into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Picks the enabled service with `id`, or the highest-priority enabled
/// service when `id` is `None`.
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if no enabled service matches.
pub fn select_service(id: Option<&str>) -> Result<GeocodingService, GeocodeError> {
    let services = enabled_services();
    let selected = match id {
        Some(id) => services.into_iter().find(|s| s.id.eq_ignore_ascii_case(id)),
        None => services.into_iter().next(),
    };

    selected.ok_or_else(|| GeocodeError::Config {
        message: format!(
            "Unknown or disabled geocoding service: {}",
            id.unwrap_or("<default>")
        ),
    })
}

/// Builds the geocoder named by `GEOCODER_SERVICE` (default: highest
/// priority enabled service).
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if the named service does not exist
/// or is disabled.
pub fn geocoder_from_env(client: reqwest::Client) -> Result<NominatimGeocoder, GeocodeError> {
    let requested = std::env::var(GEOCODER_SERVICE_ENV).ok();
    let service = select_service(requested.as_deref())?;
    log::info!("Geocoding via {} ({})", service.name, service.base_url());
    Ok(service.build(client))
}
