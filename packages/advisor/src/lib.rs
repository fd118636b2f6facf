#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Security advice orchestration.
//!
//! Turns a `(city, business)` pair into generated advice through a fixed
//! chain where each step needs the previous step's output:
//!
//! 1. geocode the city ([`Geocoder`]);
//! 2. resolve the police force covering that point ([`RegionLocator`]);
//! 3. look the force up in the static [`CrimeRateTable`];
//! 4. classify the rate into a [`SeverityTier`];
//! 5. build a tier-specific [`AdvicePrompt`];
//! 6. ask the [`LlmProvider`] for a completion.
//!
//! The steps never run concurrently and nothing is retried. The first
//! failure ends the request with a typed [`AdviceError`].

pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use crime_advice_ai::AiError;
use crime_advice_ai::providers::LlmProvider;
use crime_advice_crime_models::{CrimeRate, SeverityTier, UnknownRatePolicy};
use crime_advice_crime_rates::{CrimeRateError, CrimeRateTable};
use crime_advice_geocoder::{GeocodeError, Geocoder};
use crime_advice_geography_models::Coordinates;
use crime_advice_police::{PoliceApiClient, PoliceError, RegionLocator};
use serde::Serialize;
use thiserror::Error;

pub use prompt::AdvicePrompt;

/// Default timeout applied to every outbound request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// A failed external lookup (geocoding or police force).
#[derive(Debug, Error)]
pub enum LookupError {
    /// Geocoding the city failed.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// Resolving the police force failed.
    #[error(transparent)]
    Region(#[from] PoliceError),
}

/// Errors from a single advice request.
#[derive(Debug, Error)]
pub enum AdviceError {
    /// A required input was blank.
    #[error("Missing {field}")]
    InvalidInput {
        /// Which input was blank (`"city"` or `"business"`).
        field: &'static str,
    },

    /// Geocoding or force lookup failed.
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// The text-generation call failed.
    #[error("Model error: {0}")]
    Model(#[from] AiError),
}

impl From<GeocodeError> for AdviceError {
    fn from(e: GeocodeError) -> Self {
        Self::Lookup(LookupError::Geocode(e))
    }
}

impl From<PoliceError> for AdviceError {
    fn from(e: PoliceError) -> Self {
        Self::Lookup(LookupError::Region(e))
    }
}

/// Errors while assembling an [`Advisor`] from the environment.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The shared HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Geocoder configuration is invalid.
    #[error("Geocoder configuration error: {0}")]
    Geocoder(#[from] GeocodeError),

    /// No usable LLM provider.
    #[error("AI provider error: {0}")]
    Ai(#[from] AiError),

    /// The crime rate table could not be loaded.
    #[error("Crime rate table error: {0}")]
    CrimeRates(#[from] CrimeRateError),

    /// An environment variable has an invalid value.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// The outcome of one advice request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// Generated advice text.
    pub text: String,
    /// Where the city geocoded to.
    pub coordinates: Coordinates,
    /// Police force identifier used as the table key.
    pub force: String,
    /// Rate found for the force.
    pub rate: CrimeRate,
    /// Tier the rate was classified into.
    pub tier: SeverityTier,
}

/// Tunables read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// How an unknown rate is classified.
    pub unknown_rate_policy: UnknownRatePolicy,
    /// Timeout applied to every outbound request.
    pub http_timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            unknown_rate_policy: UnknownRatePolicy::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AdvisorConfig {
    /// Reads `UNKNOWN_RATE_POLICY` (`zero` | `moderate`) and
    /// `HTTP_TIMEOUT_SECS`, keeping defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] if a variable is set to an
    /// unparseable value.
    pub fn from_env() -> Result<Self, SetupError> {
        let mut config = Self::default();

        if let Ok(policy) = std::env::var("UNKNOWN_RATE_POLICY") {
            config.unknown_rate_policy = policy.parse().map_err(|_| SetupError::Config {
                message: format!(
                    "Invalid UNKNOWN_RATE_POLICY '{policy}'. Use 'zero' or 'moderate'."
                ),
            })?;
        }

        if let Ok(secs) = std::env::var("HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| SetupError::Config {
                message: format!("Invalid HTTP_TIMEOUT_SECS '{secs}'"),
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Builds the HTTP client shared by every outbound lookup.
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("crime-advice/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Runs the advice chain. Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct Advisor {
    geocoder: Arc<dyn Geocoder>,
    locator: Arc<dyn RegionLocator>,
    rates: Arc<CrimeRateTable>,
    llm: Arc<dyn LlmProvider>,
    unknown_rate_policy: UnknownRatePolicy,
}

impl Advisor {
    /// Creates an advisor from its collaborators.
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        locator: Arc<dyn RegionLocator>,
        rates: Arc<CrimeRateTable>,
        llm: Arc<dyn LlmProvider>,
        unknown_rate_policy: UnknownRatePolicy,
    ) -> Self {
        Self {
            geocoder,
            locator,
            rates,
            llm,
            unknown_rate_policy,
        }
    }

    /// Assembles an advisor from environment configuration: geocoding
    /// service, police API root, crime rate table, and LLM provider.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if any collaborator cannot be configured.
    pub async fn from_env() -> Result<Self, SetupError> {
        let config = AdvisorConfig::from_env()?;
        let client = http_client(config.http_timeout)?;

        let geocoder = crime_advice_geocoder::service_registry::geocoder_from_env(client.clone())?;
        let locator = PoliceApiClient::from_env(client.clone());
        let rates = CrimeRateTable::from_env()?;
        let llm = crime_advice_ai::providers::create_provider_from_env(client).await?;

        log::info!(
            "Advisor ready: model={}, police_api={}, rates={}, unknown_rate_policy={}",
            llm.name(),
            locator.base_url(),
            rates.len(),
            config.unknown_rate_policy,
        );

        Ok(Self::new(
            Arc::new(geocoder),
            Arc::new(locator),
            Arc::new(rates),
            Arc::from(llm),
            config.unknown_rate_policy,
        ))
    }

    /// The crime rate table this advisor reads from.
    #[must_use]
    pub fn rates(&self) -> &Arc<CrimeRateTable> {
        &self.rates
    }

    /// Produces security advice for a `business` in `city`.
    ///
    /// # Errors
    ///
    /// Returns [`AdviceError::InvalidInput`] for blank inputs,
    /// [`AdviceError::Lookup`] if geocoding or the force lookup fails, and
    /// [`AdviceError::Model`] if generation fails.
    pub async fn advise(&self, city: &str, business: &str) -> Result<Advice, AdviceError> {
        let city = city.trim();
        let business = business.trim();
        if city.is_empty() {
            return Err(AdviceError::InvalidInput { field: "city" });
        }
        if business.is_empty() {
            return Err(AdviceError::InvalidInput { field: "business" });
        }

        let place = self.geocoder.geocode(city).await.inspect_err(|e| {
            log::warn!("Geocoding '{city}' failed: {e}");
        })?;
        let coordinates = place.coordinates;
        log::debug!("'{city}' geocoded to {coordinates}");

        let region = self.locator.locate(coordinates).await.inspect_err(|e| {
            log::warn!("Force lookup at {coordinates} failed: {e}");
        })?;

        let lookup = self.rates.lookup(&region.force);
        if lookup.rate.is_unknown() {
            log::warn!(
                "No crime rate for '{}' (force '{}'); classifying as {}",
                lookup.key,
                region.force,
                self.unknown_rate_policy.substitute(),
            );
        }

        let tier = lookup.rate.tier(self.unknown_rate_policy);
        log::info!(
            "{city}: force={} rate={} tier={tier}",
            region.force,
            lookup.rate
        );

        let prompt = AdvicePrompt::build(city, business, lookup.rate, tier);
        let response = self
            .llm
            .chat(&prompt.system, &prompt.messages())
            .await
            .inspect_err(|e| log::error!("{} completion failed: {e}", self.llm.name()))?;

        Ok(Advice {
            text: response.text,
            coordinates,
            force: region.force,
            rate: lookup.rate,
            tier,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crime_advice_ai::providers::{LlmResponse, Message, StopReason};
    use crime_advice_geocoder::GeocodedPlace;
    use crime_advice_police::PolicingRegion;

    use super::*;

    struct FixedGeocoder {
        result: Option<Coordinates>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(|coordinates| GeocodedPlace {
                    coordinates,
                    display_name: None,
                })
                .ok_or_else(|| GeocodeError::NoResults {
                    query: query.to_string(),
                })
        }
    }

    struct FixedLocator {
        force: Option<&'static str>,
        seen: Mutex<Vec<Coordinates>>,
    }

    #[async_trait::async_trait]
    impl RegionLocator for FixedLocator {
        async fn locate(&self, coordinates: Coordinates) -> Result<PolicingRegion, PoliceError> {
            self.seen.lock().unwrap().push(coordinates);
            self.force
                .map(|force| PolicingRegion {
                    force: force.to_string(),
                    neighbourhood: None,
                })
                .ok_or_else(|| PoliceError::Parse {
                    message: "Missing force in police API response".to_string(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingLlm {
        fail: bool,
        prompts: Mutex<Vec<(String, Vec<Message>)>>,
    }

    #[async_trait::async_trait]
    impl LlmProvider for RecordingLlm {
        async fn chat(
            &self,
            system_prompt: &str,
            messages: &[Message],
        ) -> Result<LlmResponse, AiError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), messages.to_vec()));
            if self.fail {
                return Err(AiError::Provider {
                    message: "quota exceeded".to_string(),
                });
            }
            Ok(LlmResponse {
                text: "Crime rate: 95 per 1,000.\nInstall CCTV.".to_string(),
                stop_reason: StopReason::EndTurn,
            })
        }

        fn name(&self) -> String {
            "recording".to_string()
        }
    }

    struct Fixture {
        geocoder: Arc<FixedGeocoder>,
        locator: Arc<FixedLocator>,
        llm: Arc<RecordingLlm>,
        advisor: Advisor,
    }

    fn fixture(
        coordinates: Option<Coordinates>,
        force: Option<&'static str>,
        llm: RecordingLlm,
        policy: UnknownRatePolicy,
    ) -> Fixture {
        let geocoder = Arc::new(FixedGeocoder {
            result: coordinates,
            calls: AtomicUsize::new(0),
        });
        let locator = Arc::new(FixedLocator {
            force,
            seen: Mutex::new(Vec::new()),
        });
        let llm = Arc::new(llm);
        let rates: CrimeRateTable = [
            ("leicestershire-street".to_string(), 95.0),
            ("west-midlands-street".to_string(), 119.2),
        ]
        .into_iter()
        .collect();

        let advisor = Advisor::new(
            geocoder.clone(),
            locator.clone(),
            Arc::new(rates),
            llm.clone(),
            policy,
        );

        Fixture {
            geocoder,
            locator,
            llm,
            advisor,
        }
    }

    #[tokio::test]
    async fn leicester_bakery_is_moderate() {
        let f = fixture(
            Some(Coordinates::new(52.63, -1.13)),
            Some("leicestershire"),
            RecordingLlm::default(),
            UnknownRatePolicy::Zero,
        );

        let advice = f.advisor.advise("Leicester", "bakery").await.unwrap();

        assert_eq!(advice.coordinates, Coordinates::new(52.63, -1.13));
        assert_eq!(advice.tier, SeverityTier::Moderate);
        assert_eq!(advice.rate, CrimeRate::Known(95.0));
        assert_eq!(advice.force, "leicestershire");
        assert!(advice.text.starts_with("Crime rate: 95"));

        assert_eq!(
            *f.locator.seen.lock().unwrap(),
            vec![Coordinates::new(52.63, -1.13)]
        );

        let prompts = f.llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let (system, messages) = &prompts[0];
        assert_eq!(system, SeverityTier::Moderate.system_prompt());
        let user = &messages[0].content;
        assert!(user.contains("95"));
        assert!(user.contains("bakery"));
        assert!(user.contains("Leicester"));
    }

    #[tokio::test]
    async fn region_names_are_normalized_before_lookup() {
        let f = fixture(
            Some(Coordinates::new(52.48, -1.89)),
            Some("West Midlands"),
            RecordingLlm::default(),
            UnknownRatePolicy::Zero,
        );

        let advice = f.advisor.advise("Birmingham", "jeweller").await.unwrap();
        assert_eq!(advice.rate, CrimeRate::Known(119.2));
        assert_eq!(advice.tier, SeverityTier::High);
    }

    #[tokio::test]
    async fn unknown_force_classifies_as_low_by_default() {
        let f = fixture(
            Some(Coordinates::new(55.95, -3.19)),
            Some("police-scotland"),
            RecordingLlm::default(),
            UnknownRatePolicy::Zero,
        );

        let advice = f.advisor.advise("Edinburgh", "cafe").await.unwrap();
        assert_eq!(advice.rate, CrimeRate::Unknown);
        assert_eq!(advice.tier, SeverityTier::Low);

        let prompts = f.llm.prompts.lock().unwrap();
        assert!(prompts[0].1[0].content.contains("an unknown rate"));
    }

    #[tokio::test]
    async fn unknown_force_respects_moderate_policy() {
        let f = fixture(
            Some(Coordinates::new(55.95, -3.19)),
            Some("police-scotland"),
            RecordingLlm::default(),
            UnknownRatePolicy::Moderate,
        );

        let advice = f.advisor.advise("Edinburgh", "cafe").await.unwrap();
        assert_eq!(advice.tier, SeverityTier::Moderate);
    }

    #[tokio::test]
    async fn geocode_failure_stops_the_chain() {
        let f = fixture(
            None,
            Some("leicestershire"),
            RecordingLlm::default(),
            UnknownRatePolicy::Zero,
        );

        let err = f.advisor.advise("Nowhereville", "bakery").await.unwrap_err();
        assert!(matches!(
            err,
            AdviceError::Lookup(LookupError::Geocode(GeocodeError::NoResults { .. }))
        ));
        assert!(err.to_string().contains("Nowhereville"));
        assert!(f.locator.seen.lock().unwrap().is_empty());
        assert!(f.llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn force_failure_skips_generation() {
        let f = fixture(
            Some(Coordinates::new(48.85, 2.35)),
            None,
            RecordingLlm::default(),
            UnknownRatePolicy::Zero,
        );

        let err = f.advisor.advise("Paris", "bakery").await.unwrap_err();
        assert!(matches!(err, AdviceError::Lookup(LookupError::Region(_))));
        assert!(f.llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_failure_is_model_error() {
        let f = fixture(
            Some(Coordinates::new(52.63, -1.13)),
            Some("leicestershire"),
            RecordingLlm {
                fail: true,
                ..RecordingLlm::default()
            },
            UnknownRatePolicy::Zero,
        );

        let err = f.advisor.advise("Leicester", "bakery").await.unwrap_err();
        assert!(matches!(err, AdviceError::Model(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn blank_inputs_are_rejected_before_any_lookup() {
        let f = fixture(
            Some(Coordinates::new(52.63, -1.13)),
            Some("leicestershire"),
            RecordingLlm::default(),
            UnknownRatePolicy::Zero,
        );

        assert!(matches!(
            f.advisor.advise("  ", "bakery").await,
            Err(AdviceError::InvalidInput { field: "city" })
        ));
        assert!(matches!(
            f.advisor.advise("Leicester", "").await,
            Err(AdviceError::InvalidInput { field: "business" })
        ));
        assert_eq!(f.geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn default_config_preserves_zero_policy() {
        let config = AdvisorConfig::default();
        assert_eq!(config.unknown_rate_policy, UnknownRatePolicy::Zero);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }
}
