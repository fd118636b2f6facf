#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static crime rate table keyed by policing region.
//!
//! The table maps `"<region>-street"` keys to a rate in incidents per
//! 1,000 people. It is loaded once at process start (either the copy
//! embedded at compile time from `data/crime_rate.json`, or a file named
//! by `CRIME_RATES_PATH`) and is read-only afterwards, so it is shared
//! between requests behind an `Arc` without locking.

use std::collections::BTreeMap;
use std::path::Path;

use crime_advice_crime_models::{CrimeRate, region_key};
use serde::Serialize;
use thiserror::Error;

/// Environment variable naming an alternative table file.
pub const CRIME_RATES_PATH_ENV: &str = "CRIME_RATES_PATH";

const EMBEDDED_TABLE: &str = include_str!("../data/crime_rate.json");

/// Errors from loading a crime rate table.
#[derive(Debug, Error)]
pub enum CrimeRateError {
    /// Reading the table file failed.
    #[error("I/O error reading crime rate table: {0}")]
    Io(#[from] std::io::Error),

    /// The table is not a JSON object of numbers.
    #[error("JSON error in crime rate table: {0}")]
    Json(#[from] serde_json::Error),
}

/// The result of looking up a policing region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLookup {
    /// The derived table key (e.g. `"leicestershire-street"`).
    pub key: String,
    /// The rate found under that key.
    pub rate: CrimeRate,
}

/// Read-only mapping from region key to crime rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrimeRateTable {
    rates: BTreeMap<String, f64>,
}

impl CrimeRateTable {
    /// Builds a table from explicit entries.
    #[must_use]
    pub fn new(rates: BTreeMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Parses a table from a JSON object of `key -> number`.
    ///
    /// # Errors
    ///
    /// Returns [`CrimeRateError::Json`] if the document is not an object
    /// whose values are all numbers.
    pub fn from_json_str(json: &str) -> Result<Self, CrimeRateError> {
        let rates: BTreeMap<String, f64> = serde_json::from_str(json)?;
        Ok(Self { rates })
    }

    /// Loads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CrimeRateError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CrimeRateError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} crime rate entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Returns the table embedded at compile time.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is malformed (this is a compile-time
    /// guarantee since the file ships with the crate).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json_str(EMBEDDED_TABLE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded crime rate table: {e}"))
    }

    /// Loads the file named by `CRIME_RATES_PATH`, falling back to the
    /// embedded table when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`CrimeRateError`] if the variable is set but the file
    /// cannot be read or parsed.
    pub fn from_env() -> Result<Self, CrimeRateError> {
        match std::env::var(CRIME_RATES_PATH_ENV) {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                let table = Self::embedded();
                log::info!("Using embedded crime rate table ({} entries)", table.len());
                Ok(table)
            }
        }
    }

    /// Returns the raw rate stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.rates.get(key).copied()
    }

    /// Looks up a policing region by name, deriving its key first.
    ///
    /// Absent keys are not an error; they resolve to [`CrimeRate::Unknown`].
    #[must_use]
    pub fn lookup(&self, region: &str) -> RateLookup {
        let key = region_key(region);
        let rate = self.get(&key).map_or(CrimeRate::Unknown, CrimeRate::Known);
        RateLookup { key, rate }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterates over `(key, rate)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for CrimeRateTable {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
