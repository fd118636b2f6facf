#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime statistic and severity tier types.
//!
//! This crate defines the vocabulary shared by the advice pipeline and
//! the map view: how a policing region name becomes a crime-rate table
//! key, what a looked-up rate looks like when the table has no entry, and
//! how a rate is bucketed into a [`SeverityTier`] that drives the tone of
//! the generated advice.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Suffix appended to every policing region key in the crime-rate table.
pub const REGION_KEY_SUFFIX: &str = "-street";

/// Rates strictly above this are [`SeverityTier::High`].
pub const HIGH_THRESHOLD: f64 = 110.0;

/// Rates strictly above this (and not high) are [`SeverityTier::Moderate`].
pub const MODERATE_THRESHOLD: f64 = 80.0;

/// Derives the crime-rate table key for a policing region.
///
/// Lowercases the name, collapses every run of whitespace into a single
/// hyphen and appends [`REGION_KEY_SUFFIX`]:
/// `"West Midlands"` becomes `"west-midlands-street"`.
#[must_use]
pub fn region_key(region: &str) -> String {
    let mut key = String::with_capacity(region.len() + REGION_KEY_SUFFIX.len());
    let mut in_whitespace = false;

    for c in region.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                key.push('-');
            }
            in_whitespace = true;
        } else {
            key.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    key.push_str(REGION_KEY_SUFFIX);
    key
}

/// A crime rate (incidents per 1,000 people) as resolved from the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CrimeRate {
    /// The table has an entry for the region.
    Known(f64),
    /// The table has no entry for the region.
    Unknown,
}

impl CrimeRate {
    /// Display sentinel used when the table has no entry.
    pub const UNKNOWN_SENTINEL: &'static str = "unknown";

    /// Returns the numeric rate, if known.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Known(rate) => Some(rate),
            Self::Unknown => None,
        }
    }

    /// Returns `true` if the table had no entry.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// How the rate is phrased inside the advice prompt.
    ///
    /// Unknown rates read as `"an unknown rate"` so the sentence
    /// "The annual crime rate in X is an unknown rate ..." stays readable.
    #[must_use]
    pub fn prompt_phrase(self) -> String {
        match self {
            Self::Known(rate) => rate.to_string(),
            Self::Unknown => format!("an {} rate", Self::UNKNOWN_SENTINEL),
        }
    }

    /// The number fed into [`SeverityTier::from_rate`].
    #[must_use]
    pub fn classification_value(self, policy: UnknownRatePolicy) -> f64 {
        match self {
            Self::Known(rate) => rate,
            Self::Unknown => policy.substitute(),
        }
    }

    /// Classifies this rate, applying `policy` when it is unknown.
    #[must_use]
    pub fn tier(self, policy: UnknownRatePolicy) -> SeverityTier {
        SeverityTier::from_rate(self.classification_value(policy))
    }
}

impl std::fmt::Display for CrimeRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(rate) => write!(f, "{rate}"),
            Self::Unknown => f.write_str(Self::UNKNOWN_SENTINEL),
        }
    }
}

/// What number an unknown rate is classified as.
///
/// [`UnknownRatePolicy::Zero`] reproduces the historical behaviour where
/// a missing table entry was coerced to `0` and therefore always read as
/// a low-crime area.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnknownRatePolicy {
    /// Classify as `0` (always [`SeverityTier::Low`]).
    #[default]
    Zero,
    /// Classify as just above the moderate threshold.
    Moderate,
}

impl UnknownRatePolicy {
    /// The rate substituted for an unknown entry.
    #[must_use]
    pub const fn substitute(self) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::Moderate => MODERATE_THRESHOLD + 1.0,
        }
    }
}

/// Severity tier derived from a crime rate.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    /// Rate at or below 80.
    Low,
    /// Rate above 80, at or below 110.
    Moderate,
    /// Rate above 110.
    High,
}

impl SeverityTier {
    /// Classifies a crime rate. Both thresholds are exclusive.
    #[must_use]
    pub fn from_rate(rate: f64) -> Self {
        if rate > HIGH_THRESHOLD {
            Self::High
        } else if rate > MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// System instruction that sets the tone and depth of the advice.
    #[must_use]
    pub const fn system_prompt(self) -> &'static str {
        match self {
            Self::High => {
                "The crime rate in this area is significantly high. Emphasize stringent \
                 security measures and an urgent tone, and go into detail."
            }
            Self::Moderate => {
                "The crime rate in this area is moderate. Suggest strong security measures \
                 with a serious tone."
            }
            Self::Low => {
                "The crime rate in this area is relatively low. Suggest basic security \
                 precautions in a reassuring tone."
            }
        }
    }

    /// Returns all variants, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Moderate, Self::High]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds_are_exclusive() {
        assert_eq!(SeverityTier::from_rate(110.5), SeverityTier::High);
        assert_eq!(SeverityTier::from_rate(110.0), SeverityTier::Moderate);
        assert_eq!(SeverityTier::from_rate(95.0), SeverityTier::Moderate);
        assert_eq!(SeverityTier::from_rate(80.0), SeverityTier::Low);
        assert_eq!(SeverityTier::from_rate(0.0), SeverityTier::Low);
    }

    #[test]
    fn region_key_normalizes_case_and_whitespace() {
        assert_eq!(region_key("West Midlands"), "west-midlands-street");
        assert_eq!(region_key("leicestershire"), "leicestershire-street");
        assert_eq!(
            region_key("Avon and  Somerset"),
            "avon-and-somerset-street"
        );
        assert_eq!(region_key("city-of-london"), "city-of-london-street");
    }

    #[test]
    fn unknown_rate_defaults_to_low() {
        let rate = CrimeRate::Unknown;
        assert_eq!(rate.to_string(), "unknown");
        assert!(rate.classification_value(UnknownRatePolicy::default()).abs() < f64::EPSILON);
        assert_eq!(rate.tier(UnknownRatePolicy::Zero), SeverityTier::Low);
        assert_eq!(rate.tier(UnknownRatePolicy::Moderate), SeverityTier::Moderate);
    }

    #[test]
    fn prompt_phrase_renders_numbers_plainly() {
        assert_eq!(CrimeRate::Known(95.0).prompt_phrase(), "95");
        assert_eq!(CrimeRate::Known(72.5).prompt_phrase(), "72.5");
        assert_eq!(CrimeRate::Unknown.prompt_phrase(), "an unknown rate");
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(
            "ZERO".parse::<UnknownRatePolicy>().unwrap(),
            UnknownRatePolicy::Zero
        );
        assert_eq!(
            "moderate".parse::<UnknownRatePolicy>().unwrap(),
            UnknownRatePolicy::Moderate
        );
        assert!("high".parse::<UnknownRatePolicy>().is_err());
    }

    #[test]
    fn each_tier_has_distinct_prompt() {
        let prompts: Vec<&str> = SeverityTier::all()
            .iter()
            .map(|t| t.system_prompt())
            .collect();
        assert!(prompts[0].contains("reassuring"));
        assert!(prompts[1].contains("serious"));
        assert!(prompts[2].contains("urgent"));
    }
}
