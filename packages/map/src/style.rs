//! Choropleth styling for police areas.
//!
//! Styles serialize to Leaflet path options (`color`, `weight`,
//! `fillColor`, `fillOpacity`) so a front-end can apply them verbatim.

use crime_advice_crime_models::CrimeRate;
use crime_advice_crime_rates::CrimeRateTable;
use serde::{Deserialize, Serialize};

/// Five colour buckets, red (worst) to green.
///
/// Each bucket's lower bound is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateBucket {
    /// `rate >= 150`
    Severe,
    /// `100 <= rate < 150`
    High,
    /// `75 <= rate < 100`
    Elevated,
    /// `50 <= rate < 75`
    Moderate,
    /// `rate < 50`, or no rate at all
    Low,
}

impl RateBucket {
    /// Buckets a rate.
    #[must_use]
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 150.0 {
            Self::Severe
        } else if rate >= 100.0 {
            Self::High
        } else if rate >= 75.0 {
            Self::Elevated
        } else if rate >= 50.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Buckets a looked-up rate. Unknown rates fall through every
    /// comparison and land in [`RateBucket::Low`].
    #[must_use]
    pub fn for_crime_rate(rate: CrimeRate) -> Self {
        rate.value().map_or(Self::Low, Self::for_rate)
    }

    /// Fill colour for the bucket.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Severe => "#ef4444",
            Self::High => "#f87171",
            Self::Elevated => "#fcd34d",
            Self::Moderate => "#86efac",
            Self::Low => "#4ade80",
        }
    }

    /// All buckets, worst first. Useful for rendering a legend.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Severe,
            Self::High,
            Self::Elevated,
            Self::Moderate,
            Self::Low,
        ]
    }
}

/// Leaflet path options for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStyle {
    /// Border colour.
    pub color: String,
    /// Border width in pixels.
    pub weight: u32,
    /// Fill colour; absent for the neutral style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Fill opacity, `0.0..=1.0`.
    pub fill_opacity: f64,
}

impl RegionStyle {
    /// Style for regions that cannot be coloured (no name, or rates not
    /// loaded yet).
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            color: "#e5e7eb".to_string(),
            weight: 1,
            fill_color: None,
            fill_opacity: 0.2,
        }
    }

    /// Style for a region coloured by its bucket.
    #[must_use]
    pub fn bucketed(bucket: RateBucket) -> Self {
        Self {
            color: "#d1d5db".to_string(),
            weight: 1,
            fill_color: Some(bucket.color().to_string()),
            fill_opacity: 0.7,
        }
    }

    /// Style applied while the pointer is over a region. Mouse-out
    /// restores the region's own style.
    #[must_use]
    pub fn hover() -> Self {
        Self {
            color: "#9ca3af".to_string(),
            weight: 2,
            fill_color: None,
            fill_opacity: 0.8,
        }
    }

    /// Merges `overlay` onto `self`, keeping fields `overlay` leaves unset.
    ///
    /// Mirrors Leaflet's `setStyle`, which only touches supplied options.
    #[must_use]
    pub fn with_overlay(&self, overlay: &Self) -> Self {
        Self {
            color: overlay.color.clone(),
            weight: overlay.weight,
            fill_color: overlay.fill_color.clone().or_else(|| self.fill_color.clone()),
            fill_opacity: overlay.fill_opacity,
        }
    }
}

/// Looks up a region's rate, if it has a name and rates are loaded.
#[must_use]
pub fn region_rate(name: Option<&str>, rates: Option<&CrimeRateTable>) -> Option<CrimeRate> {
    let (name, rates) = (name?, rates?);
    Some(rates.lookup(name).rate)
}

/// Picks the style for a region.
#[must_use]
pub fn region_style(name: Option<&str>, rates: Option<&CrimeRateTable>) -> RegionStyle {
    region_rate(name, rates).map_or_else(RegionStyle::neutral, |rate| {
        RegionStyle::bucketed(RateBucket::for_crime_rate(rate))
    })
}

/// Popup HTML for a region: its name and rate.
///
/// The rate reads `N/A` while rates are not loaded and `unknown` when the
/// table has no entry for the region.
#[must_use]
pub fn popup_html(name: &str, rates: Option<&CrimeRateTable>) -> String {
    let rate = rates.map_or_else(
        || "N/A".to_string(),
        |rates| rates.lookup(name).rate.to_string(),
    );

    format!(
        "<div style=\"font-family: system-ui, sans-serif;\">\
         <strong style=\"font-size: 14px;\">{}</strong><br/>\
         <span style=\"color: #666;\">Crime Rate: {rate}</span>\
         </div>",
        escape_html(name)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> CrimeRateTable {
        [
            ("leicestershire-street".to_string(), 95.0),
            ("city-of-london-street".to_string(), 161.3),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn bucket_lower_edges_are_inclusive() {
        assert_eq!(RateBucket::for_rate(150.0), RateBucket::Severe);
        assert_eq!(RateBucket::for_rate(149.9), RateBucket::High);
        assert_eq!(RateBucket::for_rate(100.0), RateBucket::High);
        assert_eq!(RateBucket::for_rate(75.0), RateBucket::Elevated);
        assert_eq!(RateBucket::for_rate(74.9), RateBucket::Moderate);
        assert_eq!(RateBucket::for_rate(50.0), RateBucket::Moderate);
        assert_eq!(RateBucket::for_rate(49.0), RateBucket::Low);
        assert_eq!(RateBucket::for_rate(0.0), RateBucket::Low);
    }

    #[test]
    fn bucket_colors_run_red_to_green() {
        assert_eq!(RateBucket::for_rate(150.0).color(), "#ef4444");
        assert_eq!(RateBucket::for_rate(100.0).color(), "#f87171");
        assert_eq!(RateBucket::for_rate(50.0).color(), "#86efac");
        assert_eq!(RateBucket::for_rate(10.0).color(), "#4ade80");
    }

    #[test]
    fn unknown_rate_gets_lowest_bucket() {
        assert_eq!(
            RateBucket::for_crime_rate(CrimeRate::Unknown),
            RateBucket::Low
        );
    }

    #[test]
    fn region_style_branches() {
        let rates = rates();

        assert_eq!(region_style(None, Some(&rates)), RegionStyle::neutral());
        assert_eq!(
            region_style(Some("Leicestershire"), None),
            RegionStyle::neutral()
        );

        let styled = region_style(Some("Leicestershire"), Some(&rates));
        assert_eq!(styled.fill_color.as_deref(), Some("#fcd34d"));
        assert!((styled.fill_opacity - 0.7).abs() < f64::EPSILON);

        let missing = region_style(Some("Atlantis"), Some(&rates));
        assert_eq!(missing.fill_color.as_deref(), Some("#4ade80"));
    }

    #[test]
    fn hover_keeps_fill_color() {
        let base = RegionStyle::bucketed(RateBucket::Severe);
        let hovered = base.with_overlay(&RegionStyle::hover());
        assert_eq!(hovered.weight, 2);
        assert_eq!(hovered.color, "#9ca3af");
        assert_eq!(hovered.fill_color.as_deref(), Some("#ef4444"));
        assert!((hovered.fill_opacity - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn popup_shows_name_and_rate() {
        let rates = rates();
        let html = popup_html("Leicestershire", Some(&rates));
        assert!(html.contains("<strong style=\"font-size: 14px;\">Leicestershire</strong>"));
        assert!(html.contains("Crime Rate: 95"));

        assert!(popup_html("Leicestershire", None).contains("Crime Rate: N/A"));
        assert!(popup_html("Atlantis", Some(&rates)).contains("Crime Rate: unknown"));
        assert!(popup_html("A & B <x>", None).contains("A &amp; B &lt;x&gt;"));
    }

    #[test]
    fn style_serializes_as_leaflet_options() {
        let json = serde_json::to_value(RegionStyle::neutral()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "color": "#e5e7eb", "weight": 1, "fillOpacity": 0.2 })
        );
    }
}
