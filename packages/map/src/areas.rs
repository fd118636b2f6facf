//! Police force area boundaries.
//!
//! Loads a `GeoJSON` `FeatureCollection` of police force areas (one feature
//! per force, name in the `PFA20NM` property), indexes the polygons in an
//! R-tree, and produces a styled copy of the collection for the map view.

use std::path::Path;

use crime_advice_crime_rates::CrimeRateTable;
use crime_advice_geography_models::Coordinates;
use geo::{BoundingRect, Contains, MultiPolygon};
use geojson::{FeatureCollection, GeoJson};
use rstar::{AABB, RTree, RTreeObject};

use crate::MapError;
use crate::style::{RegionStyle, popup_html, region_rate, region_style};

/// Feature property holding the police force area name.
pub const REGION_NAME_PROPERTY: &str = "PFA20NM";

/// Environment variable naming the boundary file.
pub const POLICE_AREAS_PATH_ENV: &str = "POLICE_AREAS_PATH";

/// Default boundary file location.
pub const DEFAULT_POLICE_AREAS_PATH: &str = "data/police_areas.geojson";

/// A boundary polygon stored in the R-tree with its name.
struct AreaEntry {
    name: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for AreaEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Police force areas, loaded once and read-only afterwards.
pub struct PoliceAreas {
    collection: FeatureCollection,
    index: RTree<AreaEntry>,
}

impl PoliceAreas {
    /// Parses a `GeoJSON` `FeatureCollection`.
    ///
    /// Features without a name or with non-polygon geometry stay in the
    /// collection (they still render, with the neutral style) but are not
    /// indexed for point lookups.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the document is not valid `GeoJSON` or not a
    /// `FeatureCollection`.
    pub fn from_geojson_str(geojson: &str) -> Result<Self, MapError> {
        let GeoJson::FeatureCollection(collection) = geojson.parse::<GeoJson>()? else {
            return Err(MapError::NotFeatureCollection);
        };

        let mut entries = Vec::new();
        for feature in &collection.features {
            let Some(name) = feature_name(feature) else {
                continue;
            };
            let Some(polygon) = feature
                .geometry
                .clone()
                .and_then(|g| to_multipolygon(g.try_into().ok()?))
            else {
                log::warn!("Skipping police area '{name}': no polygon geometry");
                continue;
            };

            entries.push(AreaEntry {
                name: name.to_string(),
                envelope: compute_envelope(&polygon),
                polygon,
            });
        }

        log::info!(
            "Indexed {} of {} police area features",
            entries.len(),
            collection.features.len()
        );

        Ok(Self {
            collection,
            index: RTree::bulk_load(entries),
        })
    }

    /// Loads a boundary file.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let geojson = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&geojson)
    }

    /// Loads the file named by `POLICE_AREAS_PATH`, or the default path.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the file cannot be read or parsed.
    pub fn from_env() -> Result<Self, MapError> {
        let path = std::env::var(POLICE_AREAS_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_POLICE_AREAS_PATH.to_string());
        Self::load(Path::new(&path))
    }

    /// Number of features (indexed or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    /// Whether the collection has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    /// Names of all named features, in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collection.features.iter().filter_map(feature_name)
    }

    /// Finds the area containing `coordinates`.
    ///
    /// Force areas tile without overlap, so the first match wins.
    #[must_use]
    pub fn region_at(&self, coordinates: Coordinates) -> Option<&str> {
        let (lng, lat) = coordinates.lon_lat();
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.index
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| entry.name.as_str())
    }

    /// Returns the collection with `style`, `hoverStyle`, `crimeRate` and
    /// `popup` properties merged into every feature.
    ///
    /// Pass `None` for `rates` to get the style used before the rate
    /// table has loaded.
    #[must_use]
    pub fn styled_feature_collection(&self, rates: Option<&CrimeRateTable>) -> FeatureCollection {
        let mut collection = self.collection.clone();

        for feature in &mut collection.features {
            let name = feature_name(feature).map(str::to_string);
            let style = region_style(name.as_deref(), rates);
            let rate = region_rate(name.as_deref(), rates).and_then(|r| r.value());

            feature.set_property("style", style_json(&style));
            feature.set_property(
                "hoverStyle",
                style_json(&style.with_overlay(&RegionStyle::hover())),
            );
            feature.set_property("crimeRate", rate);
            if let Some(name) = &name {
                feature.set_property("popup", popup_html(name, rates));
            }
        }

        collection
    }
}

fn feature_name(feature: &geojson::Feature) -> Option<&str> {
    feature
        .property(REGION_NAME_PROPERTY)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn style_json(style: &RegionStyle) -> serde_json::Value {
    serde_json::to_value(style).unwrap_or(serde_json::Value::Null)
}

fn to_multipolygon(geometry: geo::Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
