//! Property access and value formatting shared by the encoders

use serde_json::Value;

use crate::domain::entities::{CanonicalFeature, Geometry};
use crate::domain::value_objects::{IntensityCategory, DEFAULT_INTENSITY};

/// Upper bound on upstream columns carried into foot-traffic exports
pub const MAX_EXTRA_COLUMNS: usize = 20;

/// Street-segment keys kept from the upstream pedestrian dataset
const STREET_KEYS: [&str; 4] = ["street_nam", "from_stree", "to_street", "borough"];

/// Time-of-day count columns (`may07_am`, `oct08_pm`, ...)
const PERIOD_MARKERS: [&str; 3] = ["_am", "_md", "_pm"];

/// Keys that rows without an upstream bag contribute instead
const SAMPLE_KEYS: [&str; 2] = ["count", "time"];

pub fn is_upstream_column(key: &str) -> bool {
    STREET_KEYS.contains(&key) || PERIOD_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Extra foot-traffic columns, computed across every row
///
/// Returns the first-seen-order union of each row's extra keys, capped at
/// [`MAX_EXTRA_COLUMNS`]. Rows are later filled by key lookup, so every value
/// lands under its own header.
pub fn extra_columns<'a>(features: impl IntoIterator<Item = &'a CanonicalFeature>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for feature in features {
        for key in feature.properties.keys() {
            if columns.len() == MAX_EXTRA_COLUMNS {
                return columns;
            }
            let wanted = is_upstream_column(key) || SAMPLE_KEYS.contains(&key.as_str());
            if wanted && !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Shortest round-trip form; whole numbers print without a fraction
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// A property value as plain text, without quoting
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(format_number).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// `[lng, lat]` of a point feature, returned as `(lat, lng)`
pub fn point_lat_lng(feature: &CanonicalFeature) -> Option<(f64, f64)> {
    match feature.geometry {
        Geometry::Point {
            coordinates: [lng, lat],
        } => Some((lat, lng)),
        Geometry::Polygon { .. } => None,
    }
}

/// Parse the `"<lat>,<lng>"` center string of the analysis area
pub fn parse_center(center: &str) -> Option<(f64, f64)> {
    let (lat, lng) = center.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

pub fn intensity_of(feature: &CanonicalFeature) -> f64 {
    feature.f64_property("intensity").unwrap_or(DEFAULT_INTENSITY)
}

pub fn intensity_category_of(feature: &CanonicalFeature) -> IntensityCategory {
    IntensityCategory::from_intensity(intensity_of(feature))
}
