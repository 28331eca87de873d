//! Geometry normalization
//!
//! Turns the raw map layers into canonical features tagged with their
//! `layerType`. Property defaulting lives in small pure functions so each
//! rule can be checked on its own.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::domain::entities::{
    coordinates, CanonicalFeature, CoffeeShop, FeatureCollection, FootTrafficPoint, Geometry,
    MapData, SearchRadius,
};
use crate::domain::services::geodesic::{CircleSampler, HaversineCircleSampler};
use crate::domain::value_objects::{LayerSelection, LayerType, DEFAULT_INTENSITY};

pub const DEFAULT_SHOP_NAME: &str = "Coffee Shop";
pub const DEFAULT_POTENTIAL: &str = "existing";

/// Records excluded from the output, per layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DroppedRecords {
    pub coffee_shops: usize,
    pub foot_traffic: usize,
    pub radius: usize,
}

impl DroppedRecords {
    pub fn total(&self) -> usize {
        self.coffee_shops + self.foot_traffic + self.radius
    }
}

/// Output of a normalization pass
#[derive(Debug, Clone, Default)]
pub struct NormalizedMap {
    pub features: FeatureCollection,
    pub dropped: DroppedRecords,
}

pub struct GeometryNormalizer {
    sampler: Arc<dyn CircleSampler>,
}

impl GeometryNormalizer {
    pub fn new(sampler: Arc<dyn CircleSampler>) -> Self {
        Self { sampler }
    }

    /// Normalize every selected layer, in coffee shop / foot traffic / radius order
    pub fn normalize(&self, map_data: &MapData, selection: &LayerSelection) -> NormalizedMap {
        let mut features = Vec::new();
        let mut dropped = DroppedRecords::default();

        if selection.coffee_shops {
            let before = features.len();
            features.extend(normalize_coffee_shops(&map_data.coffee_shops));
            dropped.coffee_shops = map_data.coffee_shops.len() - (features.len() - before);
        }

        if selection.foot_traffic {
            let before = features.len();
            features.extend(normalize_foot_traffic(&map_data.foot_traffic));
            dropped.foot_traffic = map_data.foot_traffic.len() - (features.len() - before);
        }

        if selection.radius {
            if let Some(radius) = &map_data.radius {
                match self.normalize_circle(radius) {
                    Some(feature) => features.push(feature),
                    None => dropped.radius = 1,
                }
            }
        }

        if dropped.total() > 0 {
            tracing::warn!(
                coffee_shops = dropped.coffee_shops,
                foot_traffic = dropped.foot_traffic,
                radius = dropped.radius,
                "Dropped records without usable coordinates"
            );
        }

        NormalizedMap {
            features: FeatureCollection::new(features),
            dropped,
        }
    }

    /// Approximate the analysis circle as a polygon
    ///
    /// Returns `None` for an invalid center or a non-positive radius.
    pub fn normalize_circle(&self, radius: &SearchRadius) -> Option<CanonicalFeature> {
        if !radius.center.is_valid() || !radius.radius.is_finite() || radius.radius <= 0.0 {
            return None;
        }

        let radius_km = radius.radius / 1000.0;
        let ring = self.sampler.sample(radius.center, radius_km);
        Some(CanonicalFeature::new(
            Geometry::polygon(ring),
            circle_properties(radius),
        ))
    }
}

impl Default for GeometryNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(HaversineCircleSampler::default()))
    }
}

pub fn normalize_coffee_shops(records: &[CoffeeShop]) -> Vec<CanonicalFeature> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, shop)| {
            let point = coordinates(shop.lat, shop.lng)?;
            Some(CanonicalFeature::new(
                Geometry::point(point.lng, point.lat),
                coffee_shop_properties(shop, index),
            ))
        })
        .collect()
}

pub fn normalize_foot_traffic(records: &[FootTrafficPoint]) -> Vec<CanonicalFeature> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| {
            let point = coordinates(sample.lat, sample.lng)?;
            Some(CanonicalFeature::new(
                Geometry::point(point.lng, point.lat),
                foot_traffic_properties(sample, index),
            ))
        })
        .collect()
}

/// Record id, or a 1-based positional id within the layer
pub fn feature_id_or(id: Option<&Value>, prefix: &str, index: usize) -> Value {
    match id {
        Some(Value::Null) | None => Value::String(format!("{}_{}", prefix, index + 1)),
        Some(id) => id.clone(),
    }
}

/// A loosely typed label as text; numbers and booleans are stringified
pub fn label_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn coffee_shop_properties(shop: &CoffeeShop, index: usize) -> Map<String, Value> {
    let name = label_text(shop.name.as_ref()).unwrap_or_else(|| DEFAULT_SHOP_NAME.to_string());
    let potential =
        label_text(shop.potential.as_ref()).unwrap_or_else(|| DEFAULT_POTENTIAL.to_string());

    let mut props = Map::new();
    props.insert("name".to_string(), json!(name));
    if let Some(shop_type) = label_text(shop.shop_type.as_ref()) {
        props.insert("type".to_string(), json!(shop_type));
    }
    props.insert("potential".to_string(), json!(potential));
    props.insert(
        "featureId".to_string(),
        feature_id_or(shop.feature_id.as_ref(), "coffee_shop", index),
    );
    props.insert("layerType".to_string(), json!(LayerType::CoffeeShop.tag()));
    props
}

/// Foot-traffic properties
///
/// With an upstream bag the properties are that bag plus a forced
/// `intensity` and `layerType`; upstream keys win over everything else.
pub fn foot_traffic_properties(sample: &FootTrafficPoint, index: usize) -> Map<String, Value> {
    let intensity = sample.intensity.unwrap_or(DEFAULT_INTENSITY);
    let feature_id = feature_id_or(sample.feature_id.as_ref(), "foot_traffic", index);

    if let Some(original) = &sample.original_properties {
        let mut props = original.clone();
        props.entry("featureId").or_insert(feature_id);
        props.insert("intensity".to_string(), json!(intensity));
        props.insert("layerType".to_string(), json!(LayerType::FootTraffic.tag()));
        return props;
    }

    let mut props = Map::new();
    props.insert("intensity".to_string(), json!(intensity));
    if let Some(count) = sample.count.as_ref().filter(|v| !v.is_null()) {
        props.insert("count".to_string(), count.clone());
    }
    if let Some(time) = sample.time.as_ref().filter(|v| !v.is_null()) {
        props.insert("time".to_string(), time.clone());
    }
    props.insert("featureId".to_string(), feature_id);
    props.insert("layerType".to_string(), json!(LayerType::FootTraffic.tag()));
    props
}

pub fn circle_properties(radius: &SearchRadius) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("name".to_string(), json!("Study Area"));
    props.insert("type".to_string(), json!("Boundary"));
    props.insert("radius".to_string(), json!(radius.radius));
    props.insert("radiusUnit".to_string(), json!("meters"));
    props.insert(
        "center".to_string(),
        json!(format!("{},{}", radius.center.lat, radius.center.lng)),
    );
    props.insert("layerType".to_string(), json!(LayerType::Radius.tag()));
    props
}
