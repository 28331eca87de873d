//! Canonical GeoJSON-shaped features shared by every encoder

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::LayerType;

/// A `[longitude, latitude]` position
pub type Position = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    /// Rings of positions; the first ring is the exterior
    Polygon { coordinates: Vec<Vec<Position>> },
}

impl Geometry {
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lng, lat],
        }
    }

    pub fn polygon(exterior: Vec<Position>) -> Self {
        Geometry::Polygon {
            coordinates: vec![exterior],
        }
    }
}

/// A normalized geometry plus its property bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct CanonicalFeature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl CanonicalFeature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Source layer, read from `properties.layerType`
    pub fn layer_type(&self) -> Option<LayerType> {
        self.properties
            .get("layerType")
            .and_then(Value::as_str)
            .and_then(LayerType::from_tag)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|v| !v.is_null())
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    pub fn f64_property(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<CanonicalFeature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<CanonicalFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features of one layer, in their original order
    pub fn layer(&self, layer: LayerType) -> impl Iterator<Item = &CanonicalFeature> {
        self.features
            .iter()
            .filter(move |f| f.layer_type() == Some(layer))
    }

    /// A new collection holding only one layer's features
    pub fn partition(&self, layer: LayerType) -> FeatureCollection {
        FeatureCollection::new(self.layer(layer).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(layer: &str) -> CanonicalFeature {
        let mut props = Map::new();
        props.insert("layerType".to_string(), json!(layer));
        CanonicalFeature::new(Geometry::point(-73.9855, 40.758), props)
    }

    #[test]
    fn test_feature_serializes_as_geojson() {
        let value = serde_json::to_value(feature("coffeeShop")).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["geometry"]["coordinates"], json!([-73.9855, 40.758]));
        assert_eq!(value["properties"]["layerType"], "coffeeShop");
    }

    #[test]
    fn test_collection_serializes_type_tag() {
        let collection = FeatureCollection::new(vec![feature("radius")]);
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_partition_by_layer_type() {
        let collection = FeatureCollection::new(vec![
            feature("coffeeShop"),
            feature("footTraffic"),
            feature("coffeeShop"),
            feature("unknown"),
        ]);
        assert_eq!(collection.partition(LayerType::CoffeeShop).len(), 2);
        assert_eq!(collection.partition(LayerType::FootTraffic).len(), 1);
        assert!(collection.partition(LayerType::Radius).is_empty());
    }
}
