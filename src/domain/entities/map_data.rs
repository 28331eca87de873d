//! Map layer records as sent by the map UI
//!
//! Coordinates are stored `{lat, lng}` here. Canonical features flip them to
//! `[lng, lat]`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A coffee shop marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShop {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, rename = "type")]
    pub shop_type: Option<Value>,
    #[serde(default)]
    pub potential: Option<Value>,
    /// String or numeric id assigned by the map UI
    #[serde(default)]
    pub feature_id: Option<Value>,
}

/// A foot-traffic sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootTrafficPoint {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub intensity: Option<f64>,
    #[serde(default)]
    pub count: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
    #[serde(default)]
    pub feature_id: Option<Value>,
    /// Property bag inherited from the upstream pedestrian-count dataset
    #[serde(default)]
    pub original_properties: Option<Map<String, Value>>,
}

/// The circular analysis area around the map center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRadius {
    pub center: LatLng,
    /// Radius in meters
    pub radius: f64,
}

/// Everything the map UI sends for one export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    #[serde(default)]
    pub coffee_shops: Vec<CoffeeShop>,
    #[serde(default)]
    pub foot_traffic: Vec<FootTrafficPoint>,
    #[serde(default)]
    pub radius: Option<SearchRadius>,
}

/// Both coordinates, if present and in range
pub(crate) fn coordinates(lat: Option<f64>, lng: Option<f64>) -> Option<LatLng> {
    let point = LatLng::new(lat?, lng?);
    point.is_valid().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_map_data() {
        let json = r#"{
            "coffeeShops": [{"lat": 40.758, "lng": -73.9855, "name": "Joe's", "type": "cafe", "featureId": 7}],
            "footTraffic": [{"lat": 40.75, "lng": -73.99, "intensity": 0.9,
                             "originalProperties": {"borough": "Manhattan"}}],
            "radius": {"center": {"lat": 40.758, "lng": -73.9855}, "radius": 500}
        }"#;
        let data: MapData = serde_json::from_str(json).unwrap();

        assert_eq!(data.coffee_shops[0].shop_type, Some(Value::from("cafe")));
        assert_eq!(data.coffee_shops[0].feature_id, Some(Value::from(7)));
        assert_eq!(
            data.foot_traffic[0].original_properties.as_ref().unwrap()["borough"],
            "Manhattan"
        );
        assert_eq!(data.radius.unwrap().radius, 500.0);
    }

    #[test]
    fn test_non_string_shop_fields_are_accepted() {
        let json = r#"{"coffeeShops": [{"lat": 1, "lng": 2, "name": 42, "type": 3, "potential": null}]}"#;
        let data: MapData = serde_json::from_str(json).unwrap();
        assert_eq!(data.coffee_shops[0].name, Some(Value::from(42)));
        assert_eq!(data.coffee_shops[0].shop_type, Some(Value::from(3)));
        assert_eq!(data.coffee_shops[0].potential, None);
    }

    #[test]
    fn test_empty_map_data() {
        let data: MapData = serde_json::from_str("{}").unwrap();
        assert!(data.coffee_shops.is_empty());
        assert!(data.foot_traffic.is_empty());
        assert!(data.radius.is_none());
    }

    #[test]
    fn test_coordinates_require_both_in_range() {
        assert!(coordinates(Some(40.0), Some(-73.0)).is_some());
        assert!(coordinates(None, Some(-73.0)).is_none());
        assert!(coordinates(Some(40.0), None).is_none());
        assert!(coordinates(Some(95.0), Some(-73.0)).is_none());
        assert!(coordinates(Some(40.0), Some(f64::NAN)).is_none());
    }
}
