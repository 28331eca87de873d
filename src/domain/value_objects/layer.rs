//! Map layer identity and caller-supplied layer selection

use serde::{Deserialize, Serialize};

/// The source layer a canonical feature came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerType {
    CoffeeShop,
    FootTraffic,
    Radius,
}

impl LayerType {
    /// All layers, in export order
    pub const ALL: [LayerType; 3] = [
        LayerType::CoffeeShop,
        LayerType::FootTraffic,
        LayerType::Radius,
    ];

    /// Tag stored in `properties.layerType`
    pub fn tag(&self) -> &'static str {
        match self {
            LayerType::CoffeeShop => "coffeeShop",
            LayerType::FootTraffic => "footTraffic",
            LayerType::Radius => "radius",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "coffeeShop" => Some(LayerType::CoffeeShop),
            "footTraffic" => Some(LayerType::FootTraffic),
            "radius" => Some(LayerType::Radius),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Which layers the caller wants in the export
///
/// Missing flags deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerSelection {
    pub coffee_shops: bool,
    pub foot_traffic: bool,
    pub radius: bool,
}

impl LayerSelection {
    pub fn is_selected(&self, layer: LayerType) -> bool {
        match layer {
            LayerType::CoffeeShop => self.coffee_shops,
            LayerType::FootTraffic => self.foot_traffic,
            LayerType::Radius => self.radius,
        }
    }

    /// Number of `true` flags
    pub fn selected_count(&self) -> usize {
        LayerType::ALL
            .iter()
            .filter(|layer| self.is_selected(**layer))
            .count()
    }

    /// The single selected layer, if exactly one flag is set
    pub fn single(&self) -> Option<LayerType> {
        let mut selected = LayerType::ALL.into_iter().filter(|l| self.is_selected(*l));
        match (selected.next(), selected.next()) {
            (Some(layer), None) => Some(layer),
            _ => None,
        }
    }
}
