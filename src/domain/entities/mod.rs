//! Domain entities - Map layer records and canonical features

mod feature;
mod map_data;

pub use feature::{CanonicalFeature, FeatureCollection, Geometry, Position};
pub use map_data::{CoffeeShop, FootTrafficPoint, LatLng, MapData, SearchRadius};

pub(crate) use map_data::coordinates;
