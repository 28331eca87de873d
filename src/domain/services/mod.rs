//! Domain services - Pure geometry operations

pub mod geodesic;
pub mod geometry_normalizer;

pub use geometry_normalizer::{DroppedRecords, GeometryNormalizer};
