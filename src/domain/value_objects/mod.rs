//! Value objects - Immutable objects defined by their attributes

mod export_format;
mod intensity;
mod layer;

pub use export_format::{ExportFormat, UnsupportedFormat};
pub use intensity::{IntensityCategory, DEFAULT_INTENSITY};
pub use layer::{LayerSelection, LayerType};
