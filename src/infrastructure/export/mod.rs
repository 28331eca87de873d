//! Export encoders
//!
//! Format adapters behind the `FeatureEncoder` port:
//! - [`ShapefileEncoder`]: zipped per-layer shapefiles
//! - [`GeodatabaseEncoder`]: GeoJSON-based stand-in for a File Geodatabase
//! - [`CsvEncoder`]: single CSV or zipped per-layer CSVs
//!
//! Archives are assembled with [`archive::ArchiveBuilder`].

pub mod archive;
pub mod csv;
pub mod fields;
pub mod geodatabase;
pub mod shapefile;

pub use csv::CsvEncoder;
pub use geodatabase::GeodatabaseEncoder;
pub use shapefile::ShapefileEncoder;
