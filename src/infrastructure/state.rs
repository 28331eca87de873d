//! Shared application state

use std::sync::Arc;

use crate::application::services::{Encoders, ExportService};
use crate::domain::services::GeometryNormalizer;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::export::{CsvEncoder, GeodatabaseEncoder, ShapefileEncoder};

/// Shared application state
///
/// Holds only configuration and stateless services; requests never share
/// mutable data through it.
pub struct AppState {
    pub config: AppConfig,
    pub export_service: Arc<ExportService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let encoders = Encoders {
            shapefile: Arc::new(ShapefileEncoder::new()),
            geodatabase: Arc::new(GeodatabaseEncoder::new(config.dataset_name.clone())),
            csv: Arc::new(CsvEncoder::new()),
        };
        let export_service = ExportService::new(
            GeometryNormalizer::default(),
            encoders,
            config.max_features,
        );

        Self {
            config,
            export_service: Arc::new(export_service),
        }
    }
}
