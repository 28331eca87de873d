//! Export Service - Dispatches an export request to the matching encoder
//!
//! The pipeline for one request is normalize -> encode. Nothing is shared
//! between requests apart from the stateless encoders themselves.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::dto::ExportRequestDto;
use crate::application::ports::outbound::{ExportPayload, FeatureEncoder};
use crate::domain::services::{DroppedRecords, GeometryNormalizer};
use crate::domain::value_objects::{ExportFormat, UnsupportedFormat};

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    #[error("Export contains {count} features, the limit is {limit}")]
    TooLarge { count: usize, limit: usize },
    #[error("{0:#}")]
    Failed(#[from] anyhow::Error),
}

/// A successful export plus what was left out of it
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub payload: ExportPayload,
    pub dropped: DroppedRecords,
}

/// The three format encoders, one per `ExportFormat`
pub struct Encoders {
    pub shapefile: Arc<dyn FeatureEncoder>,
    pub geodatabase: Arc<dyn FeatureEncoder>,
    pub csv: Arc<dyn FeatureEncoder>,
}

pub struct ExportService {
    normalizer: GeometryNormalizer,
    encoders: Encoders,
    max_features: usize,
}

impl ExportService {
    pub fn new(normalizer: GeometryNormalizer, encoders: Encoders, max_features: usize) -> Self {
        Self {
            normalizer,
            encoders,
            max_features,
        }
    }

    fn encoder(&self, format: ExportFormat) -> &dyn FeatureEncoder {
        match format {
            ExportFormat::Shapefile => self.encoders.shapefile.as_ref(),
            ExportFormat::Geodatabase => self.encoders.geodatabase.as_ref(),
            ExportFormat::Csv => self.encoders.csv.as_ref(),
        }
    }

    /// Run one export request to completion
    ///
    /// The format is validated before any normalization work is done.
    #[instrument(skip(self, request), fields(format = %request.format))]
    pub fn export(&self, request: &ExportRequestDto) -> Result<ExportOutcome, ExportError> {
        let format: ExportFormat = request.format.parse()?;
        let selection = request.selected_layers;

        let normalized = self.normalizer.normalize(&request.map_data, &selection);
        let count = normalized.features.len();
        debug!(
            features = count,
            selected_layers = selection.selected_count(),
            "Normalized map data"
        );

        if count > self.max_features {
            return Err(ExportError::TooLarge {
                count,
                limit: self.max_features,
            });
        }

        let payload = self.encoder(format).encode(&normalized.features, &selection)?;
        info!(
            filename = payload.filename,
            bytes = payload.bytes.len(),
            features = count,
            dropped = normalized.dropped.total(),
            "Export generated"
        );

        Ok(ExportOutcome {
            format,
            payload,
            dropped: normalized.dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CoffeeShop, FeatureCollection, MapData};
    use crate::domain::value_objects::LayerSelection;

    struct MockEncoder(&'static str);

    impl FeatureEncoder for MockEncoder {
        fn encode(
            &self,
            features: &FeatureCollection,
            _selection: &LayerSelection,
        ) -> anyhow::Result<ExportPayload> {
            Ok(ExportPayload::zip(
                features.len().to_string().into_bytes(),
                self.0,
            ))
        }
    }

    struct FailingEncoder;

    impl FeatureEncoder for FailingEncoder {
        fn encode(
            &self,
            _features: &FeatureCollection,
            _selection: &LayerSelection,
        ) -> anyhow::Result<ExportPayload> {
            Err(anyhow::anyhow!("disk full").context("Failed to write archive"))
        }
    }

    fn service(max_features: usize) -> ExportService {
        ExportService::new(
            GeometryNormalizer::default(),
            Encoders {
                shapefile: Arc::new(MockEncoder("shp")),
                geodatabase: Arc::new(MockEncoder("gdb")),
                csv: Arc::new(FailingEncoder),
            },
            max_features,
        )
    }

    fn request(format: &str, shops: usize) -> ExportRequestDto {
        ExportRequestDto {
            format: format.to_string(),
            map_data: MapData {
                coffee_shops: (0..shops)
                    .map(|i| CoffeeShop {
                        lat: Some(40.0 + i as f64 * 0.001),
                        lng: Some(-73.0),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            },
            selected_layers: LayerSelection {
                coffee_shops: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_dispatches_by_format() {
        let outcome = service(10).export(&request(".shp", 2)).unwrap();
        assert_eq!(outcome.format, ExportFormat::Shapefile);
        assert_eq!(outcome.payload.filename, "shp");
        assert_eq!(outcome.payload.bytes, b"2");

        let outcome = service(10).export(&request(".gdb", 1)).unwrap();
        assert_eq!(outcome.payload.filename, "gdb");
    }

    #[test]
    fn test_unsupported_format() {
        let err = service(10).export(&request(".kml", 1)).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
        assert_eq!(
            err.to_string(),
            "Format .kml is not currently supported for server-side export."
        );
    }

    #[test]
    fn test_encoder_failure_keeps_underlying_message() {
        let err = service(10).export(&request(".csv", 1)).unwrap_err();
        assert!(matches!(err, ExportError::Failed(_)));
        assert_eq!(err.to_string(), "Failed to write archive: disk full");
    }

    #[test]
    fn test_feature_limit() {
        let err = service(2).export(&request(".shp", 3)).unwrap_err();
        assert!(matches!(err, ExportError::TooLarge { count: 3, limit: 2 }));
    }
}
