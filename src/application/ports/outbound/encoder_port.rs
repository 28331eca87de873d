use crate::domain::entities::FeatureCollection;
use crate::domain::value_objects::LayerSelection;

/// A finished download: bytes plus the metadata the HTTP layer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// Fixed per format (and CSV mode), never derived from request content
    pub filename: &'static str,
}

impl ExportPayload {
    pub fn zip(bytes: Vec<u8>, filename: &'static str) -> Self {
        Self {
            bytes,
            content_type: "application/zip",
            filename,
        }
    }

    pub fn csv(text: String, filename: &'static str) -> Self {
        Self {
            bytes: text.into_bytes(),
            content_type: "text/csv",
            filename,
        }
    }
}

/// Packages canonical features into one downloadable file format
///
/// Implementations must be pure functions of their input so that
/// concurrent requests never share state.
pub trait FeatureEncoder: Send + Sync {
    fn encode(
        &self,
        features: &FeatureCollection,
        selection: &LayerSelection,
    ) -> anyhow::Result<ExportPayload>;
}
