use serde::{Deserialize, Serialize};

use crate::domain::entities::MapData;
use crate::domain::value_objects::LayerSelection;

/// Body of `POST /api/export`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequestDto {
    pub format: String,
    #[serde(default)]
    pub map_data: MapData,
    #[serde(default)]
    pub selected_layers: LayerSelection,
}

/// JSON error body returned instead of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponseDto {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
