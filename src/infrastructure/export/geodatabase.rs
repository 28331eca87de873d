//! Simplified geodatabase export
//!
//! Not a binary File Geodatabase. The archive holds a `<dataset>.gdb/`
//! folder with one GeoJSON document per non-empty feature class and a
//! `gdb_metadata.json` describing the classes, plus a README at the root.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::outbound::{ExportPayload, FeatureEncoder};
use crate::domain::entities::FeatureCollection;
use crate::domain::value_objects::{LayerSelection, LayerType};
use crate::infrastructure::export::archive::ArchiveBuilder;

pub const GEODATABASE_FILENAME: &str = "coffee_map_gdb.zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: &'static str,
}

const fn field(name: &'static str, field_type: &'static str) -> FieldDefinition {
    FieldDefinition { name, field_type }
}

/// Static description of one feature class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureClassDefinition {
    pub name: &'static str,
    pub geometry_type: &'static str,
    pub fields: &'static [FieldDefinition],
}

const COFFEE_SHOP_FIELDS: &[FieldDefinition] = &[
    field("name", "esriFieldTypeString"),
    field("type", "esriFieldTypeString"),
    field("potential", "esriFieldTypeString"),
    field("featureId", "esriFieldTypeString"),
];

const FOOT_TRAFFIC_FIELDS: &[FieldDefinition] = &[
    field("intensity", "esriFieldTypeDouble"),
    field("count", "esriFieldTypeInteger"),
    field("time", "esriFieldTypeString"),
    field("featureId", "esriFieldTypeString"),
];

const BOUNDARY_FIELDS: &[FieldDefinition] = &[
    field("name", "esriFieldTypeString"),
    field("type", "esriFieldTypeString"),
    field("radius", "esriFieldTypeDouble"),
    field("radiusUnit", "esriFieldTypeString"),
    field("center", "esriFieldTypeString"),
];

/// Feature class for a layer, with the GeoJSON file it is stored in
pub fn feature_class(layer: LayerType) -> (FeatureClassDefinition, &'static str) {
    match layer {
        LayerType::CoffeeShop => (
            FeatureClassDefinition {
                name: "CoffeeShops",
                geometry_type: "esriGeometryPoint",
                fields: COFFEE_SHOP_FIELDS,
            },
            "coffee_shops.geojson",
        ),
        LayerType::FootTraffic => (
            FeatureClassDefinition {
                name: "FootTraffic",
                geometry_type: "esriGeometryPoint",
                fields: FOOT_TRAFFIC_FIELDS,
            },
            "foot_traffic.geojson",
        ),
        LayerType::Radius => (
            FeatureClassDefinition {
                name: "StudyArea",
                geometry_type: "esriGeometryPolygon",
                fields: BOUNDARY_FIELDS,
            },
            "boundaries.geojson",
        ),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialReference {
    pub wkid: u32,
    pub latest_wkid: u32,
    pub name: &'static str,
    pub authority: &'static str,
}

impl SpatialReference {
    pub fn wgs84() -> Self {
        Self {
            wkid: 4326,
            latest_wkid: 4326,
            name: "GCS_WGS_1984",
            authority: "EPSG:4326",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeodatabaseMetadata {
    pub name: String,
    pub format: &'static str,
    pub feature_classes: Vec<FeatureClassDefinition>,
    pub spatial_reference: SpatialReference,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GeodatabaseEncoder {
    dataset_name: String,
}

impl GeodatabaseEncoder {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
        }
    }

    fn folder(&self) -> String {
        format!("{}.gdb", self.dataset_name)
    }

    fn readme(&self, files: &[&str]) -> String {
        let folder = self.folder();
        let mut text = String::from("Coffee Map Geodatabase Export\n=============================\n\n");
        text.push_str(&format!(
            "The {} folder is an interchange-friendly stand-in for an Esri File\n\
             Geodatabase. It is NOT a byte-compatible binary geodatabase: each\n\
             feature class is stored as a GeoJSON document, and gdb_metadata.json\n\
             describes the feature classes, their fields and the spatial reference.\n\n",
            folder
        ));
        if files.is_empty() {
            text.push_str("No feature classes contained features to export.\n");
        } else {
            text.push_str("Feature classes:\n\n");
            for file in files {
                text.push_str(&format!("- {}/{}\n", folder, file));
            }
        }
        text.push_str(
            "\nTo convert to a real geodatabase, import the GeoJSON files with\n\
             ArcGIS Pro (JSON To Features) or ogr2ogr.\n\
             Spatial reference: WGS 84 (EPSG:4326).\n",
        );
        text
    }
}

impl FeatureEncoder for GeodatabaseEncoder {
    fn encode(
        &self,
        features: &FeatureCollection,
        _selection: &LayerSelection,
    ) -> Result<ExportPayload> {
        let folder = self.folder();
        let mut documents = Vec::new();
        let mut classes = Vec::new();

        for layer in LayerType::ALL {
            let partition = features.partition(layer);
            if partition.is_empty() {
                continue;
            }
            let (class, file) = feature_class(layer);
            let json = serde_json::to_string_pretty(&partition)
                .with_context(|| format!("Failed to serialize {}", file))?;
            documents.push((file, json));
            classes.push(class);
        }

        let metadata = GeodatabaseMetadata {
            name: self.dataset_name.clone(),
            format: "GeoJSON feature classes (simplified geodatabase)",
            feature_classes: classes,
            spatial_reference: SpatialReference::wgs84(),
            created: Utc::now(),
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)
            .context("Failed to serialize gdb_metadata.json")?;

        let files: Vec<&str> = documents.iter().map(|(file, _)| *file).collect();
        let mut archive = ArchiveBuilder::new();
        archive.add_text("README.txt", self.readme(&files));
        for (file, json) in &documents {
            archive.add_text(format!("{}/{}", folder, file), json.as_str());
        }
        archive.add_text(format!("{}/gdb_metadata.json", folder), metadata_json);

        Ok(ExportPayload::zip(archive.finish()?, GEODATABASE_FILENAME))
    }
}
