//! CSV export
//!
//! Exactly one selected layer produces a single CSV on a shared six-column
//! schema. Any other selection produces a zip of per-layer CSVs, each with
//! its own schema, plus a README listing the files written.
//!
//! Text cells are wrapped in double quotes with inner quotes doubled;
//! numeric cells are written bare.

use anyhow::Result;
use serde_json::Value;

use crate::application::ports::outbound::{ExportPayload, FeatureEncoder};
use crate::domain::entities::{CanonicalFeature, FeatureCollection};
use crate::domain::value_objects::{LayerSelection, LayerType};
use crate::infrastructure::export::archive::ArchiveBuilder;
use crate::infrastructure::export::fields::{
    extra_columns, format_number, intensity_category_of, intensity_of, parse_center, plain_text,
    point_lat_lng,
};

pub const CSV_FILENAME: &str = "coffee_map_export.csv";
pub const CSV_ARCHIVE_FILENAME: &str = "coffee_map_csv_export.zip";

/// Name reported for the analysis area
pub const ANALYSIS_AREA_NAME: &str = "Times Square";

const METERS_PER_MILE: f64 = 1609.34;

const SINGLE_HEADER: &str = "layer_type,feature_id,name,latitude,longitude,additional_info";
const COFFEE_SHOPS_HEADER: &str = "feature_id,name,latitude,longitude,potential,type";
const FOOT_TRAFFIC_BASE_HEADER: &str = "feature_id,latitude,longitude,intensity,intensity_category";
const ANALYSIS_AREA_HEADER: &str = "name,center_latitude,center_longitude,radius_meters,radius_miles";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEncoder;

impl CsvEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureEncoder for CsvEncoder {
    fn encode(
        &self,
        features: &FeatureCollection,
        selection: &LayerSelection,
    ) -> Result<ExportPayload> {
        if selection.single().is_some() {
            return Ok(ExportPayload::csv(single_csv(features), CSV_FILENAME));
        }

        let mut files: Vec<(&'static str, &'static str, String)> = Vec::new();
        for layer in LayerType::ALL {
            let rows: Vec<&CanonicalFeature> = features.layer(layer).collect();
            if rows.is_empty() {
                continue;
            }
            let (name, description, text) = match layer {
                LayerType::CoffeeShop => (
                    "coffee_shops.csv",
                    "Coffee shop locations",
                    coffee_shops_csv(&rows),
                ),
                LayerType::FootTraffic => (
                    "foot_traffic.csv",
                    "Foot traffic samples with intensity categories",
                    foot_traffic_csv(&rows),
                ),
                LayerType::Radius => (
                    "analysis_area.csv",
                    "Analysis area center and radius",
                    analysis_area_csv(&rows),
                ),
            };
            files.push((name, description, text));
        }

        let mut archive = ArchiveBuilder::new();
        archive.add_text("README.txt", readme(&files));
        for (name, _, text) in files {
            archive.add_text(name, text);
        }
        Ok(ExportPayload::zip(archive.finish()?, CSV_ARCHIVE_FILENAME))
    }
}

/// Quote a text cell, doubling inner quotes
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// A header name, quoted only when it would otherwise split or break the row
pub fn header_cell(name: &str) -> String {
    if name.contains([',', '"', '\n', '\r']) {
        quote(name)
    } else {
        name.to_string()
    }
}

/// A property cell: numbers and booleans bare, text quoted, missing empty
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => plain_text(v),
        Some(Value::String(s)) => quote(s),
        Some(other) => quote(&other.to_string()),
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push_str(&cells.join(","));
    out.push('\n');
}

fn coordinates_cells(feature: &CanonicalFeature) -> [String; 2] {
    match point_lat_lng(feature) {
        Some((lat, lng)) => [format_number(lat), format_number(lng)],
        None => [String::new(), String::new()],
    }
}

fn analysis_area(feature: &CanonicalFeature) -> (Option<(f64, f64)>, Option<f64>) {
    let center = feature.str_property("center").and_then(parse_center);
    (center, feature.f64_property("radius"))
}

fn miles(meters: f64) -> String {
    format!("{:.2}", meters / METERS_PER_MILE)
}

/// Single-layer CSV on the shared six-column schema
pub fn single_csv(features: &FeatureCollection) -> String {
    let mut out = String::new();
    out.push_str(SINGLE_HEADER);
    out.push('\n');

    for feature in &features.features {
        let Some(layer) = feature.layer_type() else {
            continue;
        };
        let row = match layer {
            LayerType::CoffeeShop => {
                let [lat, lng] = coordinates_cells(feature);
                let mut info = format!(
                    "Potential: {}",
                    feature.str_property("potential").unwrap_or_default()
                );
                if let Some(shop_type) = feature.property("type") {
                    info.push_str(&format!("; Type: {}", plain_text(shop_type)));
                }
                vec![
                    quote("Coffee Shop"),
                    cell(feature.property("featureId")),
                    quote(feature.str_property("name").unwrap_or_default()),
                    lat,
                    lng,
                    quote(&info),
                ]
            }
            LayerType::FootTraffic => {
                let [lat, lng] = coordinates_cells(feature);
                let mut info = format!(
                    "Intensity: {} ({})",
                    intensity_category_of(feature),
                    format_number(intensity_of(feature))
                );
                if let Some(count) = feature.property("count") {
                    info.push_str(&format!("; Count: {}", plain_text(count)));
                }
                if let Some(time) = feature.property("time") {
                    info.push_str(&format!("; Time: {}", plain_text(time)));
                }
                let name = feature
                    .str_property("street_nam")
                    .unwrap_or("Foot Traffic Point");
                vec![
                    quote("Foot Traffic"),
                    cell(feature.property("featureId")),
                    quote(name),
                    lat,
                    lng,
                    quote(&info),
                ]
            }
            LayerType::Radius => {
                let (center, radius) = analysis_area(feature);
                let (lat, lng) = center
                    .map(|(lat, lng)| (format_number(lat), format_number(lng)))
                    .unwrap_or_default();
                let meters = radius.unwrap_or_default();
                vec![
                    quote("Analysis Area"),
                    quote("analysis_area"),
                    quote(ANALYSIS_AREA_NAME),
                    lat,
                    lng,
                    quote(&format!(
                        "Radius: {} miles ({} meters)",
                        miles(meters),
                        format_number(meters)
                    )),
                ]
            }
        };
        push_row(&mut out, &row);
    }
    out
}

pub fn coffee_shops_csv(rows: &[&CanonicalFeature]) -> String {
    let mut out = String::new();
    out.push_str(COFFEE_SHOPS_HEADER);
    out.push('\n');
    for feature in rows {
        let [lat, lng] = coordinates_cells(feature);
        push_row(
            &mut out,
            &[
                cell(feature.property("featureId")),
                cell(feature.property("name")),
                lat,
                lng,
                cell(feature.property("potential")),
                cell(feature.property("type")),
            ],
        );
    }
    out
}

/// Foot-traffic CSV with upstream columns appended after the base schema
pub fn foot_traffic_csv(rows: &[&CanonicalFeature]) -> String {
    let extras = extra_columns(rows.iter().copied());

    let mut out = String::new();
    out.push_str(FOOT_TRAFFIC_BASE_HEADER);
    for column in &extras {
        out.push(',');
        out.push_str(&header_cell(column));
    }
    out.push('\n');

    for feature in rows {
        let [lat, lng] = coordinates_cells(feature);
        let mut cells = vec![
            cell(feature.property("featureId")),
            lat,
            lng,
            format_number(intensity_of(feature)),
            quote(intensity_category_of(feature).label()),
        ];
        cells.extend(extras.iter().map(|key| cell(feature.property(key))));
        push_row(&mut out, &cells);
    }
    out
}

pub fn analysis_area_csv(rows: &[&CanonicalFeature]) -> String {
    let mut out = String::new();
    out.push_str(ANALYSIS_AREA_HEADER);
    out.push('\n');
    for feature in rows {
        let (center, radius) = analysis_area(feature);
        let (lat, lng) = center
            .map(|(lat, lng)| (format_number(lat), format_number(lng)))
            .unwrap_or_default();
        let (meters, miles) = radius
            .map(|m| (format_number(m), miles(m)))
            .unwrap_or_default();
        push_row(&mut out, &[quote(ANALYSIS_AREA_NAME), lat, lng, meters, miles]);
    }
    out
}

fn readme(files: &[(&str, &str, String)]) -> String {
    let mut text = String::from("Coffee Map CSV Export\n=====================\n\n");
    if files.is_empty() {
        text.push_str("No layers with data were selected for export.\n");
    } else {
        text.push_str("This archive contains the following files:\n\n");
        for (name, description, _) in files {
            text.push_str(&format!("- {}: {}\n", name, description));
        }
    }
    text.push_str("\nCoordinates are WGS 84 (EPSG:4326) decimal degrees.\n");
    text
}
