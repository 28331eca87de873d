//! Shapefile export
//!
//! Every non-empty layer becomes its own zipped ESRI shapefile
//! (`.shp`, `.shx`, `.dbf`, `.prj`, `.cpg`), and those zips are bundled
//! with a README into one outer archive.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ::shapefile as shp;
use shp::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};

use crate::application::ports::outbound::{ExportPayload, FeatureEncoder};
use crate::domain::entities::{CanonicalFeature, FeatureCollection, Geometry, Position};
use crate::domain::value_objects::{LayerSelection, LayerType};
use crate::infrastructure::export::archive::ArchiveBuilder;
use crate::infrastructure::export::fields::{extra_columns, intensity_category_of, plain_text};

pub const SHAPEFILE_FILENAME: &str = "coffee_map_export.zip";

/// WGS 84 geographic coordinate system in ESRI WKT
pub const WGS84_PRJ: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]]";

/// DBF field names are limited to 10 bytes
const DBF_NAME_LEN: usize = 10;
const DBF_TEXT_LEN: u8 = 254;

/// One shapefile package inside the export
#[derive(Debug, Clone, Copy)]
struct ShapefileLayer {
    layer: LayerType,
    folder: &'static str,
    description: &'static str,
}

const LAYERS: [ShapefileLayer; 3] = [
    ShapefileLayer {
        layer: LayerType::CoffeeShop,
        folder: "coffee_shops",
        description: "Coffee shop locations (Point)",
    },
    ShapefileLayer {
        layer: LayerType::FootTraffic,
        folder: "foot_traffic",
        description: "Foot traffic samples (Point)",
    },
    ShapefileLayer {
        layer: LayerType::Radius,
        folder: "boundaries",
        description: "Study area boundary (Polygon)",
    },
];

#[derive(Debug, Clone)]
enum FieldSource {
    Property(String),
    IntensityCategory,
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Character(u8),
    Numeric { length: u8, decimals: u8 },
}

#[derive(Debug, Clone)]
struct DbfField {
    name: String,
    source: FieldSource,
    kind: FieldKind,
}

impl DbfField {
    fn text(name: &str, source: &str, length: u8) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::Property(source.to_string()),
            kind: FieldKind::Character(length),
        }
    }

    fn numeric(name: &str, source: &str, length: u8, decimals: u8) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::Property(source.to_string()),
            kind: FieldKind::Numeric { length, decimals },
        }
    }

    fn value(&self, feature: &CanonicalFeature) -> FieldValue {
        match (&self.source, self.kind) {
            (FieldSource::IntensityCategory, _) => {
                FieldValue::Character(Some(intensity_category_of(feature).label().to_string()))
            }
            (FieldSource::Property(key), FieldKind::Numeric { .. }) => {
                FieldValue::Numeric(feature.f64_property(key))
            }
            (FieldSource::Property(key), FieldKind::Character(length)) => FieldValue::Character(
                feature
                    .property(key)
                    .map(|v| truncate(&plain_text(v), length as usize)),
            ),
        }
    }
}

/// Attribute table layout for one layer
#[derive(Debug, Clone)]
struct DbfSchema {
    fields: Vec<DbfField>,
}

impl DbfSchema {
    fn for_layer(layer: LayerType, features: &FeatureCollection) -> Self {
        let fields = match layer {
            LayerType::CoffeeShop => vec![
                DbfField::text("feature_id", "featureId", 50),
                DbfField::text("name", "name", 100),
                DbfField::text("type", "type", 50),
                DbfField::text("potential", "potential", 20),
            ],
            LayerType::FootTraffic => {
                let mut fields = vec![
                    DbfField::text("feature_id", "featureId", 50),
                    DbfField::numeric("intensity", "intensity", 10, 3),
                    DbfField {
                        name: "category".to_string(),
                        source: FieldSource::IntensityCategory,
                        kind: FieldKind::Character(10),
                    },
                    DbfField::text("count", "count", 20),
                    DbfField::text("time", "time", 50),
                ];
                for key in extra_columns(&features.features) {
                    let name = truncate(&key, DBF_NAME_LEN);
                    if fields.iter().any(|f| f.name == name) {
                        continue;
                    }
                    fields.push(DbfField::text(&name, &key, DBF_TEXT_LEN));
                }
                fields
            }
            LayerType::Radius => vec![
                DbfField::text("name", "name", 50),
                DbfField::text("type", "type", 50),
                DbfField::numeric("radius", "radius", 16, 2),
                DbfField::text("radius_uni", "radiusUnit", 10),
                DbfField::text("center", "center", 50),
            ],
        };
        Self { fields }
    }

    fn table_builder(&self) -> Result<TableWriterBuilder> {
        let mut builder = TableWriterBuilder::new();
        for field in &self.fields {
            let name = FieldName::try_from(field.name.as_str())
                .map_err(|e| anyhow!("Invalid DBF field name {}: {:?}", field.name, e))?;
            builder = match field.kind {
                FieldKind::Character(length) => builder.add_character_field(name, length),
                FieldKind::Numeric { length, decimals } => {
                    builder.add_numeric_field(name, length, decimals)
                }
            };
        }
        Ok(builder)
    }

    fn record(&self, feature: &CanonicalFeature) -> Record {
        let mut record = Record::default();
        for field in &self.fields {
            record.insert(field.name.clone(), field.value(feature));
        }
        record
    }
}

/// Longest prefix of at most `max` bytes that ends on a char boundary
fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

/// Signed ring area; negative means clockwise
fn signed_area(ring: &[Position]) -> f64 {
    ring.windows(2)
        .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
        .sum::<f64>()
        / 2.0
}

/// Convert GeoJSON rings (exterior counter-clockwise) to shapefile rings
/// (outer clockwise, holes counter-clockwise), closing each ring
fn to_shp_polygon(rings: &[Vec<Position>]) -> shp::Polygon {
    let shp_rings = rings
        .iter()
        .enumerate()
        .map(|(i, ring)| {
            let mut points: Vec<shp::Point> =
                ring.iter().map(|[x, y]| shp::Point::new(*x, *y)).collect();
            if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
                if first.x != last.x || first.y != last.y {
                    points.push(first);
                }
            }
            let area = signed_area(ring);
            if i == 0 {
                if area > 0.0 {
                    points.reverse();
                }
                shp::PolygonRing::Outer(points)
            } else {
                if area < 0.0 {
                    points.reverse();
                }
                shp::PolygonRing::Inner(points)
            }
        })
        .collect();
    shp::Polygon::with_rings(shp_rings)
}

/// Write one layer's `.shp`/`.shx`/`.dbf` next to `shp_path`
fn write_layer(shp_path: &Path, schema: &DbfSchema, features: &FeatureCollection) -> Result<()> {
    let mut writer = shp::Writer::from_path(shp_path, schema.table_builder()?)
        .with_context(|| format!("[export::shapefile] Failed to create {}", shp_path.display()))?;

    for feature in &features.features {
        let record = schema.record(feature);
        let written = match &feature.geometry {
            Geometry::Point {
                coordinates: [x, y],
            } => writer.write_shape_and_record(&shp::Point::new(*x, *y), &record),
            Geometry::Polygon { coordinates } => {
                writer.write_shape_and_record(&to_shp_polygon(coordinates), &record)
            }
        };
        written.context("[export::shapefile] Failed to write shape")?;
    }
    Ok(())
}

/// Build `<folder>.zip` holding one complete shapefile
fn shapefile_zip(layer: &ShapefileLayer, features: &FeatureCollection) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir().context("[export::shapefile] Failed to create temp directory")?;
    let shp_path = dir.path().join(format!("{}.shp", layer.folder));
    let schema = DbfSchema::for_layer(layer.layer, features);
    write_layer(&shp_path, &schema, features)?;

    let mut archive = ArchiveBuilder::new();
    for ext in ["shp", "shx", "dbf"] {
        let path = shp_path.with_extension(ext);
        let bytes = fs::read(&path)
            .with_context(|| format!("[export::shapefile] Failed to read {}", path.display()))?;
        archive.add_binary(format!("{}.{}", layer.folder, ext), bytes);
    }
    archive.add_text(format!("{}.prj", layer.folder), WGS84_PRJ);
    archive.add_text(format!("{}.cpg", layer.folder), "UTF-8");
    archive.finish()
}

fn readme(included: &[ShapefileLayer]) -> String {
    let mut text = String::from("Coffee Map Shapefile Export\n===========================\n\n");
    if included.is_empty() {
        text.push_str("No layers contained features to export.\n");
    } else {
        text.push_str("This archive contains one zipped shapefile per exported layer:\n\n");
        for layer in included {
            text.push_str(&format!("- {}.zip: {}\n", layer.folder, layer.description));
        }
        text.push_str("\nEach shapefile includes .shp, .shx, .dbf, .prj and .cpg files.\n");
    }
    text.push_str("Coordinate reference system: WGS 84 (EPSG:4326).\n");
    text
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileEncoder;

impl ShapefileEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureEncoder for ShapefileEncoder {
    fn encode(
        &self,
        features: &FeatureCollection,
        _selection: &LayerSelection,
    ) -> Result<ExportPayload> {
        let mut packages = Vec::new();
        for layer in LAYERS {
            let partition = features.partition(layer.layer);
            if partition.is_empty() {
                continue;
            }
            let bytes = shapefile_zip(&layer, &partition)
                .with_context(|| format!("Failed to build {}.zip", layer.folder))?;
            tracing::debug!(
                layer = %layer.layer,
                features = partition.len(),
                bytes = bytes.len(),
                "Wrote shapefile package"
            );
            packages.push((layer, bytes));
        }

        let included: Vec<ShapefileLayer> = packages.iter().map(|(layer, _)| *layer).collect();
        let mut archive = ArchiveBuilder::new();
        archive.add_text("README.txt", readme(&included));
        for (layer, bytes) in packages {
            archive.add_binary(format!("{}.zip", layer.folder), bytes);
        }

        Ok(ExportPayload::zip(archive.finish()?, SHAPEFILE_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CoffeeShop, FootTrafficPoint, LatLng, MapData, SearchRadius};
    use crate::domain::services::GeometryNormalizer;
    use crate::infrastructure::export::archive::tests::{names, read_bytes, read_text};
    use serde_json::json;

    fn radius_only() -> (FeatureCollection, LayerSelection) {
        let data = MapData {
            radius: Some(SearchRadius {
                center: LatLng::new(40.758, -73.9855),
                radius: 500.0,
            }),
            ..Default::default()
        };
        let selection = LayerSelection {
            radius: true,
            ..Default::default()
        };
        let features = GeometryNormalizer::default()
            .normalize(&data, &selection)
            .features;
        (features, selection)
    }

    #[test]
    fn test_radius_only_export() {
        let (features, selection) = radius_only();
        let payload = ShapefileEncoder.encode(&features, &selection).unwrap();

        assert_eq!(payload.content_type, "application/zip");
        assert_eq!(payload.filename, "coffee_map_export.zip");
        assert_eq!(names(&payload.bytes), vec!["README.txt", "boundaries.zip"]);

        let readme = read_text(&payload.bytes, "README.txt");
        assert!(readme.contains("boundaries.zip"));
        assert!(!readme.contains("coffee_shops.zip"));
        assert!(!readme.contains("foot_traffic.zip"));

        let inner = read_bytes(&payload.bytes, "boundaries.zip");
        assert_eq!(
            names(&inner),
            vec![
                "boundaries.shp",
                "boundaries.shx",
                "boundaries.dbf",
                "boundaries.prj",
                "boundaries.cpg"
            ]
        );
        assert_eq!(read_text(&inner, "boundaries.prj"), WGS84_PRJ);
    }

    #[test]
    fn test_boundary_polygon_has_64_vertices() {
        let (features, selection) = radius_only();
        let payload = ShapefileEncoder.encode(&features, &selection).unwrap();
        let inner = read_bytes(&payload.bytes, "boundaries.zip");

        let dir = tempfile::tempdir().unwrap();
        for ext in ["shp", "shx", "dbf"] {
            let name = format!("boundaries.{}", ext);
            fs::write(dir.path().join(&name), read_bytes(&inner, &name)).unwrap();
        }

        let polygons: Vec<shp::Polygon> =
            shp::read_shapes_as(dir.path().join("boundaries.shp")).unwrap();
        assert_eq!(polygons.len(), 1);
        let rings = polygons[0].rings();
        assert_eq!(rings.len(), 1);
        // closed ring: 64 vertices plus the repeated first one
        assert_eq!(rings[0].points().len(), 65);
    }

    #[test]
    fn test_point_layers_round_trip_through_reader() {
        let data = MapData {
            coffee_shops: vec![CoffeeShop {
                lat: Some(40.758),
                lng: Some(-73.9855),
                name: Some(json!("Joe's")),
                ..Default::default()
            }],
            foot_traffic: vec![FootTrafficPoint {
                lat: Some(40.75),
                lng: Some(-73.99),
                intensity: Some(0.2),
                count: Some(json!(5)),
                ..Default::default()
            }],
            radius: None,
        };
        let selection = LayerSelection {
            coffee_shops: true,
            foot_traffic: true,
            radius: true,
        };
        let features = GeometryNormalizer::default()
            .normalize(&data, &selection)
            .features;
        let payload = ShapefileEncoder.encode(&features, &selection).unwrap();
        assert_eq!(
            names(&payload.bytes),
            vec!["README.txt", "coffee_shops.zip", "foot_traffic.zip"]
        );

        let inner = read_bytes(&payload.bytes, "coffee_shops.zip");
        let dir = tempfile::tempdir().unwrap();
        for ext in ["shp", "shx", "dbf"] {
            let name = format!("coffee_shops.{}", ext);
            fs::write(dir.path().join(&name), read_bytes(&inner, &name)).unwrap();
        }
        let mut reader = shp::Reader::from_path(dir.path().join("coffee_shops.shp")).unwrap();
        let (shape, record) = reader.iter_shapes_and_records().next().unwrap().unwrap();

        match shape {
            shp::Shape::Point(point) => {
                assert_eq!(point.x, -73.9855);
                assert_eq!(point.y, 40.758);
            }
            _ => panic!("expected a point shape"),
        }
        match record.get("name") {
            Some(FieldValue::Character(Some(name))) => assert_eq!(name, "Joe's"),
            other => panic!("unexpected name field {:?}", other),
        }
    }

    #[test]
    fn test_empty_export_contains_only_readme() {
        let payload = ShapefileEncoder
            .encode(&FeatureCollection::default(), &LayerSelection::default())
            .unwrap();
        assert_eq!(names(&payload.bytes), vec!["README.txt"]);
    }

    #[test]
    fn test_outer_ring_is_clockwise() {
        let ccw = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
        let polygon = to_shp_polygon(&[ccw]);
        let ring: Vec<Position> = polygon.rings()[0]
            .points()
            .iter()
            .map(|p| [p.x, p.y])
            .collect();
        assert!(signed_area(&ring) < 0.0);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("from_street", 10), "from_stree");
        assert_eq!(truncate("café", 4), "caf");
        assert_eq!(truncate("short", 10), "short");
    }
}
