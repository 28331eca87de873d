//! Requested download format

/// Output format of an export request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Zipped shapefile package (`.shp`)
    Shapefile,
    /// Simplified GeoJSON-based geodatabase folder (`.gdb`)
    Geodatabase,
    /// Single CSV or zipped per-layer CSVs (`.csv`)
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Shapefile => ".shp",
            ExportFormat::Geodatabase => ".gdb",
            ExportFormat::Csv => ".csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Error returned for a format string outside `.shp`, `.gdb` and `.csv`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Format {0} is not currently supported for server-side export.")]
pub struct UnsupportedFormat(pub String);

impl std::str::FromStr for ExportFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ".shp" => Ok(ExportFormat::Shapefile),
            ".gdb" => Ok(ExportFormat::Geodatabase),
            ".csv" => Ok(ExportFormat::Csv),
            other => Err(UnsupportedFormat(other.to_string())),
        }
    }
}
