//! Application services - Use case implementations

pub mod export_service;

pub use export_service::{Encoders, ExportError, ExportOutcome, ExportService};
