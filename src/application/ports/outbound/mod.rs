//! Outbound ports - Interfaces that the application requires from format adapters

mod encoder_port;

pub use encoder_port::{ExportPayload, FeatureEncoder};
