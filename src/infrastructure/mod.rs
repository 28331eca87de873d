//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Export: Shapefile, geodatabase and CSV encoders
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod export;
pub mod http;
pub mod state;
