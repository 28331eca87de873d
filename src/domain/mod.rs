//! Domain layer - Map records, canonical features and geometry rules
//!
//! This layer contains:
//! - Entities: map layer records, canonical features and collections
//! - Value Objects: layer types, layer selection, export formats, intensity tiers
//! - Domain Services: geometry normalization and geodesic circle sampling

pub mod entities;
pub mod services;
pub mod value_objects;
