//! Data Transfer Objects - For API boundaries

pub mod export;

pub use export::*;
