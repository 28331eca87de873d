//! Application layer - Export use case, DTOs and encoder ports

pub mod dto;
pub mod ports;
pub mod services;
