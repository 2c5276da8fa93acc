//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for the external store holding the incident report table.

pub mod row_source;
