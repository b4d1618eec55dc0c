//! Synthetic metric producer library
//!
//! This crate provides the core functionality for:
//! - Entity catalogs (racks, nodes, switches) and their metric lists
//! - Schema generation and random sampling with derived metrics
//! - Structured run logging

pub mod catalog;
pub mod generator;
pub mod models;
pub mod observability;

pub use catalog::{Catalog, CatalogError};
pub use generator::Generator;
pub use models::*;
pub use observability::RunLogger;
