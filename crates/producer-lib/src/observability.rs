//! Structured logging for producer runs
//!
//! Standard output carries only the JSON document, so every event here
//! is meant for a subscriber writing to standard error.

use crate::models::Mode;
use tracing::{info, warn};

/// Structured logger for producer events
///
/// Keeps the catalog source attached to every event so runs against
/// different catalog files can be told apart.
#[derive(Clone)]
pub struct RunLogger {
    catalog_source: String,
}

impl RunLogger {
    pub fn new(catalog_source: impl Into<String>) -> Self {
        Self {
            catalog_source: catalog_source.into(),
        }
    }

    pub fn catalog_source(&self) -> &str {
        &self.catalog_source
    }

    /// Log producer startup
    pub fn log_startup(&self, version: &str, mode: Mode) {
        info!(
            event = "producer_started",
            catalog = %self.catalog_source,
            producer_version = %version,
            mode = mode.as_str(),
            "Synthetic data producer started"
        );
    }

    /// Log a loaded and validated catalog
    pub fn log_catalog(&self, groups: usize, entities: usize, records: usize) {
        info!(
            event = "catalog_loaded",
            catalog = %self.catalog_source,
            groups = groups,
            entities = entities,
            records = records,
            "Catalog validated"
        );
    }

    /// Log arguments that did not parse and the mode chosen instead
    pub fn log_argument_fallback(&self, details: &str, mode: Mode) {
        warn!(
            event = "argument_fallback",
            catalog = %self.catalog_source,
            details = %details,
            mode = mode.as_str(),
            "Unrecognized arguments, falling back to flag scan"
        );
    }

    /// Log the emitted document
    pub fn log_emitted(&self, mode: Mode, records: usize) {
        info!(
            event = "document_emitted",
            catalog = %self.catalog_source,
            mode = mode.as_str(),
            records = records,
            "Metric document written to stdout"
        );
    }
}
