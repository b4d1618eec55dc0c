//! Core data models for the synthetic data producer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value reported by every status metric for a healthy device
pub const STATUS_OK: i64 = 1;

/// Identity shared by a metric definition and its samples
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub metric: String,
    pub parameter: Option<String>,
    pub entity: String,
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(parameter) => write!(f, "{}:{}@{}", self.metric, parameter, self.entity),
            None => write!(f, "{}@{}", self.metric, self.entity),
        }
    }
}

/// Metric schema entry emitted in schema mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub class: String,
}

impl MetricDefinition {
    pub fn key(&self) -> MetricKey {
        MetricKey {
            metric: self.metric.clone(),
            parameter: self.parameter.clone(),
            entity: self.entity.clone(),
        }
    }
}

/// Sampled value. Status metrics carry an integer, everything else a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Integer(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }
}

/// Metric value emitted in sample mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    pub entity: String,
    pub value: MetricValue,
}

impl MetricSample {
    pub fn key(&self) -> MetricKey {
        MetricKey {
            metric: self.metric.clone(),
            parameter: self.parameter.clone(),
            entity: self.entity.clone(),
        }
    }
}

/// Invocation mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Emit metric definitions (`--initialize`)
    Schema,
    /// Emit freshly sampled values
    Sample,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Schema => "schema",
            Mode::Sample => "sample",
        }
    }
}
