//! Entity catalog: monitored entities grouped by type, and the metrics
//! each group reports.
//!
//! A catalog is built once at process start, either from the built-in
//! tables or from an operator supplied file, and is never mutated after
//! validation.

mod builtin;


pub use builtin::{COMPUTE_NODES, INFRASTRUCTURE_NODES, RACKS, SWITCHES};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Errors raised while loading or validating a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("entity {0} appears more than once in the catalog")]
    DuplicateEntity(String),

    #[error("metric {metric} is declared more than once in the {group} group")]
    DuplicateMetric { group: GroupKind, metric: String },

    #[error("metric {metric} has an invalid range [{lo}, {hi}]")]
    InvalidRange { metric: String, lo: f64, hi: f64 },

    #[error("metric {metric} has a non-finite coefficient {value}")]
    InvalidCoefficient { metric: String, value: f64 },

    #[error("metric {metric} derives from {base}, which is not declared in the {group} group")]
    UnknownBase {
        group: GroupKind,
        metric: String,
        base: String,
    },

    #[error("metric {metric} derives from {base}, which is not a uniform metric")]
    DerivedBase { metric: String, base: String },

    #[error("metric {metric} overflows for some value of its base {base}")]
    DerivedOverflow { metric: String, base: String },

    #[error("failed to load catalog from {path}: {source}")]
    Load {
        path: String,
        source: config::ConfigError,
    },
}

/// Closed interval `[lo, hi]` a value is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub lo: f64,
    pub hi: f64,
}

impl ValueRange {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Finite bounds, `lo <= hi`, and a width the uniform sampler can
    /// represent without overflowing
    pub fn is_valid(&self) -> bool {
        let width = self.hi - self.lo;
        self.lo.is_finite()
            && self.hi.is_finite()
            && self.lo <= self.hi
            && width.is_finite()
            && width <= f64::MAX / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Draw a value uniformly from the closed interval
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.lo..=self.hi)
    }
}

/// Range for one named entity, taking precedence over the group default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeOverride {
    pub entity: String,
    pub lo: f64,
    pub hi: f64,
}

impl RangeOverride {
    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.lo, self.hi)
    }
}

/// Per-entity ranges with a group-wide fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    pub default: ValueRange,
    #[serde(default)]
    pub overrides: Vec<RangeOverride>,
}

impl RangeTable {
    pub fn uniform(lo: f64, hi: f64) -> Self {
        Self {
            default: ValueRange::new(lo, hi),
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, entity: impl Into<String>, lo: f64, hi: f64) -> Self {
        self.overrides.push(RangeOverride {
            entity: entity.into(),
            lo,
            hi,
        });
        self
    }

    /// Range for `entity`: its own override if present, else the default
    pub fn for_entity(&self, entity: &str) -> ValueRange {
        self.overrides
            .iter()
            .find(|o| o.entity == entity)
            .map(RangeOverride::range)
            .unwrap_or(self.default)
    }

    fn ranges(&self) -> impl Iterator<Item = ValueRange> + '_ {
        std::iter::once(self.default).chain(self.overrides.iter().map(RangeOverride::range))
    }
}

/// Reference to another metric of the same group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricRef {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl MetricRef {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            parameter: None,
        }
    }

    pub fn with_parameter(metric: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            parameter: Some(parameter.into()),
        }
    }
}

impl std::fmt::Display for MetricRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parameter {
            Some(parameter) => write!(f, "{}:{}", self.metric, parameter),
            None => f.write_str(&self.metric),
        }
    }
}

/// How a metric's value is produced in sample mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSource {
    /// Drawn from the entity's range
    Uniform(RangeTable),
    /// `total - base`, e.g. idle as the complement of utilization
    Complement { base: MetricRef, total: f64 },
    /// `base * fraction`, e.g. a sub-component share of total power
    Fraction { base: MetricRef, fraction: f64 },
    /// `base / 100 * capacity`, turning a percentage into an absolute amount
    Capacity { base: MetricRef, capacity: f64 },
    /// Always-healthy status sentinel
    Status,
}

impl ValueSource {
    /// Base metric and arithmetic of a derived source
    pub fn derivation(&self) -> Option<(&MetricRef, Derivation)> {
        match self {
            ValueSource::Complement { base, total } => Some((base, Derivation::Complement(*total))),
            ValueSource::Fraction { base, fraction } => {
                Some((base, Derivation::Fraction(*fraction)))
            }
            ValueSource::Capacity { base, capacity } => {
                Some((base, Derivation::Capacity(*capacity)))
            }
            ValueSource::Uniform(_) | ValueSource::Status => None,
        }
    }
}

/// Arithmetic applied to a drawn base value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derivation {
    Complement(f64),
    Fraction(f64),
    Capacity(f64),
}

impl Derivation {
    pub fn apply(&self, base: f64) -> f64 {
        match *self {
            Derivation::Complement(total) => total - base,
            Derivation::Fraction(fraction) => base * fraction,
            Derivation::Capacity(capacity) => base / 100.0 * capacity,
        }
    }

    pub fn coefficient(&self) -> f64 {
        match *self {
            Derivation::Complement(value)
            | Derivation::Fraction(value)
            | Derivation::Capacity(value) => value,
        }
    }
}

/// One metric reported by every entity of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub class: String,
    pub source: ValueSource,
}

impl MetricSpec {
    pub fn new(metric: impl Into<String>, class: impl Into<String>, source: ValueSource) -> Self {
        Self {
            metric: metric.into(),
            parameter: None,
            unit: None,
            class: class.into(),
            source,
        }
    }

    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn matches(&self, reference: &MetricRef) -> bool {
        self.metric == reference.metric && self.parameter == reference.parameter
    }

    pub fn reference(&self) -> MetricRef {
        MetricRef {
            metric: self.metric.clone(),
            parameter: self.parameter.clone(),
        }
    }
}

/// Kind of monitored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Rack,
    ComputeNode,
    InfrastructureNode,
    Switch,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Rack => "rack",
            GroupKind::ComputeNode => "compute_node",
            GroupKind::InfrastructureNode => "infrastructure_node",
            GroupKind::Switch => "switch",
        }
    }
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities of one kind sharing a metric list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityGroup {
    pub kind: GroupKind,
    pub entities: Vec<String>,
    pub metrics: Vec<MetricSpec>,
}

impl EntityGroup {
    pub fn new<I, S>(kind: GroupKind, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            entities: entities.into_iter().map(Into::into).collect(),
            metrics: Vec::new(),
        }
    }

    pub fn metric(mut self, spec: MetricSpec) -> Self {
        self.metrics.push(spec);
        self
    }

    /// Index and ranges of the uniform metric `reference` points at
    pub fn resolve_base(
        &self,
        spec: &MetricSpec,
        reference: &MetricRef,
    ) -> Result<(usize, &RangeTable), CatalogError> {
        let index = self
            .metrics
            .iter()
            .position(|m| m.matches(reference))
            .ok_or_else(|| CatalogError::UnknownBase {
                group: self.kind,
                metric: spec.reference().to_string(),
                base: reference.to_string(),
            })?;

        match &self.metrics[index].source {
            ValueSource::Uniform(table) => Ok((index, table)),
            _ => Err(CatalogError::DerivedBase {
                metric: spec.reference().to_string(),
                base: reference.to_string(),
            }),
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();

        for spec in &self.metrics {
            if !seen.insert(spec.reference()) {
                return Err(CatalogError::DuplicateMetric {
                    group: self.kind,
                    metric: spec.reference().to_string(),
                });
            }

            if let ValueSource::Uniform(table) = &spec.source {
                if let Some(bad) = table.ranges().find(|r| !r.is_valid()) {
                    return Err(CatalogError::InvalidRange {
                        metric: spec.reference().to_string(),
                        lo: bad.lo,
                        hi: bad.hi,
                    });
                }
            }
        }

        // Ranges are known valid here, so derived checks see finite bases
        for spec in &self.metrics {
            let Some((base, derivation)) = spec.source.derivation() else {
                continue;
            };

            let value = derivation.coefficient();
            if !value.is_finite() {
                return Err(CatalogError::InvalidCoefficient {
                    metric: spec.reference().to_string(),
                    value,
                });
            }

            // Derivations are monotonic, so range endpoints bound the result
            let (_, table) = self.resolve_base(spec, base)?;
            let overflows = table.ranges().any(|range| {
                !derivation.apply(range.lo).is_finite() || !derivation.apply(range.hi).is_finite()
            });
            if overflows {
                return Err(CatalogError::DerivedOverflow {
                    metric: spec.reference().to_string(),
                    base: base.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Ordered entity groups; output follows group, entity, then metric order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub groups: Vec<EntityGroup>,
}

impl Catalog {
    pub fn new(groups: Vec<EntityGroup>) -> Self {
        Self { groups }
    }

    /// Load a catalog file (TOML, JSON or YAML, chosen by extension) and
    /// validate it
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let load_error = |source| CatalogError::Load {
            path: path.display().to_string(),
            source,
        };

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(load_error)?;
        let catalog: Catalog = settings.try_deserialize().map_err(load_error)?;

        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject catalogs whose schema and samples could not line up
    ///
    /// Entity names must be unique across the whole catalog, so a triple
    /// never belongs to two groups.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut entities = HashSet::new();
        for group in &self.groups {
            for entity in &group.entities {
                if !entities.insert(entity.as_str()) {
                    return Err(CatalogError::DuplicateEntity(entity.clone()));
                }
            }
            group.validate()?;
        }
        Ok(())
    }

    pub fn entity_count(&self) -> usize {
        self.groups.iter().map(|g| g.entities.len()).sum()
    }

    /// Number of records either mode emits
    pub fn record_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.entities.len() * g.metrics.len())
            .sum()
    }
}
