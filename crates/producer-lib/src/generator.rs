//! Schema and sample generation
//!
//! `describe` and `sample` walk the same catalog in the same order, so
//! both emit exactly one record per (metric, parameter, entity) triple.
//! Derived metrics are resolved up front into a per-group plan: every
//! uniform metric is drawn once per entity into a slot, and dependents
//! read that slot instead of drawing again.

use crate::catalog::{Catalog, CatalogError, Derivation, EntityGroup, RangeTable, ValueSource};
use crate::models::{MetricDefinition, MetricSample, MetricValue, STATUS_OK};
use rand::Rng;

/// How one metric of a group gets its value
#[derive(Debug, Clone, Copy)]
enum Step {
    Draw { slot: usize },
    Derived { slot: usize, derivation: Derivation },
    Status,
}

impl Step {
    fn value(&self, draws: &[f64]) -> MetricValue {
        match *self {
            Step::Draw { slot } => MetricValue::Float(draws[slot]),
            Step::Derived { slot, derivation } => MetricValue::Float(derivation.apply(draws[slot])),
            Step::Status => MetricValue::Integer(STATUS_OK),
        }
    }
}

#[derive(Debug, Clone)]
struct GroupPlan {
    /// Range table of each drawn slot, in metric order
    draws: Vec<RangeTable>,
    /// One step per metric, in metric order
    steps: Vec<Step>,
}

impl GroupPlan {
    fn build(group: &EntityGroup) -> Result<Self, CatalogError> {
        let draws: Vec<RangeTable> = group
            .metrics
            .iter()
            .filter_map(|spec| match &spec.source {
                ValueSource::Uniform(table) => Some(table.clone()),
                _ => None,
            })
            .collect();

        // Slot of a uniform metric: how many uniform metrics precede it
        let slot = |index: usize| {
            group.metrics[..index]
                .iter()
                .filter(|spec| matches!(spec.source, ValueSource::Uniform(_)))
                .count()
        };

        let steps = group
            .metrics
            .iter()
            .enumerate()
            .map(|(index, spec)| -> Result<Step, CatalogError> {
                if let Some((base, derivation)) = spec.source.derivation() {
                    let (base_index, _) = group.resolve_base(spec, base)?;
                    return Ok(Step::Derived {
                        slot: slot(base_index),
                        derivation,
                    });
                }
                Ok(match &spec.source {
                    ValueSource::Uniform(_) => Step::Draw { slot: slot(index) },
                    _ => Step::Status,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { draws, steps })
    }
}

/// Metric generator over a validated catalog
#[derive(Debug, Clone)]
pub struct Generator {
    catalog: Catalog,
    plans: Vec<GroupPlan>,
}

impl Generator {
    /// Validate `catalog` and resolve its derived metrics
    pub fn new(catalog: Catalog) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let plans = catalog
            .groups
            .iter()
            .map(GroupPlan::build)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            groups = catalog.groups.len(),
            entities = catalog.entity_count(),
            records = catalog.record_count(),
            "Generator ready"
        );

        Ok(Self { catalog, plans })
    }

    /// Generator over the compiled-in catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(Catalog::builtin())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Metric definitions in catalog order
    pub fn describe(&self) -> Vec<MetricDefinition> {
        let mut definitions = Vec::with_capacity(self.catalog.record_count());

        for group in &self.catalog.groups {
            for entity in &group.entities {
                definitions.extend(group.metrics.iter().map(|spec| MetricDefinition {
                    metric: spec.metric.clone(),
                    parameter: spec.parameter.clone(),
                    entity: entity.clone(),
                    unit: spec.unit.clone(),
                    class: spec.class.clone(),
                }));
            }
        }

        definitions
    }

    /// Fresh samples from the thread-local random source
    pub fn sample(&self) -> Vec<MetricSample> {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Samples in `describe` order, drawing from `rng`
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<MetricSample> {
        let mut samples = Vec::with_capacity(self.catalog.record_count());

        for (group, plan) in self.catalog.groups.iter().zip(&self.plans) {
            for entity in &group.entities {
                let draws: Vec<f64> = plan
                    .draws
                    .iter()
                    .map(|table| table.for_entity(entity).sample(&mut *rng))
                    .collect();

                samples.extend(group.metrics.iter().zip(&plan.steps).map(|(spec, step)| {
                    MetricSample {
                        metric: spec.metric.clone(),
                        parameter: spec.parameter.clone(),
                        entity: entity.clone(),
                        value: step.value(&draws),
                    }
                }));
            }
        }

        samples
    }
}
