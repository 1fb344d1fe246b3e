use std::collections::BTreeMap;

use crate::data::Dataset;
use crate::error::{MfeError, Result};
use crate::groups::Group;
use crate::precompute::{
    GeneralData, GroupData, InfoTheoryData, LandmarkingData, ModelBasedData, StatisticalData,
};
use crate::value::Value;

mod general;
mod info_theory;
mod landmarking;
mod model_based;
mod statistical;

/// Shape of a metafeature's raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A single value, reported as is.
    Scalar,
    /// One value per attribute, fold, node, ...; summarized.
    Vector,
}

/// Computation routine, typed by the group data it consumes.
#[derive(Clone, Copy)]
pub enum Compute {
    General(fn(&Dataset, &GeneralData, &FeatureArgs) -> Result<Vec<f64>>),
    Statistical(fn(&StatisticalData, &FeatureArgs) -> Result<Vec<f64>>),
    InfoTheory(fn(&InfoTheoryData, &FeatureArgs) -> Result<Vec<f64>>),
    ModelBased(fn(&ModelBasedData, &FeatureArgs) -> Result<Vec<f64>>),
    Landmarking(fn(&LandmarkingData, &FeatureArgs) -> Result<Vec<f64>>),
}

#[derive(Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub group: Group,
    pub description: &'static str,
    /// Keyword arguments the routine consumes.
    pub params: &'static [&'static str],
    pub kind: OutputKind,
    pub compute: Compute,
}

impl std::fmt::Debug for FeatureSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureSpec")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("params", &self.params)
            .field("kind", &self.kind)
            .finish()
    }
}

impl FeatureSpec {
    /// Run the routine on the data precomputed for this feature's group.
    pub fn run(&self, dataset: &Dataset, data: &GroupData, args: &FeatureArgs) -> Result<Vec<f64>> {
        match (self.compute, data) {
            (Compute::General(f), GroupData::General(d)) => f(dataset, d, args),
            (Compute::Statistical(f), GroupData::Statistical(d)) => f(d, args),
            (Compute::InfoTheory(f), GroupData::InfoTheory(d)) => f(d, args),
            (Compute::ModelBased(f), GroupData::ModelBased(d)) => f(d, args),
            (Compute::Landmarking(f), GroupData::Landmarking(d)) => f(d, args),
            _ => unreachable!("'{}' dispatched with data of another group", self.name),
        }
    }
}

/// All metafeatures, grouped and sorted by name within each group.
pub fn registry() -> impl Iterator<Item = &'static FeatureSpec> {
    general::FEATURES
        .iter()
        .chain(statistical::FEATURES)
        .chain(info_theory::FEATURES)
        .chain(model_based::FEATURES)
        .chain(landmarking::FEATURES)
}

pub fn lookup(name: &str) -> Option<&'static FeatureSpec> {
    registry().find(|f| f.name == name)
}

pub fn features_of(group: Group) -> impl Iterator<Item = &'static FeatureSpec> {
    registry().filter(move |f| f.group == group)
}

// ---------------------------------------------------------------------------
// Keyword arguments
// ---------------------------------------------------------------------------

/// Keyword arguments handed to one metafeature.
#[derive(Debug, Clone, Default)]
pub struct FeatureArgs {
    feature: &'static str,
    values: BTreeMap<String, Value>,
}

impl FeatureArgs {
    pub fn new(feature: &'static str, values: BTreeMap<String, Value>) -> Self {
        Self { feature, values }
    }

    fn param(&self, key: &str) -> String {
        format!("{}.{key}", self.feature)
    }

    /// A non-negative integer argument.
    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize> {
        match self.values.get(key) {
            None => Ok(default),
            Some(Value::Int(i)) => usize::try_from(*i).map_err(|_| {
                MfeError::value_error(self.param(key), format!("must be >= 0, got {i}"))
            }),
            Some(other) => Err(MfeError::type_error(
                self.param(key),
                format!("expected an integer, got {}", other.kind_name()),
            )),
        }
    }

    /// A numeric argument checked against `valid`.
    pub fn f64_or(&self, key: &str, default: f64, valid: impl Fn(f64) -> bool) -> Result<f64> {
        let v = match self.values.get(key) {
            None => return Ok(default),
            Some(Value::Int(i)) => *i as f64,
            Some(Value::Float(f)) => *f,
            Some(other) => {
                return Err(MfeError::type_error(
                    self.param(key),
                    format!("expected a number, got {}", other.kind_name()),
                ))
            }
        };
        if !valid(v) {
            return Err(MfeError::value_error(
                self.param(key),
                format!("value {v} out of range"),
            ));
        }
        Ok(v)
    }
}
