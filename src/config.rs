use std::fmt;

use serde::Deserialize;

use crate::data::{resolve_rescale, CatCols, Rescale};
use crate::error::{MfeError, Result};
use crate::groups::Group;
use crate::options::{collect_names, process_generic_option, process_generic_set, WILDCARD};
use crate::scoring::Score;
use crate::summary::{resolve_summary, Summary};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Timing modes
// ---------------------------------------------------------------------------

/// How elapsed time is reported next to each extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOpt {
    /// Computation time divided by the number of values the feature produced.
    Avg,
    /// `Avg` plus the time of the summary that produced the value.
    AvgSumm,
    /// Total computation time of the feature.
    Total,
    /// `Total` plus the time of the summary that produced the value.
    TotalSumm,
}

impl TimeOpt {
    pub const ALL: [TimeOpt; 4] = [TimeOpt::Avg, TimeOpt::AvgSumm, TimeOpt::Total, TimeOpt::TotalSumm];

    pub fn name(self) -> &'static str {
        match self {
            TimeOpt::Avg => "avg",
            TimeOpt::AvgSumm => "avg_summ",
            TimeOpt::Total => "total",
            TimeOpt::TotalSumm => "total_summ",
        }
    }

    pub fn from_name(name: &str) -> Option<TimeOpt> {
        TimeOpt::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn includes_summary(self) -> bool {
        matches!(self, TimeOpt::AvgSumm | TimeOpt::TotalSumm)
    }
}

impl fmt::Display for TimeOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Construction options
// ---------------------------------------------------------------------------

/// Raw construction options.
///
/// Omitted fields take their defaults; a field explicitly set to `None`
/// is checked like any other value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MfeOptions {
    /// Metafeature groups: a group name, a list of names, or `"all"`.
    pub groups: Value,
    /// Metafeature names: a name, a list of names, or `"all"`.
    pub features: Value,
    /// Summary functions for vector-valued metafeatures.
    pub summary: Value,
    /// Scoring function for landmarking.
    pub score: Value,
    /// Seed for every random choice; entropy-seeded when `None`.
    pub random_state: Value,
    /// Number of cross-validation folds for landmarking.
    pub folds: Value,
    /// Timing mode, or `None` to skip timing.
    pub measure_time: Value,
    /// Fraction of instances sampled for landmarking.
    pub lm_sample_frac: Value,
}

impl Default for MfeOptions {
    fn default() -> Self {
        Self {
            groups: Value::from(WILDCARD),
            features: Value::from(WILDCARD),
            summary: Value::from(["mean", "sd"]),
            score: Value::from("accuracy"),
            random_state: Value::None,
            folds: Value::from(10),
            measure_time: Value::None,
            lm_sample_frac: Value::from(1.0),
        }
    }
}

impl MfeOptions {
    /// Parse options from JSON. Unknown fields and malformed documents are
    /// type errors.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MfeError::type_error("options", e.to_string()))
    }

    pub fn with_groups(mut self, groups: impl Into<Value>) -> Self {
        self.groups = groups.into();
        self
    }

    pub fn with_features(mut self, features: impl Into<Value>) -> Self {
        self.features = features.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<Value>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_score(mut self, score: impl Into<Value>) -> Self {
        self.score = score.into();
        self
    }

    pub fn with_random_state(mut self, random_state: impl Into<Value>) -> Self {
        self.random_state = random_state.into();
        self
    }

    pub fn with_folds(mut self, folds: impl Into<Value>) -> Self {
        self.folds = folds.into();
        self
    }

    pub fn with_measure_time(mut self, measure_time: impl Into<Value>) -> Self {
        self.measure_time = measure_time.into();
        self
    }

    pub fn with_lm_sample_frac(mut self, frac: impl Into<Value>) -> Self {
        self.lm_sample_frac = frac.into();
        self
    }
}

/// Which metafeatures were asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSelection {
    /// Every metafeature of the selected groups.
    All,
    /// Named metafeatures (lowercase, first-seen order).
    Named(Vec<String>),
}

/// Validated construction options.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub groups: Vec<Group>,
    pub features: FeatureSelection,
    pub summary: Vec<Summary>,
    pub score: Score,
    pub random_state: Option<u64>,
    pub folds: usize,
    pub measure_time: Option<TimeOpt>,
    pub lm_sample_frac: f64,
}

impl Config {
    /// Check every option. Kind checks run before membership checks for the
    /// same option, so a wrong kind is never reported as an unknown value.
    pub fn from_options(options: &MfeOptions) -> Result<Self> {
        let groups = process_generic_set(&options.groups, Some("groups"), false, false)?
            .iter()
            .filter_map(|name| Group::from_name(name))
            .collect();

        let config = Config {
            groups,
            features: resolve_features(&options.features)?,
            summary: resolve_summary(&options.summary)?,
            score: resolve_score(&options.score)?,
            random_state: resolve_random_state(&options.random_state)?,
            folds: resolve_folds(&options.folds)?,
            measure_time: process_generic_option(&options.measure_time, Some("timeopt"), true, false)?
                .as_deref()
                .and_then(TimeOpt::from_name),
            lm_sample_frac: resolve_lm_sample_frac(&options.lm_sample_frac)?,
        };

        log::debug!("validated configuration: {config:?}");
        Ok(config)
    }
}

fn resolve_features(value: &Value) -> Result<FeatureSelection> {
    if value.is_none() {
        return Err(MfeError::value_error("features", "can not be None"));
    }
    if value.is_blank() {
        return Err(MfeError::value_error("features", "can not be empty"));
    }
    let names = collect_names(value, "features")?;
    if names.iter().any(|n| n == WILDCARD) {
        if names.len() == 1 {
            return Ok(FeatureSelection::All);
        }
        return Err(MfeError::value_error(
            "features",
            format!("'{WILDCARD}' can not be combined with other values"),
        ));
    }
    Ok(FeatureSelection::Named(names))
}

fn resolve_score(value: &Value) -> Result<Score> {
    if value.is_none() {
        return Err(MfeError::value_error("score", "can not be None"));
    }
    if value.is_blank() {
        return Err(MfeError::value_error("score", "can not be empty"));
    }
    let name = process_generic_option(value, Some("score"), false, false)?;
    name.as_deref()
        .and_then(Score::from_name)
        .ok_or_else(|| MfeError::value_error("score", "can not be empty"))
}

/// Integer check shared by the integral options: fractional numbers are
/// value errors, non-numbers type errors.
fn integral(value: &Value, param: &str) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Err(MfeError::value_error(
            param,
            format!("must be an integer, got {f}"),
        )),
        Value::None => Err(MfeError::value_error(param, "can not be None")),
        other => Err(MfeError::type_error(
            param,
            format!("expected an integer, got {}", other.kind_name()),
        )),
    }
}

fn resolve_random_state(value: &Value) -> Result<Option<u64>> {
    if value.is_none() {
        return Ok(None);
    }
    let seed = integral(value, "random_state")?;
    u64::try_from(seed)
        .map(Some)
        .map_err(|_| MfeError::value_error("random_state", format!("must be >= 0, got {seed}")))
}

fn resolve_folds(value: &Value) -> Result<usize> {
    let folds = integral(value, "folds")?;
    if folds < 2 {
        return Err(MfeError::value_error(
            "folds",
            format!("must be >= 2, got {folds}"),
        ));
    }
    Ok(folds as usize)
}

fn resolve_lm_sample_frac(value: &Value) -> Result<f64> {
    let frac = match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::None => return Err(MfeError::value_error("lm_sample_frac", "can not be None")),
        other => {
            return Err(MfeError::type_error(
                "lm_sample_frac",
                format!("expected a number, got {}", other.kind_name()),
            ))
        }
    };
    if !(frac > 0.0 && frac <= 1.0) {
        return Err(MfeError::value_error(
            "lm_sample_frac",
            format!("must be in (0, 1], got {frac}"),
        ));
    }
    Ok(frac)
}

// ---------------------------------------------------------------------------
// Fit options
// ---------------------------------------------------------------------------

/// Raw options given when binding data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitOptions {
    /// Categorical column indices; `None` infers them from the cell kinds.
    pub cat_cols: Value,
    /// Rescaling of numeric attributes, or `None`.
    pub rescale: Value,
    /// Groups whose shared values are computed at fit time.
    pub precomp_groups: Value,
    /// Discretize numeric attributes for the info-theory group.
    pub transform_num: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            cat_cols: Value::None,
            rescale: Value::None,
            precomp_groups: Value::from(WILDCARD),
            transform_num: true,
        }
    }
}

impl FitOptions {
    pub fn with_cat_cols(mut self, cat_cols: impl Into<Value>) -> Self {
        self.cat_cols = cat_cols.into();
        self
    }

    pub fn with_rescale(mut self, rescale: impl Into<Value>) -> Self {
        self.rescale = rescale.into();
        self
    }

    pub fn with_precomp_groups(mut self, groups: impl Into<Value>) -> Self {
        self.precomp_groups = groups.into();
        self
    }

    pub fn with_transform_num(mut self, transform_num: bool) -> Self {
        self.transform_num = transform_num;
        self
    }
}

/// Validated fit options (precomputation groups are resolved by the
/// extractor, which knows the active groups).
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub cat_cols: CatCols,
    pub rescale: Option<Rescale>,
    pub transform_num: bool,
}

impl FitConfig {
    pub fn from_options(options: &FitOptions) -> Result<Self> {
        Ok(FitConfig {
            cat_cols: CatCols::resolve(&options.cat_cols)?,
            rescale: resolve_rescale(&options.rescale)?,
            transform_num: options.transform_num,
        })
    }
}
