use std::fmt;

use crate::error::Result;
use crate::options::{check_in_whitelist, collect_names};
use crate::value::Value;

const HISTOGRAM_BINS: usize = 10;
const QUANTILE_PROBS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary {
    Count,
    Histogram,
    IqRange,
    Kurtosis,
    Max,
    Mean,
    Median,
    Min,
    Quantiles,
    Range,
    Sd,
    Skewness,
    Sum,
    Var,
}

impl Summary {
    pub const ALL: [Summary; 14] = [
        Summary::Count,
        Summary::Histogram,
        Summary::IqRange,
        Summary::Kurtosis,
        Summary::Max,
        Summary::Mean,
        Summary::Median,
        Summary::Min,
        Summary::Quantiles,
        Summary::Range,
        Summary::Sd,
        Summary::Skewness,
        Summary::Sum,
        Summary::Var,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Summary::Count => "count",
            Summary::Histogram => "histogram",
            Summary::IqRange => "iq_range",
            Summary::Kurtosis => "kurtosis",
            Summary::Max => "max",
            Summary::Mean => "mean",
            Summary::Median => "median",
            Summary::Min => "min",
            Summary::Quantiles => "quantiles",
            Summary::Range => "range",
            Summary::Sd => "sd",
            Summary::Skewness => "skewness",
            Summary::Sum => "sum",
            Summary::Var => "var",
        }
    }

    pub fn from_name(name: &str) -> Option<Summary> {
        let lowered = name.to_ascii_lowercase();
        Summary::ALL.into_iter().find(|s| s.name() == lowered)
    }

    /// Whether the summary produces more than one value.
    pub fn is_multi_valued(self) -> bool {
        matches!(self, Summary::Histogram | Summary::Quantiles)
    }

    pub fn apply(self, values: &[f64]) -> Vec<f64> {
        match self {
            Summary::Count => vec![values.len() as f64],
            Summary::Histogram => histogram(values, HISTOGRAM_BINS),
            Summary::IqRange => vec![quantile(values, 0.75) - quantile(values, 0.25)],
            Summary::Kurtosis => vec![kurtosis(values)],
            Summary::Max => vec![quantile(values, 1.0)],
            Summary::Mean => vec![mean(values)],
            Summary::Median => vec![quantile(values, 0.5)],
            Summary::Min => vec![quantile(values, 0.0)],
            Summary::Quantiles => QUANTILE_PROBS.iter().map(|&p| quantile(values, p)).collect(),
            Summary::Range => vec![quantile(values, 1.0) - quantile(values, 0.0)],
            Summary::Sd => vec![var(values, 1).sqrt()],
            Summary::Skewness => vec![skewness(values)],
            Summary::Sum => vec![values.iter().sum()],
            Summary::Var => vec![var(values, 1)],
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the `summary` selector. `None` and empty selections mean "keep
/// raw values"; `"all"` selects every summary function.
pub fn resolve_summary(value: &Value) -> Result<Vec<Summary>> {
    if value.is_none() || value.is_blank() {
        return Ok(Vec::new());
    }
    let names = collect_names(value, "summary")?;
    let valid: Vec<&'static str> = Summary::ALL.iter().map(|s| s.name()).collect();
    let selected = check_in_whitelist(names, "summary", &valid, true)?;
    Ok(selected.into_iter().filter_map(Summary::from_name).collect())
}

// ---------------------------------------------------------------------------
// Descriptive statistics shared with the statistical metafeatures
// ---------------------------------------------------------------------------

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with `ddof` delta degrees of freedom. NaN when `len <= ddof`.
pub(crate) fn var(values: &[f64], ddof: usize) -> f64 {
    if values.len() <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - ddof) as f64
}

/// Linear-interpolated quantile, `p` in [0, 1].
pub(crate) fn quantile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Biased sample skewness.
pub(crate) fn skewness(values: &[f64]) -> f64 {
    let m2 = var(values, 0);
    if m2.is_nan() || m2 <= 0.0 {
        return f64::NAN;
    }
    let m = mean(values);
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / values.len() as f64;
    m3 / m2.powf(1.5)
}

/// Biased excess (Fisher) kurtosis.
pub(crate) fn kurtosis(values: &[f64]) -> f64 {
    let m2 = var(values, 0);
    if m2.is_nan() || m2 <= 0.0 {
        return f64::NAN;
    }
    let m = mean(values);
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / values.len() as f64;
    m4 / (m2 * m2) - 3.0
}

/// Proportion of values in each of `bins` equal-width bins over [min, max].
fn histogram(values: &[f64], bins: usize) -> Vec<f64> {
    if values.is_empty() {
        return vec![f64::NAN; bins];
    }
    let lo = quantile(values, 0.0);
    let hi = quantile(values, 1.0);
    let mut counts = vec![0.0; bins];
    let width = (hi - lo) / bins as f64;
    for &v in values {
        let idx = if width > 0.0 {
            (((v - lo) / width) as usize).min(bins - 1)
        } else {
            bins / 2
        };
        counts[idx] += 1.0;
    }
    let n = values.len() as f64;
    counts.iter().map(|c| c / n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolve_defaults_and_wildcard() {
        let got = resolve_summary(&Value::from(["sd", "mean"])).unwrap();
        assert_eq!(got, vec![Summary::Mean, Summary::Sd]);
        assert_eq!(resolve_summary(&Value::from("all")).unwrap().len(), Summary::ALL.len());
        assert!(resolve_summary(&Value::None).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        for name in ["meanmean", "invalid"] {
            assert!(resolve_summary(&Value::from(name)).unwrap_err().is_value_error());
        }
        assert!(resolve_summary(&Value::from(3)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_basic_statistics() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(&v), 2.5);
        assert_relative_eq!(var(&v, 1), 5.0 / 3.0);
        assert_relative_eq!(quantile(&v, 0.5), 2.5);
        assert_relative_eq!(Summary::IqRange.apply(&v)[0], 1.5);
        assert_relative_eq!(skewness(&v), 0.0);
    }

    #[test]
    fn test_histogram_sums_to_one() {
        let h = Summary::Histogram.apply(&[0.0, 1.0, 2.0, 3.0, 10.0]);
        assert_eq!(h.len(), HISTOGRAM_BINS);
        assert_relative_eq!(h.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(Summary::Mean.apply(&[])[0].is_nan());
        assert_eq!(Summary::Count.apply(&[]), vec![0.0]);
        assert_eq!(Summary::Quantiles.apply(&[]).len(), 5);
    }
}
