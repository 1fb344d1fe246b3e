use std::fmt;

use super::model::Dataset;
use crate::error::Result;
use crate::options::process_generic_option;
use crate::summary::{mean, quantile, var};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Rescaling of numeric attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    /// Zero mean, unit variance.
    Standard,
    /// Map onto [0, 1].
    MinMax,
    /// Center on the median, scale by the interquartile range.
    Robust,
}

impl Rescale {
    pub const ALL: [Rescale; 3] = [Rescale::Standard, Rescale::MinMax, Rescale::Robust];

    pub fn name(self) -> &'static str {
        match self {
            Rescale::Standard => "standard",
            Rescale::MinMax => "min-max",
            Rescale::Robust => "robust",
        }
    }

    pub fn from_name(name: &str) -> Option<Rescale> {
        Rescale::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Rescale one column. Constant columns map to zeros.
    pub fn apply(self, column: &[f64]) -> Vec<f64> {
        let finite: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
        let (center, scale) = match self {
            Rescale::Standard => (mean(&finite), var(&finite, 0).sqrt()),
            Rescale::MinMax => {
                let lo = quantile(&finite, 0.0);
                (lo, quantile(&finite, 1.0) - lo)
            }
            Rescale::Robust => (
                quantile(&finite, 0.5),
                quantile(&finite, 0.75) - quantile(&finite, 0.25),
            ),
        };
        column
            .iter()
            .map(|v| {
                if v.is_nan() {
                    f64::NAN
                } else if scale > 0.0 {
                    (v - center) / scale
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl fmt::Display for Rescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the `rescale` fit option. `None` disables rescaling; an empty
/// string or unknown mode is a value error, a non-string a type error.
pub fn resolve_rescale(value: &Value) -> Result<Option<Rescale>> {
    let name = process_generic_option(value, Some("rescale"), true, false)?;
    Ok(name.as_deref().and_then(Rescale::from_name))
}

// ---------------------------------------------------------------------------
// Discretization and model input
// ---------------------------------------------------------------------------

/// Equal-width discretization into `n_bins` bins. Missing cells go to bin 0.
pub fn discretize(column: &[f64], n_bins: usize) -> Vec<usize> {
    let n_bins = n_bins.max(1);
    let finite: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    let lo = quantile(&finite, 0.0);
    let width = (quantile(&finite, 1.0) - lo) / n_bins as f64;
    column
        .iter()
        .map(|&v| {
            if v.is_nan() || width.is_nan() || width <= 0.0 {
                0
            } else {
                (((v - lo) / width) as usize).min(n_bins - 1)
            }
        })
        .collect()
}

/// Row-major model input: the given numeric columns (missing cells replaced
/// by the column mean) followed by the one-hot encoded categorical columns.
pub fn design_matrix(dataset: &Dataset, numeric: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let fills: Vec<f64> = numeric
        .iter()
        .map(|col| {
            let finite: Vec<f64> = col.iter().copied().filter(|v| !v.is_nan()).collect();
            let m = mean(&finite);
            if m.is_nan() {
                0.0
            } else {
                m
            }
        })
        .collect();

    (0..dataset.len())
        .map(|i| {
            let mut row: Vec<f64> = numeric
                .iter()
                .zip(&fills)
                .map(|(col, &fill)| if col[i].is_nan() { fill } else { col[i] })
                .collect();
            for (codes, levels) in dataset.categorical.iter().zip(&dataset.categorical_levels) {
                row.extend((0..levels.len()).map(|l| if codes[i] == l { 1.0 } else { 0.0 }));
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CatCols;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolve_rescale() {
        assert_eq!(resolve_rescale(&Value::None).unwrap(), None);
        assert_eq!(
            resolve_rescale(&Value::from("min-max")).unwrap(),
            Some(Rescale::MinMax)
        );
        for bad in ["", "invalid", "minmax"] {
            assert!(resolve_rescale(&Value::from(bad)).unwrap_err().is_value_error());
        }
        assert!(resolve_rescale(&Value::List(vec![])).unwrap_err().is_type_error());
    }

    #[test]
    fn test_rescale_modes() {
        let col = [1.0, 2.0, 3.0, f64::NAN];
        let mm = Rescale::MinMax.apply(&col);
        assert_relative_eq!(mm[0], 0.0);
        assert_relative_eq!(mm[2], 1.0);
        assert!(mm[3].is_nan());

        let std = Rescale::Standard.apply(&col[..3]);
        assert_relative_eq!(std.iter().sum::<f64>(), 0.0, epsilon = 1e-12);

        assert_eq!(Rescale::Robust.apply(&[5.0, 5.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_discretize() {
        assert_eq!(discretize(&[0.0, 0.5, 1.0, f64::NAN], 2), vec![0, 1, 1, 0]);
        assert_eq!(discretize(&[3.0, 3.0], 4), vec![0, 0]);
    }

    #[test]
    fn test_design_matrix_one_hot() {
        let x = Value::from(vec![
            Value::from(vec![Value::from(1.0), Value::from("a")]),
            Value::from(vec![Value::None, Value::from("b")]),
        ]);
        let y = Value::from(vec![0, 1]);
        let ds = Dataset::bind(&x, &y, &CatCols::Infer).unwrap();
        let m = design_matrix(&ds, &ds.numeric);
        assert_eq!(m, vec![vec![1.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]]);
    }
}
