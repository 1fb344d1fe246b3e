use std::collections::BTreeSet;

use crate::error::{MfeError, Result};
use crate::value::Value;

// ---------------------------------------------------------------------------
// CatCols – which attribute columns are categorical
// ---------------------------------------------------------------------------

/// Categorical-column selection for a fit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatCols {
    /// Columns holding at least one string cell are categorical.
    #[default]
    Infer,
    /// Exactly these column indices are categorical (possibly none).
    Explicit(Vec<usize>),
}

impl CatCols {
    /// Resolve the `cat_cols` fit option.
    ///
    /// Only an explicit sequence of column indices or `None` (infer) is
    /// accepted. Scalars, including strings such as `"all"`, are rejected.
    pub fn resolve(value: &Value) -> Result<CatCols> {
        match value {
            Value::None => Ok(CatCols::Infer),
            Value::List(items) => {
                let mut cols = Vec::with_capacity(items.len());
                for item in items {
                    let idx = match item {
                        Value::Int(i) => *i,
                        other => {
                            return Err(MfeError::type_error(
                                "cat_cols",
                                format!(
                                    "column indices must be integers, got {} ({other})",
                                    other.kind_name()
                                ),
                            ))
                        }
                    };
                    let idx = usize::try_from(idx).map_err(|_| {
                        MfeError::value_error("cat_cols", format!("negative column index {idx}"))
                    })?;
                    if cols.contains(&idx) {
                        return Err(MfeError::value_error(
                            "cat_cols",
                            format!("column index {idx} given twice"),
                        ));
                    }
                    cols.push(idx);
                }
                Ok(CatCols::Explicit(cols))
            }
            Value::Range(r) => CatCols::resolve(&Value::List(r.clone().map(Value::Int).collect())),
            other => Err(MfeError::value_error(
                "cat_cols",
                format!("expected a sequence of column indices or None, got {other}"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Check the raw attribute matrix and label vector and return them as rows
/// and labels.
///
/// * `None` for either input is a type error, as is anything that is not a
///   sequence.
/// * An empty `X` or `y`, ragged rows, or a row-count mismatch is a value
///   error.
/// * A flat sequence of scalars is read as a single-attribute matrix.
pub fn validate_xy<'a>(x: &'a Value, y: &'a Value) -> Result<(Vec<&'a [Value]>, &'a [Value])> {
    let rows = match x {
        Value::None => return Err(MfeError::type_error("X", "can not be None")),
        Value::List(rows) => rows,
        other => {
            return Err(MfeError::type_error(
                "X",
                format!("expected a sequence of rows, got {}", other.kind_name()),
            ))
        }
    };
    let labels = match y {
        Value::None => return Err(MfeError::type_error("y", "can not be None")),
        Value::List(labels) => labels,
        other => {
            return Err(MfeError::type_error(
                "y",
                format!("expected a sequence of labels, got {}", other.kind_name()),
            ))
        }
    };

    if rows.is_empty() {
        return Err(MfeError::value_error("X", "can not be empty"));
    }
    if labels.is_empty() {
        return Err(MfeError::value_error("y", "can not be empty"));
    }
    if rows.len() != labels.len() {
        return Err(MfeError::value_error(
            "y",
            format!(
                "X has {} rows but y has {} labels",
                rows.len(),
                labels.len()
            ),
        ));
    }

    let mut out: Vec<&[Value]> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let cells: &[Value] = match row {
            Value::List(cells) => cells,
            scalar if scalar.is_scalar() => std::slice::from_ref(scalar),
            other => {
                return Err(MfeError::type_error(
                    "X",
                    format!("row {i} is a {}, expected a sequence", other.kind_name()),
                ))
            }
        };
        out.push(cells);
    }

    let n_attr = out[0].len();
    if n_attr == 0 {
        return Err(MfeError::value_error("X", "rows have no attributes"));
    }
    if let Some((i, row)) = out.iter().enumerate().find(|(_, r)| r.len() != n_attr) {
        return Err(MfeError::value_error(
            "X",
            format!("row {i} has {} values but row 0 has {n_attr}", row.len()),
        ));
    }

    Ok((out, labels))
}

// ---------------------------------------------------------------------------
// Dataset – the bound, validated data
// ---------------------------------------------------------------------------

/// A validated attribute matrix and label vector.
///
/// Attributes are stored column-major and split by kind; categorical
/// columns and labels are coded as indices into sorted level lists.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Numeric columns (NaN marks a missing cell).
    pub numeric: Vec<Vec<f64>>,
    /// Original position of each numeric column.
    pub numeric_index: Vec<usize>,
    /// Categorical columns, coded.
    pub categorical: Vec<Vec<usize>>,
    /// Sorted levels of each categorical column.
    pub categorical_levels: Vec<Vec<String>>,
    /// Original position of each categorical column.
    pub categorical_index: Vec<usize>,
    /// Class index of each instance.
    pub labels: Vec<usize>,
    /// Sorted class names.
    pub classes: Vec<String>,
}

impl Dataset {
    /// Validate `x` and `y` and split the attributes by kind.
    pub fn bind(x: &Value, y: &Value, cat_cols: &CatCols) -> Result<Self> {
        let (rows, labels) = validate_xy(x, y)?;
        let n_attr = rows[0].len();

        for (i, row) in rows.iter().enumerate() {
            if let Some(cell) = row.iter().find(|c| !c.is_scalar()) {
                return Err(MfeError::type_error(
                    "X",
                    format!("row {i} holds a {}, expected scalars", cell.kind_name()),
                ));
            }
        }

        let is_categorical: Vec<bool> = match cat_cols {
            CatCols::Infer => (0..n_attr)
                .map(|j| rows.iter().any(|r| matches!(r[j], Value::Str(_))))
                .collect(),
            CatCols::Explicit(cols) => {
                if let Some(&bad) = cols.iter().find(|&&c| c >= n_attr) {
                    return Err(MfeError::value_error(
                        "cat_cols",
                        format!("column index {bad} out of range for {n_attr} attributes"),
                    ));
                }
                (0..n_attr).map(|j| cols.contains(&j)).collect()
            }
        };

        let mut dataset = Dataset {
            numeric: Vec::new(),
            numeric_index: Vec::new(),
            categorical: Vec::new(),
            categorical_levels: Vec::new(),
            categorical_index: Vec::new(),
            labels: Vec::new(),
            classes: Vec::new(),
        };

        for j in 0..n_attr {
            if is_categorical[j] {
                let cells: Vec<String> = rows.iter().map(|r| r[j].to_string()).collect();
                let (codes, levels) = encode(&cells);
                dataset.categorical.push(codes);
                dataset.categorical_levels.push(levels);
                dataset.categorical_index.push(j);
            } else {
                let mut column = Vec::with_capacity(rows.len());
                for (i, row) in rows.iter().enumerate() {
                    let v = match &row[j] {
                        Value::None => f64::NAN,
                        Value::Str(s) => {
                            return Err(MfeError::value_error(
                                "X",
                                format!(
                                    "non-numeric value '{s}' at row {i}, column {j} \
                                     (declare the column in cat_cols)"
                                ),
                            ))
                        }
                        cell => cell.as_f64().unwrap_or(f64::NAN),
                    };
                    column.push(v);
                }
                dataset.numeric.push(column);
                dataset.numeric_index.push(j);
            }
        }

        let mut names = Vec::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            match label {
                Value::None => {
                    return Err(MfeError::value_error("y", format!("label {i} is missing")))
                }
                l if l.is_scalar() => names.push(l.to_string()),
                other => {
                    return Err(MfeError::type_error(
                        "y",
                        format!("label {i} is a {}, expected a scalar", other.kind_name()),
                    ))
                }
            }
        }
        let (codes, classes) = encode(&names);
        dataset.labels = codes;
        dataset.classes = classes;

        Ok(dataset)
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset is empty (never true for a bound dataset).
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_attr(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Instance count per class, indexed like `classes`.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.classes.len()];
        for &l in &self.labels {
            counts[l] += 1;
        }
        counts
    }
}

/// Code values by their position in the sorted set of unique values.
fn encode(cells: &[String]) -> (Vec<usize>, Vec<String>) {
    let levels: Vec<String> = cells
        .iter()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    let codes = cells
        .iter()
        .map(|c| levels.binary_search(c).unwrap_or_default())
        .collect();
    (codes, levels)
}
