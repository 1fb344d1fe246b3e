use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::value::Value;

const SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    /// 150 instances, 3 classes, 4 numeric and 2 categorical attributes.
    Mixed,
    /// 60 instances, 2 classes, 3 numeric attributes.
    Numeric,
    /// 40 instances, 2 classes, 3 categorical attributes.
    Categorical,
}

/// Box-Muller transform for a normal draw.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-15);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Attribute matrix and label vector of a sample dataset.
pub fn load_xy(sample: Sample) -> (Value, Value) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut rows: Vec<Value> = Vec::new();
    let mut labels: Vec<Value> = Vec::new();

    match sample {
        Sample::Mixed => {
            let class_means: [(&str, [f64; 4]); 3] = [
                ("class_a", [5.0, 3.4, 1.5, 0.2]),
                ("class_b", [5.9, 2.8, 4.3, 1.3]),
                ("class_c", [6.6, 3.0, 5.6, 2.0]),
            ];
            let grades = ["low", "mid", "high"];
            let operators = ["Alice", "Bob"];
            for (c, (label, means)) in class_means.iter().enumerate() {
                for _ in 0..50 {
                    let mut row: Vec<Value> = means
                        .iter()
                        .map(|&mu| Value::from(gauss(&mut rng, mu, 0.4)))
                        .collect();
                    // Grade agrees with the class most of the time.
                    let grade = if rng.random::<f64>() < 0.8 {
                        grades[c]
                    } else {
                        grades[rng.random_range(0..grades.len())]
                    };
                    row.push(Value::from(grade));
                    row.push(Value::from(operators[rng.random_range(0..operators.len())]));
                    rows.push(Value::List(row));
                    labels.push(Value::from(*label));
                }
            }
        }
        Sample::Numeric => {
            for i in 0..60 {
                let class = i % 2;
                let shift = class as f64 * 1.5;
                let row: Vec<Value> = (0..3)
                    .map(|j| Value::from(gauss(&mut rng, shift + j as f64, 1.0)))
                    .collect();
                rows.push(Value::List(row));
                labels.push(Value::from(class));
            }
        }
        Sample::Categorical => {
            let colors = ["red", "green", "blue"];
            let sizes = ["S", "M", "L"];
            for i in 0..40 {
                let class = i % 2;
                let color = if rng.random::<f64>() < 0.7 {
                    colors[class]
                } else {
                    colors[2]
                };
                let size = sizes[rng.random_range(0..sizes.len())];
                let flag = if class == 1 { "yes" } else { "no" };
                rows.push(Value::from(vec![color, size, flag]));
                labels.push(Value::from(if class == 1 { "pos" } else { "neg" }));
            }
        }
    }

    (Value::List(rows), Value::List(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CatCols, Dataset};

    #[test]
    fn test_samples_bind() {
        for (sample, n_inst, n_num, n_cat) in [
            (Sample::Mixed, 150, 4, 2),
            (Sample::Numeric, 60, 3, 0),
            (Sample::Categorical, 40, 0, 3),
        ] {
            let (x, y) = load_xy(sample);
            let ds = Dataset::bind(&x, &y, &CatCols::Infer).unwrap();
            assert_eq!(ds.len(), n_inst);
            assert_eq!(ds.numeric.len(), n_num);
            assert_eq!(ds.categorical.len(), n_cat);
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(load_xy(Sample::Mixed), load_xy(Sample::Mixed));
    }
}
