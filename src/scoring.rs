use std::fmt;

/// A classification scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Accuracy,
    BalancedAccuracy,
    F1,
    Kappa,
}

impl Score {
    pub const ALL: [Score; 4] = [Score::Accuracy, Score::BalancedAccuracy, Score::F1, Score::Kappa];

    pub fn name(self) -> &'static str {
        match self {
            Score::Accuracy => "accuracy",
            Score::BalancedAccuracy => "balanced-accuracy",
            Score::F1 => "f1",
            Score::Kappa => "kappa",
        }
    }

    pub fn from_name(name: &str) -> Option<Score> {
        let lowered = name.to_ascii_lowercase();
        Score::ALL.into_iter().find(|s| s.name() == lowered)
    }

    /// Score predicted class indices against the true ones.
    ///
    /// Returns NaN for empty input.
    pub fn evaluate(self, truth: &[usize], pred: &[usize], n_classes: usize) -> f64 {
        if truth.is_empty() || truth.len() != pred.len() {
            return f64::NAN;
        }
        let cm = confusion_matrix(truth, pred, n_classes);
        let n = truth.len() as f64;
        let correct: f64 = (0..n_classes).map(|c| cm[c][c]).sum();

        match self {
            Score::Accuracy => correct / n,
            Score::BalancedAccuracy => {
                let recalls: Vec<f64> = (0..n_classes)
                    .filter_map(|c| {
                        let support: f64 = cm[c].iter().sum();
                        (support > 0.0).then(|| cm[c][c] / support)
                    })
                    .collect();
                recalls.iter().sum::<f64>() / recalls.len() as f64
            }
            Score::F1 => {
                // Macro average over classes present in truth or prediction.
                let mut total = 0.0;
                let mut present = 0usize;
                for c in 0..n_classes {
                    let tp = cm[c][c];
                    let actual: f64 = cm[c].iter().sum();
                    let predicted: f64 = (0..n_classes).map(|r| cm[r][c]).sum();
                    if actual + predicted == 0.0 {
                        continue;
                    }
                    present += 1;
                    total += 2.0 * tp / (actual + predicted);
                }
                total / present as f64
            }
            Score::Kappa => {
                let observed = correct / n;
                let expected: f64 = (0..n_classes)
                    .map(|c| {
                        let actual: f64 = cm[c].iter().sum();
                        let predicted: f64 = (0..n_classes).map(|r| cm[r][c]).sum();
                        actual * predicted
                    })
                    .sum::<f64>()
                    / (n * n);
                if (1.0 - expected).abs() < f64::EPSILON {
                    // Both raters always pick one class.
                    if (observed - 1.0).abs() < f64::EPSILON {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    (observed - expected) / (1.0 - expected)
                }
            }
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rows are true classes, columns predicted classes.
fn confusion_matrix(truth: &[usize], pred: &[usize], n_classes: usize) -> Vec<Vec<f64>> {
    let mut cm = vec![vec![0.0; n_classes]; n_classes];
    for (&t, &p) in truth.iter().zip(pred) {
        if t < n_classes && p < n_classes {
            cm[t][p] += 1.0;
        }
    }
    cm
}
