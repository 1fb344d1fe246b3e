use super::{Compute, FeatureArgs, FeatureSpec, OutputKind};
use crate::error::Result;
use crate::groups::Group;
use crate::precompute::LandmarkingData;
use crate::tree::{split_on, DecisionTree};

const fn landmarker(
    name: &'static str,
    description: &'static str,
    f: fn(&LandmarkingData, &FeatureArgs) -> Result<Vec<f64>>,
) -> FeatureSpec {
    FeatureSpec {
        name,
        group: Group::Landmarking,
        description,
        params: &[],
        kind: OutputKind::Vector,
        compute: Compute::Landmarking(f),
    }
}

pub(crate) const FEATURES: &[FeatureSpec] = &[
    landmarker("best_node", "Score of a single split on the most informative attribute", best_node),
    landmarker("one_nn", "Score of the 1-nearest-neighbour classifier", one_nn),
    landmarker("random_node", "Score of a single split on a random attribute", random_node),
    landmarker("worst_node", "Score of a single split on the least informative attribute", worst_node),
];

/// Training split of fold `k`.
struct Fold<'a> {
    data: &'a LandmarkingData,
    x: Vec<Vec<f64>>,
    y: Vec<usize>,
    test: &'a [usize],
}

impl<'a> Fold<'a> {
    fn new(data: &'a LandmarkingData, k: usize) -> Self {
        let train = data.train_indices(k);
        Fold {
            data,
            x: train.iter().map(|&i| data.matrix[i].clone()).collect(),
            y: train.iter().map(|&i| data.labels[i]).collect(),
            test: &data.folds[k],
        }
    }

    fn n_attr(&self) -> usize {
        self.data.matrix.first().map_or(0, Vec::len)
    }

    fn score(&self, predict: impl Fn(&[f64]) -> usize) -> f64 {
        let truth: Vec<usize> = self.test.iter().map(|&i| self.data.labels[i]).collect();
        let pred: Vec<usize> = self.test.iter().map(|&i| predict(&self.data.matrix[i])).collect();
        self.data.score.evaluate(&truth, &pred, self.data.n_classes)
    }

    fn score_stump(&self, attrs: &[usize]) -> f64 {
        let stump = DecisionTree::stump(&self.x, &self.y, self.data.n_classes, attrs);
        self.score(|row| stump.predict_one(row))
    }
}

fn per_fold(data: &LandmarkingData, f: impl Fn(&Fold<'_>, usize) -> f64) -> Result<Vec<f64>> {
    Ok((0..data.folds.len()).map(|k| f(&Fold::new(data, k), k)).collect())
}

fn best_node(data: &LandmarkingData, _: &FeatureArgs) -> Result<Vec<f64>> {
    per_fold(data, |fold, _| {
        let attrs: Vec<usize> = (0..fold.n_attr()).collect();
        fold.score_stump(&attrs)
    })
}

fn one_nn(data: &LandmarkingData, _: &FeatureArgs) -> Result<Vec<f64>> {
    per_fold(data, |fold, _| {
        fold.score(|row| {
            let nearest = fold
                .x
                .iter()
                .enumerate()
                .map(|(j, other)| (j, squared_distance(row, other)))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            nearest.map_or(0, |(j, _)| fold.y[j])
        })
    })
}

fn random_node(data: &LandmarkingData, _: &FeatureArgs) -> Result<Vec<f64>> {
    per_fold(data, |fold, k| fold.score_stump(&[data.random_attrs[k]]))
}

fn worst_node(data: &LandmarkingData, _: &FeatureArgs) -> Result<Vec<f64>> {
    per_fold(data, |fold, _| {
        let all: Vec<usize> = (0..fold.y.len()).collect();
        let worst = (0..fold.n_attr())
            .filter_map(|a| split_on(&fold.x, &fold.y, data.n_classes, &all, a))
            .min_by(|a, b| a.gain.total_cmp(&b.gain))
            .map_or(0, |s| s.attr);
        fold.score_stump(&[worst])
    })
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
