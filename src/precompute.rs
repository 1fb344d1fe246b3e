use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{Config, FitConfig};
use crate::data::{design_matrix, discretize, Dataset};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{MfeError, Result};
use crate::groups::Group;
use crate::options::{collect_names, WILDCARD};
use crate::scoring::Score;
use crate::tree::DecisionTree;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct GeneralData {
    /// Proportion of instances in each class.
    pub class_freq: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct StatisticalData {
    /// Numeric columns after rescaling, missing cells dropped.
    pub columns: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct InfoTheoryData {
    /// Coded attributes: categorical columns, then discretized numeric ones.
    pub attrs: Vec<Vec<usize>>,
    pub labels: Vec<usize>,
    pub n_classes: usize,
    pub class_ent: f64,
    pub attr_ent: Vec<f64>,
    pub joint_ent: Vec<f64>,
    pub mut_inf: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ModelBasedData {
    pub tree: DecisionTree,
    pub n_classes: usize,
}

#[derive(Debug, Clone)]
pub struct LandmarkingData {
    /// Row-major model input of the sampled instances.
    pub matrix: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    pub n_classes: usize,
    /// Test indices of each fold; the rest of the sample is the training set.
    pub folds: Vec<Vec<usize>>,
    /// Attribute drawn for the random-node landmarker, one per fold.
    pub random_attrs: Vec<usize>,
    pub score: Score,
}

impl LandmarkingData {
    /// Training indices of fold `k`.
    pub fn train_indices(&self, k: usize) -> Vec<usize> {
        let test = &self.folds[k];
        (0..self.labels.len()).filter(|i| !test.contains(i)).collect()
    }
}

#[derive(Debug, Clone)]
pub enum GroupData {
    General(GeneralData),
    Statistical(StatisticalData),
    InfoTheory(InfoTheoryData),
    ModelBased(ModelBasedData),
    Landmarking(LandmarkingData),
}

/// Group data built so far for one bound dataset.
#[derive(Debug, Clone, Default)]
pub struct Precomputed {
    groups: BTreeMap<Group, GroupData>,
}

impl Precomputed {
    pub fn contains(&self, group: Group) -> bool {
        self.groups.contains_key(&group)
    }

    /// Build the data of every listed group now.
    pub fn precompute(
        &mut self,
        groups: &[Group],
        dataset: &Dataset,
        config: &Config,
        fit: &FitConfig,
    ) -> Result<()> {
        for &group in groups {
            self.get_or_build(group, dataset, config, fit)?;
        }
        Ok(())
    }

    pub fn get_or_build(
        &mut self,
        group: Group,
        dataset: &Dataset,
        config: &Config,
        fit: &FitConfig,
    ) -> Result<&GroupData> {
        if !self.groups.contains_key(&group) {
            let data = build(group, dataset, config, fit)?;
            log::debug!("built shared values for group '{group}'");
            self.groups.insert(group, data);
        }
        Ok(&self.groups[&group])
    }
}

/// Resolve `precomp_groups` against the active groups. Unknown or inactive
/// entries are reported and skipped; a non-string entry is a type error.
pub fn resolve_precomp_groups(
    value: &Value,
    active: &[Group],
    diag: &mut Diagnostics,
) -> Result<Vec<Group>> {
    if value.is_none() || value.is_blank() {
        return Ok(Vec::new());
    }
    let names = collect_names(value, "precomp_groups")?;
    if names.len() == 1 && names[0] == WILDCARD {
        return Ok(active.to_vec());
    }

    let mut groups = Vec::new();
    for name in names {
        match Group::from_name(&name) {
            Some(g) if active.contains(&g) => {
                if !groups.contains(&g) {
                    groups.push(g);
                }
            }
            Some(g) => diag.emit(
                DiagnosticKind::UnmatchedPrecompGroup,
                name.clone(),
                format!("precomputation group '{g}' is not a selected group; skipped"),
            ),
            None => diag.emit(
                DiagnosticKind::UnmatchedPrecompGroup,
                name.clone(),
                format!("unknown precomputation group '{name}'; skipped"),
            ),
        }
    }
    Ok(groups)
}

fn build(group: Group, dataset: &Dataset, config: &Config, fit: &FitConfig) -> Result<GroupData> {
    Ok(match group {
        Group::General => GroupData::General(build_general(dataset)),
        Group::Statistical => GroupData::Statistical(build_statistical(dataset, fit)),
        Group::InfoTheory => GroupData::InfoTheory(build_info_theory(dataset, fit)),
        Group::ModelBased => GroupData::ModelBased(build_model_based(dataset, fit)),
        Group::Landmarking => GroupData::Landmarking(build_landmarking(dataset, config, fit)?),
    })
}

fn build_general(dataset: &Dataset) -> GeneralData {
    let n = dataset.len() as f64;
    GeneralData {
        class_freq: dataset
            .class_counts()
            .into_iter()
            .map(|c| c as f64 / n)
            .collect(),
    }
}

fn rescaled_columns(dataset: &Dataset, fit: &FitConfig) -> Vec<Vec<f64>> {
    match fit.rescale {
        Some(mode) => dataset.numeric.iter().map(|c| mode.apply(c)).collect(),
        None => dataset.numeric.clone(),
    }
}

fn build_statistical(dataset: &Dataset, fit: &FitConfig) -> StatisticalData {
    StatisticalData {
        columns: rescaled_columns(dataset, fit)
            .into_iter()
            .map(|c| c.into_iter().filter(|v| !v.is_nan()).collect())
            .collect(),
    }
}

fn build_info_theory(dataset: &Dataset, fit: &FitConfig) -> InfoTheoryData {
    let mut attrs = dataset.categorical.clone();
    if fit.transform_num {
        let n_bins = ((dataset.len() as f64).sqrt().ceil() as usize).max(2);
        attrs.extend(dataset.numeric.iter().map(|c| discretize(c, n_bins)));
    }

    let labels = dataset.labels.clone();
    let class_ent = entropy(&labels);
    let attr_ent: Vec<f64> = attrs.iter().map(|a| entropy(a)).collect();
    let joint_ent: Vec<f64> = attrs.iter().map(|a| joint_entropy(a, &labels)).collect();
    let mut_inf = attr_ent
        .iter()
        .zip(&joint_ent)
        .map(|(h_a, h_ac)| h_a + class_ent - h_ac)
        .collect();

    InfoTheoryData {
        attrs,
        labels,
        n_classes: dataset.n_classes(),
        class_ent,
        attr_ent,
        joint_ent,
        mut_inf,
    }
}

fn build_model_based(dataset: &Dataset, fit: &FitConfig) -> ModelBasedData {
    let matrix = design_matrix(dataset, &rescaled_columns(dataset, fit));
    ModelBasedData {
        tree: DecisionTree::fit(&matrix, &dataset.labels, dataset.n_classes(), None),
        n_classes: dataset.n_classes(),
    }
}

fn build_landmarking(dataset: &Dataset, config: &Config, fit: &FitConfig) -> Result<LandmarkingData> {
    let mut rng = match config.random_state {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let full = design_matrix(dataset, &rescaled_columns(dataset, fit));
    let mut sample: Vec<usize> = (0..dataset.len()).collect();
    if config.lm_sample_frac < 1.0 {
        sample.shuffle(&mut rng);
        let keep = ((config.lm_sample_frac * dataset.len() as f64).ceil() as usize).max(1);
        sample.truncate(keep);
        sample.sort_unstable();
    }
    if config.folds > sample.len() {
        return Err(MfeError::value_error(
            "folds",
            format!(
                "{} folds requested but only {} instances are available for landmarking",
                config.folds,
                sample.len()
            ),
        ));
    }

    let matrix: Vec<Vec<f64>> = sample.iter().map(|&i| full[i].clone()).collect();
    let labels: Vec<usize> = sample.iter().map(|&i| dataset.labels[i]).collect();

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.shuffle(&mut rng);
    let mut folds = vec![Vec::new(); config.folds];
    for (pos, i) in order.into_iter().enumerate() {
        folds[pos % config.folds].push(i);
    }
    for fold in &mut folds {
        fold.sort_unstable();
    }

    let n_cols = matrix.first().map_or(0, Vec::len);
    let random_attrs = (0..config.folds)
        .map(|_| rng.random_range(0..n_cols.max(1)))
        .collect();

    Ok(LandmarkingData {
        matrix,
        labels,
        n_classes: dataset.n_classes(),
        folds,
        random_attrs,
        score: config.score,
    })
}

// ---------------------------------------------------------------------------
// Entropies (base 2)
// ---------------------------------------------------------------------------

fn entropy_of_counts<'a>(counts: impl Iterator<Item = &'a usize>, total: usize) -> f64 {
    let n = total as f64;
    counts
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

pub(crate) fn entropy(codes: &[usize]) -> f64 {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &c in codes {
        *counts.entry(c).or_default() += 1;
    }
    entropy_of_counts(counts.values(), codes.len())
}

pub(crate) fn joint_entropy(a: &[usize], b: &[usize]) -> f64 {
    let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (&x, &y) in a.iter().zip(b) {
        *counts.entry((x, y)).or_default() += 1;
    }
    entropy_of_counts(counts.values(), a.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FitOptions, MfeOptions};
    use crate::sample;
    use approx::assert_relative_eq;

    fn setup(options: MfeOptions) -> (Dataset, Config, FitConfig) {
        let (x, y) = sample::load_xy(sample::Sample::Mixed);
        let fit = FitConfig::from_options(&FitOptions::default()).unwrap();
        let dataset = Dataset::bind(&x, &y, &fit.cat_cols).unwrap();
        (dataset, Config::from_options(&options).unwrap(), fit)
    }

    #[test]
    fn test_entropy() {
        assert_relative_eq!(entropy(&[0, 1, 0, 1]), 1.0);
        assert_relative_eq!(entropy(&[3, 3, 3]), 0.0);
        assert_relative_eq!(joint_entropy(&[0, 1, 0, 1], &[0, 0, 1, 1]), 2.0);
    }

    #[test]
    fn test_precomp_groups_warnings() {
        let active = [Group::General];
        let mut diag = Diagnostics::new();
        let got = resolve_precomp_groups(&Value::from("statistical"), &active, &mut diag).unwrap();
        assert!(got.is_empty());
        assert!(diag.has(DiagnosticKind::UnmatchedPrecompGroup));

        let mut diag = Diagnostics::new();
        let got = resolve_precomp_groups(&Value::from("invalid"), &Group::ALL, &mut diag).unwrap();
        assert!(got.is_empty());
        assert_eq!(diag.len(), 1);

        let mut diag = Diagnostics::new();
        let got = resolve_precomp_groups(&Value::from("all"), &active, &mut diag).unwrap();
        assert_eq!(got, vec![Group::General]);
        assert!(diag.is_empty());

        let err = resolve_precomp_groups(&Value::from(vec![1]), &active, &mut diag).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_lazy_build_is_cached() {
        let (dataset, config, fit) = setup(MfeOptions::default());
        let mut pre = Precomputed::default();
        assert!(!pre.contains(Group::General));
        let data = pre.get_or_build(Group::General, &dataset, &config, &fit).unwrap();
        match data {
            GroupData::General(g) => assert_relative_eq!(g.class_freq.iter().sum::<f64>(), 1.0),
            other => panic!("unexpected group data {other:?}"),
        }
        assert!(pre.contains(Group::General));
    }

    #[test]
    fn test_landmarking_folds_partition_sample() {
        let (dataset, config, fit) = setup(MfeOptions::default().with_random_state(1).with_folds(4));
        let data = build_landmarking(&dataset, &config, &fit).unwrap();
        assert_eq!(data.folds.len(), 4);
        let mut all: Vec<usize> = data.folds.concat();
        all.sort_unstable();
        assert_eq!(all, (0..dataset.len()).collect::<Vec<_>>());
        assert_eq!(data.train_indices(0).len() + data.folds[0].len(), dataset.len());
    }

    #[test]
    fn test_landmarking_is_seeded() {
        let options = MfeOptions::default().with_random_state(5).with_lm_sample_frac(0.5);
        let (dataset, config, fit) = setup(options);
        let a = build_landmarking(&dataset, &config, &fit).unwrap();
        let b = build_landmarking(&dataset, &config, &fit).unwrap();
        assert_eq!(a.folds, b.folds);
        assert_eq!(a.random_attrs, b.random_attrs);
        assert_eq!(a.labels.len(), (dataset.len() as f64 * 0.5).ceil() as usize);
    }

    #[test]
    fn test_too_many_folds() {
        let (dataset, config, fit) = setup(MfeOptions::default().with_folds(10_000));
        let err = build_landmarking(&dataset, &config, &fit).unwrap_err();
        assert!(err.is_value_error());
    }
}
