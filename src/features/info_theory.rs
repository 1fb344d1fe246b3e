use super::{Compute, FeatureArgs, FeatureSpec, OutputKind};
use crate::error::Result;
use crate::groups::Group;
use crate::precompute::InfoTheoryData;
use crate::summary::mean;

const fn feature(
    name: &'static str,
    description: &'static str,
    kind: OutputKind,
    f: fn(&InfoTheoryData, &FeatureArgs) -> Result<Vec<f64>>,
) -> FeatureSpec {
    FeatureSpec {
        name,
        group: Group::InfoTheory,
        description,
        params: &[],
        kind,
        compute: Compute::InfoTheory(f),
    }
}

pub(crate) const FEATURES: &[FeatureSpec] = &[
    feature("attr_ent", "Shannon entropy of each attribute", OutputKind::Vector, attr_ent),
    feature(
        "class_conc",
        "Goodman-Kruskal concentration of the class given each attribute",
        OutputKind::Vector,
        class_conc,
    ),
    feature("class_ent", "Shannon entropy of the class", OutputKind::Scalar, class_ent),
    feature(
        "eq_num_attr",
        "Number of attributes equivalent to the class entropy",
        OutputKind::Scalar,
        eq_num_attr,
    ),
    feature("joint_ent", "Joint entropy of each attribute and the class", OutputKind::Vector, joint_ent),
    feature("mut_inf", "Mutual information of each attribute and the class", OutputKind::Vector, mut_inf),
    feature("ns_ratio", "Noise-to-signal ratio of the attributes", OutputKind::Scalar, ns_ratio),
];

fn attr_ent(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(data.attr_ent.clone())
}

fn class_conc(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(data
        .attrs
        .iter()
        .map(|a| concentration(a, &data.labels, data.n_classes))
        .collect())
}

fn class_ent(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![data.class_ent])
}

fn eq_num_attr(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    let mi = mean(&data.mut_inf);
    Ok(vec![if mi > 0.0 { data.class_ent / mi } else { f64::NAN }])
}

fn joint_ent(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(data.joint_ent.clone())
}

fn mut_inf(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(data.mut_inf.clone())
}

fn ns_ratio(data: &InfoTheoryData, _: &FeatureArgs) -> Result<Vec<f64>> {
    let mi = mean(&data.mut_inf);
    let ratio = if mi > 0.0 {
        (mean(&data.attr_ent) - mi) / mi
    } else {
        f64::NAN
    };
    Ok(vec![ratio])
}

/// Goodman and Kruskal's tau of `labels` given `attr`.
fn concentration(attr: &[usize], labels: &[usize], n_classes: usize) -> f64 {
    let n = labels.len() as f64;
    let n_levels = attr.iter().max().map_or(0, |m| m + 1);
    let mut table = vec![vec![0.0; n_classes]; n_levels];
    for (&a, &c) in attr.iter().zip(labels) {
        table[a][c] += 1.0;
    }
    let class_p: Vec<f64> = (0..n_classes)
        .map(|c| table.iter().map(|row| row[c]).sum::<f64>() / n)
        .collect();
    let base: f64 = class_p.iter().map(|p| p * p).sum();
    if base >= 1.0 {
        return f64::NAN;
    }

    let within: f64 = table
        .iter()
        .filter_map(|row| {
            let level_p = row.iter().sum::<f64>() / n;
            (level_p > 0.0).then(|| row.iter().map(|&c| (c / n).powi(2)).sum::<f64>() / level_p)
        })
        .sum();
    (within - base) / (1.0 - base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precompute::{entropy, joint_entropy};
    use approx::assert_relative_eq;

    fn data(attrs: Vec<Vec<usize>>, labels: Vec<usize>) -> InfoTheoryData {
        let class_ent = entropy(&labels);
        let attr_ent: Vec<f64> = attrs.iter().map(|a| entropy(a)).collect();
        let joint_ent: Vec<f64> = attrs.iter().map(|a| joint_entropy(a, &labels)).collect();
        let mut_inf = attr_ent
            .iter()
            .zip(&joint_ent)
            .map(|(a, j)| a + class_ent - j)
            .collect();
        InfoTheoryData {
            attrs,
            labels,
            n_classes: 2,
            class_ent,
            attr_ent,
            joint_ent,
            mut_inf,
        }
    }

    #[test]
    fn test_perfect_and_useless_attribute() {
        let d = data(vec![vec![0, 0, 1, 1], vec![0, 1, 0, 1]], vec![0, 0, 1, 1]);
        let args = FeatureArgs::default();
        let conc = class_conc(&d, &args).unwrap();
        assert_relative_eq!(conc[0], 1.0);
        assert_relative_eq!(conc[1], 0.0);
        let mi = mut_inf(&d, &args).unwrap();
        assert_relative_eq!(mi[0], 1.0);
        assert_relative_eq!(mi[1], 0.0);
        assert_relative_eq!(eq_num_attr(&d, &args).unwrap()[0], 2.0);
        assert_relative_eq!(ns_ratio(&d, &args).unwrap()[0], 1.0);
    }

    #[test]
    fn test_no_information_is_nan() {
        let d = data(vec![vec![0, 1, 0, 1]], vec![0, 0, 1, 1]);
        assert!(eq_num_attr(&d, &FeatureArgs::default()).unwrap()[0].is_nan());
    }
}
