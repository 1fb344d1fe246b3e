use super::{Compute, FeatureArgs, FeatureSpec, OutputKind};
use crate::error::Result;
use crate::groups::Group;
use crate::precompute::ModelBasedData;
use crate::tree::Node;

pub(crate) const FEATURES: &[FeatureSpec] = &[
    FeatureSpec {
        name: "leaves",
        group: Group::ModelBased,
        description: "Number of leaves of the decision tree",
        params: &[],
        kind: OutputKind::Scalar,
        compute: Compute::ModelBased(leaves),
    },
    FeatureSpec {
        name: "leaves_per_class",
        group: Group::ModelBased,
        description: "Proportion of leaves predicting each class",
        params: &[],
        kind: OutputKind::Vector,
        compute: Compute::ModelBased(leaves_per_class),
    },
    FeatureSpec {
        name: "nodes",
        group: Group::ModelBased,
        description: "Number of decision nodes of the tree",
        params: &[],
        kind: OutputKind::Scalar,
        compute: Compute::ModelBased(nodes),
    },
    FeatureSpec {
        name: "tree_depth",
        group: Group::ModelBased,
        description: "Depth of every node of the tree",
        params: &[],
        kind: OutputKind::Vector,
        compute: Compute::ModelBased(tree_depth),
    },
];

fn leaves(data: &ModelBasedData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![data.tree.leaves().count() as f64])
}

fn leaves_per_class(data: &ModelBasedData, _: &FeatureArgs) -> Result<Vec<f64>> {
    let mut counts = vec![0.0; data.n_classes];
    for node in data.tree.leaves() {
        if let Node::Leaf { class, .. } = node {
            counts[*class] += 1.0;
        }
    }
    let total: f64 = counts.iter().sum();
    Ok(counts.into_iter().map(|c| c / total).collect())
}

fn nodes(data: &ModelBasedData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![data.tree.n_splits() as f64])
}

fn tree_depth(data: &ModelBasedData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(data.tree.nodes.iter().map(|n| n.depth() as f64).collect())
}
