use super::{Compute, FeatureArgs, FeatureSpec, OutputKind};
use crate::data::Dataset;
use crate::error::Result;
use crate::groups::Group;
use crate::precompute::GeneralData;

const fn scalar(
    name: &'static str,
    description: &'static str,
    f: fn(&Dataset, &GeneralData, &FeatureArgs) -> Result<Vec<f64>>,
) -> FeatureSpec {
    FeatureSpec {
        name,
        group: Group::General,
        description,
        params: &[],
        kind: OutputKind::Scalar,
        compute: Compute::General(f),
    }
}

pub(crate) const FEATURES: &[FeatureSpec] = &[
    scalar("attr_to_inst", "Ratio between the number of attributes and instances", attr_to_inst),
    scalar("cat_to_num", "Ratio between categorical and numeric attributes", cat_to_num),
    FeatureSpec {
        name: "freq_class",
        group: Group::General,
        description: "Relative frequency of each class",
        params: &[],
        kind: OutputKind::Vector,
        compute: Compute::General(freq_class),
    },
    scalar("inst_to_attr", "Ratio between the number of instances and attributes", inst_to_attr),
    scalar("nr_attr", "Number of attributes", nr_attr),
    scalar("nr_cat", "Number of categorical attributes", nr_cat),
    scalar("nr_class", "Number of distinct classes", nr_class),
    scalar("nr_inst", "Number of instances", nr_inst),
    scalar("nr_num", "Number of numeric attributes", nr_num),
    scalar("num_to_cat", "Ratio between numeric and categorical attributes", num_to_cat),
];

/// `a / b`, NaN when `b` is zero.
fn ratio(a: usize, b: usize) -> f64 {
    if b == 0 {
        f64::NAN
    } else {
        a as f64 / b as f64
    }
}

fn attr_to_inst(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ratio(ds.n_attr(), ds.len())])
}

fn cat_to_num(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ratio(ds.categorical.len(), ds.numeric.len())])
}

fn freq_class(_: &Dataset, data: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(data.class_freq.clone())
}

fn inst_to_attr(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ratio(ds.len(), ds.n_attr())])
}

fn nr_attr(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ds.n_attr() as f64])
}

fn nr_cat(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ds.categorical.len() as f64])
}

fn nr_class(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ds.n_classes() as f64])
}

fn nr_inst(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ds.len() as f64])
}

fn nr_num(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ds.numeric.len() as f64])
}

fn num_to_cat(ds: &Dataset, _: &GeneralData, _: &FeatureArgs) -> Result<Vec<f64>> {
    Ok(vec![ratio(ds.numeric.len(), ds.categorical.len())])
}
