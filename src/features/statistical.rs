use super::{Compute, FeatureArgs, FeatureSpec, OutputKind};
use crate::error::Result;
use crate::groups::Group;
use crate::precompute::StatisticalData;
use crate::summary::{kurtosis, mean, quantile, skewness, var};

const fn per_column(
    name: &'static str,
    description: &'static str,
    params: &'static [&'static str],
    f: fn(&StatisticalData, &FeatureArgs) -> Result<Vec<f64>>,
) -> FeatureSpec {
    FeatureSpec {
        name,
        group: Group::Statistical,
        description,
        params,
        kind: OutputKind::Vector,
        compute: Compute::Statistical(f),
    }
}

pub(crate) const FEATURES: &[FeatureSpec] = &[
    per_column("iq_range", "Interquartile range of each numeric attribute", &[], iq_range),
    per_column("kurtosis", "Excess kurtosis of each numeric attribute", &[], kurtosis_of),
    per_column("max", "Maximum of each numeric attribute", &[], max),
    per_column("mean", "Mean of each numeric attribute", &[], mean_of),
    per_column("median", "Median of each numeric attribute", &[], median),
    per_column("min", "Minimum of each numeric attribute", &[], min),
    FeatureSpec {
        name: "nr_outliers",
        group: Group::Statistical,
        description: "Number of numeric attributes with at least one Tukey outlier",
        params: &["whis"],
        kind: OutputKind::Scalar,
        compute: Compute::Statistical(nr_outliers),
    },
    per_column("range", "Range of each numeric attribute", &[], range),
    per_column("sd", "Standard deviation of each numeric attribute", &["ddof"], sd),
    per_column("skewness", "Skewness of each numeric attribute", &[], skewness_of),
    per_column("t_mean", "Trimmed mean of each numeric attribute", &["pcut"], t_mean),
    per_column("var", "Variance of each numeric attribute", &["ddof"], var_of),
];

fn each(data: &StatisticalData, f: impl Fn(&[f64]) -> f64) -> Result<Vec<f64>> {
    Ok(data.columns.iter().map(|c| f(c.as_slice())).collect())
}

fn iq_range(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, |c| quantile(c, 0.75) - quantile(c, 0.25))
}

fn kurtosis_of(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, kurtosis)
}

fn max(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, |c| quantile(c, 1.0))
}

fn mean_of(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, mean)
}

fn median(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, |c| quantile(c, 0.5))
}

fn min(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, |c| quantile(c, 0.0))
}

fn nr_outliers(data: &StatisticalData, args: &FeatureArgs) -> Result<Vec<f64>> {
    let whis = args.f64_or("whis", 1.5, |w| w.is_finite() && w >= 0.0)?;
    let count = data
        .columns
        .iter()
        .filter(|c| {
            let (q1, q3) = (quantile(c, 0.25), quantile(c, 0.75));
            let reach = whis * (q3 - q1);
            c.iter().any(|&v| v < q1 - reach || v > q3 + reach)
        })
        .count();
    Ok(vec![count as f64])
}

fn range(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, |c| quantile(c, 1.0) - quantile(c, 0.0))
}

fn sd(data: &StatisticalData, args: &FeatureArgs) -> Result<Vec<f64>> {
    let ddof = args.usize_or("ddof", 1)?;
    each(data, |c| var(c, ddof).sqrt())
}

fn skewness_of(data: &StatisticalData, _: &FeatureArgs) -> Result<Vec<f64>> {
    each(data, skewness)
}

/// Mean after cutting `pcut` of the sorted values from each end.
fn t_mean(data: &StatisticalData, args: &FeatureArgs) -> Result<Vec<f64>> {
    let pcut = args.f64_or("pcut", 0.2, |p| (0.0..0.5).contains(&p))?;
    each(data, |c| {
        let mut sorted = c.to_vec();
        sorted.sort_by(f64::total_cmp);
        let cut = (pcut * sorted.len() as f64).floor() as usize;
        mean(&sorted[cut..sorted.len() - cut])
    })
}

fn var_of(data: &StatisticalData, args: &FeatureArgs) -> Result<Vec<f64>> {
    let ddof = args.usize_or("ddof", 1)?;
    each(data, |c| var(c, ddof))
}
