use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;

use crate::config::{Config, FeatureSelection, FitConfig, FitOptions, MfeOptions, TimeOpt};
use crate::data::{validate_xy, Dataset};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{MfeError, Result};
use crate::features::{self, FeatureArgs, FeatureSpec, OutputKind};
use crate::groups::Group;
use crate::options::process_generic_set;
use crate::precompute::{resolve_precomp_groups, Precomputed};
use crate::summary::Summary;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Extraction request and result
// ---------------------------------------------------------------------------

/// Options of one [`Mfe::extract`] call.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Write progress lines while extracting.
    pub verbose: bool,
    /// Keyword arguments per metafeature name.
    pub args: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ExtractOptions {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Add keyword argument `key` for `feature`.
    pub fn arg(mut self, feature: &str, key: &str, value: impl Into<Value>) -> Self {
        self.args
            .entry(feature.to_ascii_lowercase())
            .or_default()
            .insert(key.to_string(), value.into());
        self
    }
}

/// Extracted metafeatures, sorted by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub names: Vec<String>,
    pub values: Vec<f64>,
    /// Seconds spent on each value; present when `measure_time` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<f64>>,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// One row of [`Mfe::metafeature_description`].
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDescription {
    pub group: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Data bound by the last successful fit.
#[derive(Debug)]
struct Fitted {
    dataset: Dataset,
    precomputed: Precomputed,
}

/// Fit options kept so the data can be rebound after `set_x`/`set_y`.
#[derive(Debug, Clone)]
struct FitState {
    fit: FitConfig,
    precomp_groups: Vec<Group>,
}

#[derive(Debug)]
pub struct Mfe {
    config: Config,
    x: Value,
    y: Value,
    /// `None` until `fit` succeeds.
    fit_state: Option<FitState>,
    /// Dropped whenever the raw inputs change.
    fitted: Option<Fitted>,
}

impl Mfe {
    /// Validate the construction options.
    pub fn new(options: MfeOptions) -> Result<Self> {
        Ok(Mfe {
            config: Config::from_options(&options)?,
            x: Value::None,
            y: Value::None,
            fit_state: None,
            fitted: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind `x` (rows of attribute values) and `y` (one label per row).
    ///
    /// Shared values of the `precomp_groups` are computed here; precomputation
    /// entries that are unknown or not selected are reported to `diag`.
    pub fn fit(
        &mut self,
        x: impl Into<Value>,
        y: impl Into<Value>,
        options: FitOptions,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        let (x, y) = (x.into(), y.into());
        validate_xy(&x, &y)?;
        let fit = FitConfig::from_options(&options)?;
        let dataset = Dataset::bind(&x, &y, &fit.cat_cols)?;
        let precomp_groups =
            resolve_precomp_groups(&options.precomp_groups, &self.config.groups, diag)?;

        let mut precomputed = Precomputed::default();
        precomputed.precompute(&precomp_groups, &dataset, &self.config, &fit)?;

        log::info!(
            "fitted {} instances, {} attributes ({} categorical), {} classes",
            dataset.len(),
            dataset.n_attr(),
            dataset.categorical.len(),
            dataset.n_classes()
        );
        self.x = x;
        self.y = y;
        self.fit_state = Some(FitState {
            fit,
            precomp_groups,
        });
        self.fitted = Some(Fitted {
            dataset,
            precomputed,
        });
        Ok(())
    }

    /// Replace the bound attributes; checked on the next extraction.
    pub fn set_x(&mut self, x: impl Into<Value>) {
        self.x = x.into();
        self.fitted = None;
    }

    /// Replace the bound labels; checked on the next extraction.
    pub fn set_y(&mut self, y: impl Into<Value>) {
        self.y = y.into();
        self.fitted = None;
    }

    /// Extract the selected metafeatures, writing progress to stdout when
    /// `options.verbose` is set.
    pub fn extract(
        &mut self,
        options: &ExtractOptions,
        diag: &mut Diagnostics,
    ) -> Result<Extraction> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.extract_to(options, diag, &mut out)
    }

    /// Like [`Mfe::extract`], with progress lines written to `out`.
    pub fn extract_to<W: Write>(
        &mut self,
        options: &ExtractOptions,
        diag: &mut Diagnostics,
        out: &mut W,
    ) -> Result<Extraction> {
        let Some(state) = self.fit_state.clone() else {
            return Err(MfeError::type_error(
                "X",
                "no fitted data; call 'fit' before 'extract'",
            ));
        };
        validate_xy(&self.x, &self.y)?;
        if self.fitted.is_none() {
            let dataset = Dataset::bind(&self.x, &self.y, &state.fit.cat_cols)?;
            let mut precomputed = Precomputed::default();
            precomputed.precompute(&state.precomp_groups, &dataset, &self.config, &state.fit)?;
            log::debug!("rebound {} instances after input change", dataset.len());
            self.fitted = Some(Fitted {
                dataset,
                precomputed,
            });
        }
        let Some(fitted) = self.fitted.as_mut() else {
            return Err(MfeError::type_error("X", "no fitted data"));
        };

        let selected = select_features(&self.config, diag);
        let args = split_args(&options.args, &selected, diag);
        let groups: Vec<Group> = self
            .config
            .groups
            .iter()
            .copied()
            .filter(|g| selected.iter().any(|f| f.group == *g))
            .collect();

        let mut progress = Progress::new(out, options.verbose);
        progress.line(format_args!(
            "Started the metafeature extraction process ({} features in {} groups).",
            selected.len(),
            groups.len()
        ))?;

        let mut rows: Vec<(String, f64, f64)> = Vec::new();
        let mut done = 0usize;
        for group in groups {
            progress.line(format_args!("Started computing '{group}' metafeatures."))?;
            let data = fitted.precomputed.get_or_build(
                group,
                &fitted.dataset,
                &self.config,
                &state.fit,
            )?;

            for spec in selected.iter().filter(|f| f.group == group) {
                let feature_args = FeatureArgs::new(
                    spec.name,
                    args.get(spec.name).cloned().unwrap_or_default(),
                );
                let start = Instant::now();
                let raw = spec.run(&fitted.dataset, data, &feature_args)?;
                let elapsed = start.elapsed().as_secs_f64();
                done += 1;
                progress.line(format_args!(
                    "Done with '{}' feature ({:.2}% of all features done).",
                    spec.name,
                    100.0 * done as f64 / selected.len() as f64
                ))?;

                let produced = summarize(
                    spec,
                    &raw,
                    &self.config.summary,
                    elapsed,
                    self.config.measure_time,
                );
                progress.line(format_args!(
                    "Summarized '{}' into {} value(s).",
                    spec.name,
                    produced.len()
                ))?;
                rows.extend(produced);
            }
            progress.line(format_args!("Finished computing '{group}' metafeatures."))?;
        }

        rows.sort_by(|a, b| a.0.cmp(&b.0));
        log::info!("extracted {} metafeature values", rows.len());

        let times = self
            .config
            .measure_time
            .map(|_| rows.iter().map(|r| r.2).collect());
        let (names, values) = rows.into_iter().map(|(n, v, _)| (n, v)).unzip();
        Ok(Extraction {
            names,
            values,
            times,
        })
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn valid_groups() -> Vec<&'static str> {
        Group::ALL.iter().map(|g| g.name()).collect()
    }

    pub fn valid_summary() -> Vec<&'static str> {
        Summary::ALL.iter().map(|s| s.name()).collect()
    }

    /// Metafeature names of the given groups (`None` or `"all"` for every
    /// group), sorted.
    pub fn valid_metafeatures(groups: impl Into<Value>) -> Result<Vec<&'static str>> {
        let groups: Vec<Group> = process_generic_set(&groups.into(), Some("groups"), true, false)?
            .iter()
            .filter_map(|name| Group::from_name(name))
            .collect();
        let mut names: Vec<&'static str> = features::registry()
            .filter(|f| groups.is_empty() || groups.contains(&f.group))
            .map(|f| f.name)
            .collect();
        names.sort_unstable();
        Ok(names)
    }

    pub fn metafeature_description() -> Vec<FeatureDescription> {
        features::registry()
            .map(|f| FeatureDescription {
                group: f.group.name(),
                name: f.name,
                description: f.description,
                params: f.params,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verbose line writer; a no-op when not verbose.
struct Progress<'w, W: Write> {
    out: &'w mut W,
    verbose: bool,
}

impl<'w, W: Write> Progress<'w, W> {
    fn new(out: &'w mut W, verbose: bool) -> Self {
        Progress { out, verbose }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
        if self.verbose {
            writeln!(self.out, "{args}")?;
        }
        Ok(())
    }
}

/// Features to compute, in registry order. Requested names that are unknown
/// or outside the selected groups are reported and skipped.
fn select_features(config: &Config, diag: &mut Diagnostics) -> Vec<&'static FeatureSpec> {
    let active = |f: &FeatureSpec| config.groups.contains(&f.group);
    match &config.features {
        FeatureSelection::All => features::registry().filter(|f| active(*f)).collect(),
        FeatureSelection::Named(names) => {
            let mut wanted: BTreeSet<&'static str> = BTreeSet::new();
            for name in names {
                match features::lookup(name) {
                    None => diag.emit(
                        DiagnosticKind::UnknownFeature,
                        name.clone(),
                        format!("unknown feature '{name}'; ignored"),
                    ),
                    Some(spec) if !active(spec) => diag.emit(
                        DiagnosticKind::FeatureOutsideGroups,
                        name.clone(),
                        format!(
                            "feature '{name}' belongs to group '{}', which is not selected; ignored",
                            spec.group
                        ),
                    ),
                    Some(spec) => {
                        wanted.insert(spec.name);
                    }
                }
            }
            features::registry()
                .filter(|f| wanted.contains(f.name))
                .collect()
        }
    }
}

/// Keep the keyword arguments each selected feature consumes and report the
/// rest.
fn split_args(
    args: &BTreeMap<String, BTreeMap<String, Value>>,
    selected: &[&'static FeatureSpec],
    diag: &mut Diagnostics,
) -> BTreeMap<&'static str, BTreeMap<String, Value>> {
    let mut kept: BTreeMap<&'static str, BTreeMap<String, Value>> = BTreeMap::new();
    for (feature, values) in args {
        let Some(spec) = selected.iter().find(|f| f.name == feature.as_str()) else {
            diag.emit(
                DiagnosticKind::UnusedArgument,
                feature.clone(),
                format!("arguments given for feature '{feature}', which is not being extracted"),
            );
            continue;
        };
        for (key, value) in values {
            if spec.params.contains(&key.as_str()) {
                kept.entry(spec.name)
                    .or_default()
                    .insert(key.clone(), value.clone());
            } else {
                diag.emit(
                    DiagnosticKind::UnusedArgument,
                    format!("{feature}.{key}"),
                    format!("unused argument '{key}' for feature '{feature}'"),
                );
            }
        }
    }
    kept
}

/// Name, value and time of every output of one feature.
fn summarize(
    spec: &FeatureSpec,
    raw: &[f64],
    summaries: &[Summary],
    elapsed: f64,
    timeopt: Option<TimeOpt>,
) -> Vec<(String, f64, f64)> {
    let base_time = match timeopt {
        Some(TimeOpt::Avg) | Some(TimeOpt::AvgSumm) => elapsed / raw.len().max(1) as f64,
        _ => elapsed,
    };
    let with_summary = |summary_time: f64| match timeopt {
        Some(opt) if opt.includes_summary() => base_time + summary_time,
        _ => base_time,
    };

    if spec.kind == OutputKind::Scalar {
        let value = raw.first().copied().unwrap_or(f64::NAN);
        return vec![(spec.name.to_string(), value, base_time)];
    }
    if summaries.is_empty() {
        return raw
            .iter()
            .enumerate()
            .map(|(i, &v)| (format!("{}.{i}", spec.name), v, base_time))
            .collect();
    }

    let mut rows = Vec::new();
    for &summary in summaries {
        let start = Instant::now();
        let values = summary.apply(raw);
        let time = with_summary(start.elapsed().as_secs_f64());
        if summary.is_multi_valued() {
            rows.extend(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (format!("{}.{summary}.{i}", spec.name), v, time)),
            );
        } else {
            let value = values.first().copied().unwrap_or(f64::NAN);
            rows.push((format!("{}.{summary}", spec.name), value, time));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{load_xy, Sample};

    fn fitted(options: MfeOptions) -> Mfe {
        let (x, y) = load_xy(Sample::Mixed);
        let mut mfe = Mfe::new(options).unwrap();
        mfe.fit(x, y, FitOptions::default(), &mut Diagnostics::new())
            .unwrap();
        mfe
    }

    #[test]
    fn test_general_scalar_and_vector_names() {
        let mut mfe = fitted(MfeOptions::default().with_groups("general"));
        let mut diag = Diagnostics::new();
        let res = mfe.extract(&ExtractOptions::default(), &mut diag).unwrap();
        assert!(diag.is_empty());
        assert_eq!(res.get("nr_inst"), Some(150.0));
        assert!(res.get("freq_class.mean").is_some());
        assert!(res.get("freq_class.sd").is_some());
        assert!(res.times.is_none());
        let mut sorted = res.names.clone();
        sorted.sort();
        assert_eq!(sorted, res.names);
    }

    #[test]
    fn test_raw_values_without_summary() {
        let options = MfeOptions::default()
            .with_features("freq_class")
            .with_summary(Value::List(vec![]));
        let mut mfe = fitted(options);
        let res = mfe
            .extract(&ExtractOptions::default(), &mut Diagnostics::new())
            .unwrap();
        assert_eq!(res.names, vec!["freq_class.0", "freq_class.1", "freq_class.2"]);
    }

    #[test]
    fn test_multi_valued_summary_names() {
        let options = MfeOptions::default()
            .with_features("mean")
            .with_summary("quantiles");
        let mut mfe = fitted(options);
        let res = mfe
            .extract(&ExtractOptions::default(), &mut Diagnostics::new())
            .unwrap();
        assert_eq!(res.len(), 5);
        assert_eq!(res.names[0], "mean.quantiles.0");
    }

    #[test]
    fn test_measure_time_fills_times() {
        let options = MfeOptions::default()
            .with_features(["nr_inst", "sd"])
            .with_measure_time("total_summ");
        let mut mfe = fitted(options);
        let res = mfe
            .extract(&ExtractOptions::default(), &mut Diagnostics::new())
            .unwrap();
        let times = res.times.unwrap();
        assert_eq!(times.len(), res.names.len());
        assert!(times.iter().all(|t| *t >= 0.0));
    }

    #[test]
    fn test_args_are_applied_and_unused_reported() {
        let mut mfe = fitted(MfeOptions::default().with_features("sd").with_summary("mean"));
        let mut diag = Diagnostics::new();
        let base = mfe
            .extract(&ExtractOptions::default(), &mut diag)
            .unwrap()
            .get("sd.mean")
            .unwrap();
        let options = ExtractOptions::default()
            .arg("sd", "ddof", 0)
            .arg("sd", "foo", 1);
        let res = mfe.extract(&options, &mut diag).unwrap();
        assert!(res.get("sd.mean").unwrap() < base);
        assert_eq!(diag.len(), 1);
        assert!(diag.has(DiagnosticKind::UnusedArgument));
    }

    #[test]
    fn test_extract_before_fit() {
        let mut mfe = Mfe::new(MfeOptions::default()).unwrap();
        let err = mfe
            .extract(&ExtractOptions::default(), &mut Diagnostics::new())
            .unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_introspection() {
        assert_eq!(Mfe::valid_groups().len(), Group::ALL.len());
        assert!(Mfe::valid_summary().contains(&"histogram"));
        let general = Mfe::valid_metafeatures("general").unwrap();
        assert!(general.contains(&"nr_inst"));
        assert!(!general.contains(&"mean"));
        let all = Mfe::valid_metafeatures(Value::None).unwrap();
        assert_eq!(all.len(), Mfe::metafeature_description().len());
        assert!(Mfe::valid_metafeatures("generall").unwrap_err().is_value_error());
    }
}
