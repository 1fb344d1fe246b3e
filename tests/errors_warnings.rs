//! Error and warning contract of the extractor.

use rusty_mfe::sample::{load_xy, Sample};
use rusty_mfe::{
    process_generic_option, process_generic_set, DiagnosticKind, Diagnostics, ExtractOptions,
    FitOptions, Mfe, MfeError, MfeOptions, Value,
};

fn fit(options: MfeOptions, fit_options: FitOptions) -> Result<(Mfe, Diagnostics), MfeError> {
    let (x, y) = load_xy(Sample::Mixed);
    let mut diag = Diagnostics::new();
    let mut mfe = Mfe::new(options)?;
    mfe.fit(x, y, fit_options, &mut diag)?;
    Ok((mfe, diag))
}

fn fit_default() -> Mfe {
    fit(MfeOptions::default(), FitOptions::default()).unwrap().0
}

// ---------------------------------------------------------------------------
// Data binding
// ---------------------------------------------------------------------------

#[test]
fn test_error_empty_data_none() {
    let mut mfe = Mfe::new(MfeOptions::default()).unwrap();
    let err = mfe
        .fit(Value::None, Value::None, FitOptions::default(), &mut Diagnostics::new())
        .unwrap_err();
    assert!(err.is_type_error(), "{err}");
}

#[test]
fn test_error_x_unset_after_fit() {
    let mut mfe = fit_default();
    mfe.set_x(Value::None);
    let err = mfe
        .extract(&ExtractOptions::default(), &mut Diagnostics::new())
        .unwrap_err();
    assert!(err.is_type_error(), "{err}");
}

#[test]
fn test_error_y_unset_after_fit() {
    let mut mfe = fit_default();
    mfe.set_y(Value::None);
    let err = mfe
        .extract(&ExtractOptions::default(), &mut Diagnostics::new())
        .unwrap_err();
    assert!(err.is_type_error(), "{err}");
}

#[test]
fn test_error_empty_data_lists() {
    let mut mfe = Mfe::new(MfeOptions::default()).unwrap();
    let err = mfe
        .fit(
            Value::List(vec![]),
            Value::List(vec![]),
            FitOptions::default(),
            &mut Diagnostics::new(),
        )
        .unwrap_err();
    assert!(err.is_value_error(), "{err}");
}

#[test]
fn test_error_data_wrong_shape() {
    let (x, y) = load_xy(Sample::Mixed);
    let Value::List(mut labels) = y else {
        panic!("labels should be a list");
    };
    labels.pop();
    let mut mfe = Mfe::new(MfeOptions::default()).unwrap();
    let err = mfe
        .fit(x, Value::List(labels), FitOptions::default(), &mut Diagnostics::new())
        .unwrap_err();
    assert!(err.is_value_error(), "{err}");
}

#[test]
fn test_rebinding_valid_data_recovers() {
    let mut mfe = fit(
        MfeOptions::default().with_features("nr_inst"),
        FitOptions::default(),
    )
    .unwrap()
    .0;
    let (x, y) = load_xy(Sample::Numeric);
    mfe.set_x(x);
    mfe.set_y(y);
    let res = mfe
        .extract(&ExtractOptions::default(), &mut Diagnostics::new())
        .unwrap();
    assert_eq!(res.get("nr_inst"), Some(60.0));
}

// ---------------------------------------------------------------------------
// Construction options
// ---------------------------------------------------------------------------

#[test]
fn test_error_invalid_groups_value() {
    let cases = [
        Value::from("land-marking"),
        Value::from("infotheo"),
        Value::from("generalgeneral"),
        Value::from("generalstatistical"),
        Value::from(["general", "statistical", "invalid"]),
        Value::from(["invalid"]),
        Value::from(0),
        Value::None,
        Value::List(vec![]),
    ];
    for groups in cases {
        let err = Mfe::new(MfeOptions::default().with_groups(groups.clone())).unwrap_err();
        assert!(err.is_value_error(), "groups={groups}: {err}");
    }
}

#[test]
fn test_error_invalid_groups_type() {
    for groups in [Value::from(1), Value::opaque("lambda x: x"), Value::from(1..5)] {
        let err = Mfe::new(MfeOptions::default().with_groups(groups.clone())).unwrap_err();
        assert!(err.is_type_error(), "groups={groups}: {err}");
    }
}

#[test]
fn test_error_random_state() {
    let err = Mfe::new(MfeOptions::default().with_random_state(1.5)).unwrap_err();
    assert!(err.is_value_error());
}

#[test]
fn test_error_folds() {
    let err = Mfe::new(MfeOptions::default().with_folds(1.5)).unwrap_err();
    assert!(err.is_value_error());
}

#[test]
fn test_error_invalid_timeopt() {
    let err = fit(
        MfeOptions::default().with_measure_time("invalid"),
        FitOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_value_error());
}

#[test]
fn test_error_unknown_summary() {
    for summary in ["meanmean", "invalid"] {
        let err = Mfe::new(MfeOptions::default().with_summary(summary)).unwrap_err();
        assert!(err.is_value_error(), "summary={summary}");
    }
}

#[test]
fn test_error_invalid_features() {
    for features in [Value::None, Value::List(vec![]), Value::from("")] {
        let err = Mfe::new(MfeOptions::default().with_features(features.clone())).unwrap_err();
        assert!(err.is_value_error(), "features={features}");
    }
}

#[test]
fn test_error_invalid_score() {
    let cases = [
        Value::None,
        Value::List(vec![]),
        Value::from(""),
        Value::from("invalid"),
        Value::from("accuracyaccuracy"),
    ];
    for score in cases {
        let err = Mfe::new(MfeOptions::default().with_score(score.clone())).unwrap_err();
        assert!(err.is_value_error(), "score={score}");
    }
}

// ---------------------------------------------------------------------------
// Fit options
// ---------------------------------------------------------------------------

#[test]
fn test_error_cat_cols() {
    for cat_cols in [Value::from(1), Value::from("all")] {
        let err = fit(
            MfeOptions::default(),
            FitOptions::default().with_cat_cols(cat_cols.clone()),
        )
        .unwrap_err();
        assert!(err.is_value_error(), "cat_cols={cat_cols}");
    }
}

#[test]
fn test_error_invalid_rescale_value() {
    for rescale in ["", "invalid", "minmax"] {
        let err = fit(
            MfeOptions::default(),
            FitOptions::default().with_rescale(rescale),
        )
        .unwrap_err();
        assert!(err.is_value_error(), "rescale={rescale:?}");
    }
}

#[test]
fn test_error_invalid_rescale_type() {
    let err = fit(
        MfeOptions::default(),
        FitOptions::default().with_rescale(Value::List(vec![])),
    )
    .unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn test_valid_rescale_and_cat_cols() {
    let fit_options = FitOptions::default()
        .with_rescale("min-max")
        .with_cat_cols(vec![4, 5]);
    assert!(fit(MfeOptions::default().with_groups("general"), fit_options).is_ok());
}

// ---------------------------------------------------------------------------
// Generic validators
// ---------------------------------------------------------------------------

#[test]
fn test_error_process_generic_option_value() {
    let cases: [(Value, &str, bool, bool); 13] = [
        (Value::None, "groups", false, true),
        (Value::None, "groups", false, false),
        (Value::from(""), "group", false, false),
        (Value::from(""), "group", true, false),
        (Value::from("invalid"), "groups", false, false),
        (Value::from("all"), "invalid", false, false),
        (Value::from("invalid"), "groups", false, true),
        (Value::from("invalid"), "groups", true, false),
        (Value::from("invalid"), "groups", true, true),
        (Value::from("mean"), "summary", true, true),
        (Value::from("all"), "summary", true, true),
        (Value::from("num_inst"), "features", true, true),
        (Value::from("all"), "features", true, true),
    ];
    for (value, group_name, allow_none, allow_empty) in cases {
        let err = process_generic_option(&value, Some(group_name), allow_none, allow_empty)
            .unwrap_err();
        assert!(err.is_value_error(), "{value} / {group_name}: {err}");
    }
}

#[test]
fn test_error_process_generic_option_type() {
    let values = Value::from(vec![1, 2, 3]);
    assert!(process_generic_option(&values, None, false, false)
        .unwrap_err()
        .is_type_error());
    assert!(process_generic_option(&values, Some("timeopt"), false, false)
        .unwrap_err()
        .is_type_error());
}

#[test]
fn test_error_process_generic_set_value() {
    let cases: [(Value, &str, bool, bool); 14] = [
        (Value::None, "groups", false, true),
        (Value::None, "groups", false, false),
        (Value::from(""), "group", false, false),
        (Value::List(vec![]), "groups", true, false),
        (Value::List(vec![]), "groups", false, false),
        (Value::from("invalid"), "groups", false, false),
        (Value::from("all"), "invalid", false, false),
        (Value::from("invalid"), "groups", false, true),
        (Value::from("invalid"), "groups", true, false),
        (Value::from("invalid"), "groups", true, true),
        (Value::from("mean"), "summary", true, true),
        (Value::from("all"), "summary", true, true),
        (Value::from("num_inst"), "features", true, true),
        (Value::from("all"), "features", true, true),
    ];
    for (values, group_name, allow_none, allow_empty) in cases {
        let err = process_generic_set(&values, Some(group_name), allow_none, allow_empty)
            .unwrap_err();
        assert!(err.is_value_error(), "{values} / {group_name}: {err}");
    }
}

#[test]
fn test_error_process_generic_set_type() {
    let err = process_generic_set(&Value::from(vec![1, 2, 3]), None, false, false).unwrap_err();
    assert!(err.is_type_error());
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[test]
fn test_warning_invalid_features() {
    let cases = [
        ("invalid", "all", DiagnosticKind::UnknownFeature),
        ("invalid", "general", DiagnosticKind::UnknownFeature),
        ("mean", "info-theory", DiagnosticKind::FeatureOutsideGroups),
        ("nr_instt", "general", DiagnosticKind::UnknownFeature),
    ];
    for (features, groups, kind) in cases {
        let options = MfeOptions::default()
            .with_features(features)
            .with_groups(groups);
        let (mut mfe, _) = fit(options, FitOptions::default()).unwrap();
        let mut diag = Diagnostics::new();
        let res = mfe.extract(&ExtractOptions::default(), &mut diag).unwrap();
        assert!(res.is_empty());
        assert!(diag.has(kind), "{features} / {groups}: {:?}", diag.records());
    }
}

#[test]
fn test_warning_invalid_precomp() {
    let cases = [
        (Value::from("all"), Value::from("invalid")),
        (Value::from("general"), Value::from("statistical")),
        (Value::from("info-theory"), Value::from("general")),
        (
            Value::from(["general", "statistical"]),
            Value::from(["general", "info-theory"]),
        ),
    ];
    for (groups, precomp_groups) in cases {
        let (_, diag) = fit(
            MfeOptions::default().with_groups(groups.clone()),
            FitOptions::default().with_precomp_groups(precomp_groups.clone()),
        )
        .unwrap();
        assert!(
            diag.has(DiagnosticKind::UnmatchedPrecompGroup),
            "{groups} / {precomp_groups}"
        );
    }
}

#[test]
fn test_warning_invalid_argument() {
    let (mut mfe, _) = fit(MfeOptions::default().with_features("sd"), FitOptions::default()).unwrap();
    let options = ExtractOptions::default()
        .arg("sd", "ddof", 1)
        .arg("sd", "invalid", "value?");
    let mut diag = Diagnostics::new();
    let res = mfe.extract(&options, &mut diag).unwrap();
    assert_eq!(diag.len(), 1);
    assert_eq!(diag.records()[0].kind, DiagnosticKind::UnusedArgument);
    assert_eq!(diag.records()[0].subject, "sd.invalid");
    assert!(res.get("sd.mean").is_some());
}

#[test]
fn test_warning_argument_for_unselected_feature() {
    let (mut mfe, _) = fit(MfeOptions::default().with_features("sd"), FitOptions::default()).unwrap();
    let mut diag = Diagnostics::new();
    mfe.extract(&ExtractOptions::default().arg("var", "ddof", 0), &mut diag)
        .unwrap();
    assert!(diag.has(DiagnosticKind::UnusedArgument));
}

#[test]
fn test_invalid_argument_value_is_an_error() {
    let (mut mfe, _) = fit(MfeOptions::default().with_features("sd"), FitOptions::default()).unwrap();
    let err = mfe
        .extract(
            &ExtractOptions::default().arg("sd", "ddof", "one"),
            &mut Diagnostics::new(),
        )
        .unwrap_err();
    assert!(err.is_type_error());
}

// ---------------------------------------------------------------------------
// Verbose stream
// ---------------------------------------------------------------------------

#[test]
fn test_verbose() {
    let options =
        MfeOptions::default().with_features(["freq_class", "mean", "class_conc", "one_nn", "nodes"]);
    let (mut mfe, _) = fit(options, FitOptions::default()).unwrap();
    let mut out: Vec<u8> = Vec::new();
    mfe.extract_to(
        &ExtractOptions::default().verbose(true),
        &mut Diagnostics::new(),
        &mut out,
    )
    .unwrap();
    let captured = String::from_utf8(out).unwrap();
    assert_eq!(captured.matches('\n').count(), 21, "{captured}");
}

#[test]
fn test_quiet_writes_nothing() {
    let (mut mfe, _) = fit(MfeOptions::default().with_features("nr_inst"), FitOptions::default()).unwrap();
    let mut out: Vec<u8> = Vec::new();
    mfe.extract_to(&ExtractOptions::default(), &mut Diagnostics::new(), &mut out)
        .unwrap();
    assert!(out.is_empty());
}

// ---------------------------------------------------------------------------
// Large inputs
// ---------------------------------------------------------------------------

#[test]
fn test_deep_tree_on_alternating_labels() {
    let n = 3000;
    let x = Value::from((0..n).map(|i| vec![i as f64]).collect::<Vec<_>>());
    let y = Value::from((0..n).map(|i| (i % 2) as i64).collect::<Vec<_>>());
    let mut mfe = Mfe::new(
        MfeOptions::default()
            .with_groups("model-based")
            .with_features("nodes"),
    )
    .unwrap();
    let mut diag = Diagnostics::new();
    mfe.fit(x, y, FitOptions::default(), &mut diag).unwrap();
    let res = mfe.extract_to(&ExtractOptions::default(), &mut diag, &mut std::io::sink()).unwrap();
    assert_eq!(res.get("nodes"), Some((n - 1) as f64));
}
