use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use rusty_mfe::sample::{load_xy, Sample};
use rusty_mfe::{
    Diagnostic, Diagnostics, ExtractOptions, Extraction, FitOptions, Mfe, MfeOptions, Value,
};

#[derive(Parser)]
#[command(name = "rusty-mfe")]
#[command(about = "Extract meta-features from a classification dataset")]
#[command(version)]
struct Cli {
    /// Print the metafeature catalogue as JSON and exit
    #[arg(long)]
    describe: bool,

    /// Sample dataset used when the request carries no data
    #[arg(long, value_enum, default_value = "mixed")]
    sample: SampleArg,

    /// Write the JSON report to this file; progress lines then go to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extraction request (JSON)
    request: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SampleArg {
    Mixed,
    Numeric,
    Categorical,
}

impl From<SampleArg> for Sample {
    fn from(arg: SampleArg) -> Self {
        match arg {
            SampleArg::Mixed => Sample::Mixed,
            SampleArg::Numeric => Sample::Numeric,
            SampleArg::Categorical => Sample::Categorical,
        }
    }
}

/// An extraction request read from a JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Request {
    options: MfeOptions,
    fit: FitOptions,
    verbose: bool,
    /// Keyword arguments per metafeature.
    args: BTreeMap<String, BTreeMap<String, Value>>,
    /// Inline data; the chosen sample dataset is used when absent.
    x: Option<Value>,
    y: Option<Value>,
}

#[derive(Serialize)]
struct Report<'a> {
    metafeatures: BTreeMap<&'a str, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    times: Option<BTreeMap<&'a str, f64>>,
    warnings: &'a [Diagnostic],
}

fn load_request(path: &Path) -> Result<Request> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn report<'a>(extraction: &'a Extraction, diag: &'a Diagnostics) -> Report<'a> {
    Report {
        metafeatures: extraction.iter().collect(),
        times: extraction.times.as_ref().map(|times| {
            extraction
                .names
                .iter()
                .map(String::as_str)
                .zip(times.iter().copied())
                .collect()
        }),
        warnings: diag.records(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.describe {
        let rows = Mfe::metafeature_description();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let request = match &cli.request {
        Some(path) => load_request(path)?,
        None => Request::default(),
    };
    let (x, y) = match (request.x, request.y) {
        (Some(x), Some(y)) => (x, y),
        (None, None) => load_xy(cli.sample.into()),
        _ => bail!("a request must give both 'x' and 'y', or neither"),
    };

    let mut diag = Diagnostics::new();
    let mut mfe = Mfe::new(request.options).context("Invalid extractor options")?;
    mfe.fit(x, y, request.fit, &mut diag)
        .context("Failed to fit the data")?;

    let options = ExtractOptions {
        verbose: request.verbose,
        args: request.args,
    };

    match &cli.output {
        Some(path) => {
            let extraction = mfe
                .extract(&options, &mut diag)
                .context("Failed to extract metafeatures")?;
            let json = serde_json::to_string_pretty(&report(&extraction, &diag))?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            // stdout carries the report, so progress goes to stderr
            let extraction = mfe
                .extract_to(&options, &mut diag, &mut std::io::stderr())
                .context("Failed to extract metafeatures")?;
            println!("{}", serde_json::to_string_pretty(&report(&extraction, &diag))?);
        }
    }
    Ok(())
}
