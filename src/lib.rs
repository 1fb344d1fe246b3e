//! rusty-mfe: meta-feature extraction for classification datasets
//!
//! ```text
//!   MfeOptions ──► Config ──► Mfe ──fit(X, y, FitOptions)──► Dataset + Precomputed
//!                                │
//!                                └──extract(ExtractOptions)──► Extraction
//!                                          │
//!                                          └──► Diagnostics (warnings)
//! ```
//!
//! Every user-facing option is a [`Value`], so a wrong kind of argument
//! ([`MfeError::Type`]) is told apart from an acceptable kind with an
//! unacceptable value ([`MfeError::Value`]).

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod groups;
pub mod mfe;
pub mod options;
pub mod precompute;
pub mod sample;
pub mod scoring;
pub mod summary;
pub mod tree;
pub mod value;

pub use config::{Config, FitOptions, MfeOptions, TimeOpt};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{ErrorKind, MfeError, Result};
pub use groups::Group;
pub use mfe::{ExtractOptions, Extraction, FeatureDescription, Mfe};
pub use options::{process_generic_option, process_generic_set};
pub use value::Value;
