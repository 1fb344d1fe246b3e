use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A requested feature name is not known at all.
    UnknownFeature,
    /// A requested feature exists but belongs to no selected group.
    FeatureOutsideGroups,
    /// A `precomp_groups` entry is unknown or not an active group.
    UnmatchedPrecompGroup,
    /// A per-feature keyword argument was not consumed.
    UnusedArgument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The feature, group, or argument the diagnostic is about.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collector for diagnostics raised during a fit or extraction.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: DiagnosticKind, subject: impl Into<String>, message: String) {
        log::warn!("{message}");
        self.records.push(Diagnostic {
            kind,
            subject: subject.into(),
            message,
        });
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.records.iter().any(|d| d.kind == kind)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
