use std::fmt;

/// A named category of metafeatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    General,
    Statistical,
    InfoTheory,
    ModelBased,
    Landmarking,
}

impl Group {
    pub const ALL: [Group; 5] = [
        Group::General,
        Group::Statistical,
        Group::InfoTheory,
        Group::ModelBased,
        Group::Landmarking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Group::General => "general",
            Group::Statistical => "statistical",
            Group::InfoTheory => "info-theory",
            Group::ModelBased => "model-based",
            Group::Landmarking => "landmarking",
        }
    }

    /// Exact, case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Group> {
        let lowered = name.to_ascii_lowercase();
        Group::ALL.into_iter().find(|g| g.name() == lowered)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
