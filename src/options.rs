use std::fmt;

use crate::config::TimeOpt;
use crate::data::Rescale;
use crate::error::{MfeError, Result};
use crate::groups::Group;
use crate::scoring::Score;
use crate::value::Value;

/// Selector value meaning "every member of the whitelist".
pub const WILDCARD: &str = "all";

/// The whitelists the generic validators know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionGroup {
    Groups,
    Score,
    Rescale,
    TimeOpt,
}

impl OptionGroup {
    pub const ALL: [OptionGroup; 4] = [
        OptionGroup::Groups,
        OptionGroup::Score,
        OptionGroup::Rescale,
        OptionGroup::TimeOpt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OptionGroup::Groups => "groups",
            OptionGroup::Score => "score",
            OptionGroup::Rescale => "rescale",
            OptionGroup::TimeOpt => "timeopt",
        }
    }

    /// Resolve a whitelist key. Summary functions and metafeature names have
    /// their own registries and are not generic groups.
    pub fn from_name(name: &str) -> Result<OptionGroup> {
        let lowered = name.to_ascii_lowercase();
        OptionGroup::ALL
            .into_iter()
            .find(|g| g.name() == lowered)
            .ok_or_else(|| {
                MfeError::value_error(
                    "group_name",
                    format!(
                        "unknown group name '{name}' (must be one of: {})",
                        OptionGroup::ALL.map(OptionGroup::name).join(", ")
                    ),
                )
            })
    }

    pub fn valid_values(self) -> Vec<&'static str> {
        match self {
            OptionGroup::Groups => Group::ALL.iter().map(|g| g.name()).collect(),
            OptionGroup::Score => Score::ALL.iter().map(|s| s.name()).collect(),
            OptionGroup::Rescale => Rescale::ALL.iter().map(|r| r.name()).collect(),
            OptionGroup::TimeOpt => TimeOpt::ALL.iter().map(|t| t.name()).collect(),
        }
    }
}

impl fmt::Display for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn resolve_group_name(group_name: Option<&str>) -> Result<OptionGroup> {
    let name = group_name
        .ok_or_else(|| MfeError::type_error("group_name", "can not be None"))?;
    OptionGroup::from_name(name)
}

/// Validate a single scalar selector against the `group_name` whitelist.
///
/// Returns the canonical (lowercase) value, or `None` when an absent or
/// empty value is explicitly allowed.
pub fn process_generic_option(
    value: &Value,
    group_name: Option<&str>,
    allow_none: bool,
    allow_empty: bool,
) -> Result<Option<String>> {
    let group = resolve_group_name(group_name)?;
    let param = group.name();

    let text = match value {
        Value::None if allow_none => return Ok(None),
        Value::None => return Err(MfeError::value_error(param, "can not be None")),
        Value::Str(s) => s,
        other => {
            return Err(MfeError::type_error(
                param,
                format!("expected a string, got {} ({other})", other.kind_name()),
            ))
        }
    };

    if text.is_empty() {
        if allow_empty {
            return Ok(None);
        }
        return Err(MfeError::value_error(param, "can not be empty"));
    }

    let valid = group.valid_values();
    let selected = check_in_whitelist(vec![text.to_ascii_lowercase()], param, &valid, false)?;
    Ok(selected.first().map(|s| s.to_string()))
}

/// Validate a collection-valued selector against the `group_name` whitelist.
///
/// Accepts a single string, a list of strings, or the [`WILDCARD`]. Returns
/// the selected members in whitelist order, without duplicates.
pub fn process_generic_set(
    values: &Value,
    group_name: Option<&str>,
    allow_none: bool,
    allow_empty: bool,
) -> Result<Vec<String>> {
    let group = resolve_group_name(group_name)?;
    let param = group.name();

    if values.is_none() {
        if allow_none {
            return Ok(Vec::new());
        }
        return Err(MfeError::value_error(param, "can not be None"));
    }
    if values.is_blank() {
        if allow_empty {
            return Ok(Vec::new());
        }
        return Err(MfeError::value_error(param, "can not be empty"));
    }

    let names = collect_names(values, param)?;
    let valid = group.valid_values();
    let selected = check_in_whitelist(names, param, &valid, true)?;
    Ok(selected.into_iter().map(String::from).collect())
}

/// Turn a present, non-blank selector into lowercase names in first-seen
/// order. Anything other than a string or a list of strings is a type error.
pub(crate) fn collect_names(values: &Value, param: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    match values {
        Value::Str(s) => names.push(s.to_ascii_lowercase()),
        Value::List(items) => {
            for item in items {
                let Value::Str(s) = item else {
                    return Err(MfeError::type_error(
                        param,
                        format!(
                            "elements must be strings, got {} ({item})",
                            item.kind_name()
                        ),
                    ));
                };
                let lowered = s.to_ascii_lowercase();
                if !names.contains(&lowered) {
                    names.push(lowered);
                }
            }
        }
        other => {
            return Err(MfeError::type_error(
                param,
                format!(
                    "expected a string or a sequence of strings, got {} ({other})",
                    other.kind_name()
                ),
            ))
        }
    }
    Ok(names)
}

/// Check every name against `valid` (exact match only). With `wildcard`,
/// a lone [`WILDCARD`] expands to the whole whitelist.
pub(crate) fn check_in_whitelist(
    names: Vec<String>,
    param: &str,
    valid: &[&'static str],
    wildcard: bool,
) -> Result<Vec<&'static str>> {
    if wildcard && names.iter().any(|n| n == WILDCARD) {
        if names.len() == 1 {
            return Ok(valid.to_vec());
        }
        return Err(MfeError::value_error(
            param,
            format!("'{WILDCARD}' can not be combined with other values"),
        ));
    }

    let unknown: Vec<&String> = names
        .iter()
        .filter(|n| !valid.contains(&n.as_str()))
        .collect();
    if !unknown.is_empty() {
        let unknown: Vec<&str> = unknown.iter().map(|s| s.as_str()).collect();
        return Err(MfeError::value_error(
            param,
            format!(
                "unknown value(s) {:?} (must be one of: {})",
                unknown,
                valid.join(", ")
            ),
        ));
    }

    Ok(valid
        .iter()
        .copied()
        .filter(|v| names.iter().any(|n| n == v))
        .collect())
}
