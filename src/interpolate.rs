//! Substitution of dashboard-scoped variables into query text

use crate::query::TimeRange;
use crate::value::display_value;
use serde_json::Value;
use std::collections::BTreeMap;

/// Placeholder name for the start of the dashboard time range.
pub const FROM_VARIABLE: &str = "__from";
/// Placeholder name for the end of the dashboard time range.
pub const TO_VARIABLE: &str = "__to";

/// Variables resolved for a single query, keyed by name without the `$`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopedVars {
    vars: BTreeMap<String, Value>,
}

impl ScopedVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `__from` and `__to` as epoch milliseconds of the time range.
    pub fn from_time_range(range: &TimeRange) -> Self {
        let mut vars = ScopedVars::new();
        vars.insert(FROM_VARIABLE, range.from.timestamp_millis());
        vars.insert(TO_VARIABLE, range.to.timestamp_millis());
        vars
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Replaces every literal `$<name>` in `query` with the value of `name`.
///
/// The text is scanned once from left to right, so substituted values are
/// never re-interpolated. When several names match at the same position the
/// longest one wins. Names missing from `vars` are left as written.
pub fn interpolate_variables(query: &str, vars: &ScopedVars) -> String {
    if vars.is_empty() {
        return query.to_string();
    }

    let mut names: Vec<(&str, String)> = vars
        .vars
        .iter()
        .map(|(name, value)| (name.as_str(), display_value(value)))
        .collect();
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut result = String::with_capacity(query.len());
    let mut rest = query;
    while let Some(pos) = rest.find('$') {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match names.iter().find(|(name, _)| after.starts_with(name)) {
            Some((name, replacement)) => {
                result.push_str(replacement);
                rest = &after[name.len()..];
            }
            None => {
                result.push('$');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}
