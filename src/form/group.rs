//! Field Presentation Grouper
//!
//! Turns a resolved field table into compact summary lines for an LLM:
//! a checked box is paired with its free-text detail field, unchecked and
//! empty fields are dropped, everything else becomes a `name: value` bullet.

use super::resolve::ResolvedTable;
use super::token::{NO, YES};
use serde::{Deserialize, Serialize};

/// Suffix that names a checkbox's detail field (`HasVehicle` → `HasVehicle0`).
pub const DEFAULT_DETAIL_SUFFIX: &str = "0";

/// How fields are interpreted and paired for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingPolicy {
    /// Fold `On`/`Off`, `1`/`0`, ... into `Yes`/`No`.
    pub interpret_boolean: bool,
    /// Naming heuristic for detail fields; empty disables pairing.
    pub detail_suffix: String,
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self {
            interpret_boolean: true,
            detail_suffix: DEFAULT_DETAIL_SUFFIX.to_string(),
        }
    }
}

impl GroupingPolicy {
    pub fn raw() -> Self {
        Self {
            interpret_boolean: false,
            ..Self::default()
        }
    }

    /// Name of the detail field paired with `name`, if pairing is enabled.
    pub fn detail_name(&self, name: &str) -> Option<String> {
        if self.detail_suffix.is_empty() {
            None
        } else {
            Some(format!("{name}{}", self.detail_suffix))
        }
    }
}

/// One presented field, optionally with its detail elaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    pub base_name: String,
    pub primary_value: Option<String>,
    /// Present only when the detail field exists in the table.
    pub detail_value: Option<String>,
}

impl FieldGroup {
    pub fn is_checked(&self) -> bool {
        self.primary_value.as_deref() == Some(YES)
    }

    /// Summary line for this group.
    pub fn render(&self) -> String {
        let value = self.primary_value.as_deref().unwrap_or_default();
        if !self.is_checked() {
            return format!("• {}: {}", self.base_name, value);
        }
        match self.detail_value.as_deref().map(str::trim) {
            Some(detail) if !detail.is_empty() => {
                format!("✓ {}: {} (details: {})", self.base_name, YES, detail)
            }
            _ => format!("✓ {}: {}", self.base_name, YES),
        }
    }
}

/// Group resolved fields for presentation, in table order.
///
/// Empty fields and fields normalizing to `No` are dropped. A detail field
/// consumed by a presented base is never presented on its own.
pub fn group_fields(resolved: &ResolvedTable, policy: &GroupingPolicy) -> Vec<FieldGroup> {
    let mut processed = std::collections::HashSet::new();
    let mut groups = Vec::new();

    for field in resolved.iter() {
        let name = field.qualified_name.as_str();
        if !processed.insert(name) {
            continue;
        }

        let value = match field.canonical_value(policy.interpret_boolean) {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };
        if value == NO {
            continue;
        }

        let mut detail_value = None;
        if let Some(detail) = policy.detail_name(name).and_then(|n| resolved.get(&n)) {
            processed.insert(detail.qualified_name.as_str());
            detail_value = detail.canonical_value(policy.interpret_boolean);
        }

        groups.push(FieldGroup {
            base_name: name.to_string(),
            primary_value: Some(value),
            detail_value,
        });
    }

    groups
}

/// Summary lines ready to be joined with newlines.
pub fn format_fields(resolved: &ResolvedTable, policy: &GroupingPolicy) -> Vec<String> {
    group_fields(resolved, policy)
        .iter()
        .map(FieldGroup::render)
        .collect()
}
