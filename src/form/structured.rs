//! Structured view of form fields for machine consumers (`pdfqa json`)

use super::group::{FieldGroup, GroupingPolicy};
use super::resolve::ResolvedTable;
use super::table::FieldType;
use super::token::{CheckState, Token};
use indexmap::IndexMap;
use serde::Serialize;

/// One field with both its raw and interpreted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretedField {
    pub raw_value: Option<Token>,
    pub interpreted_value: String,
    pub field_type: FieldType,
    pub is_checked: bool,
    pub is_unchecked: bool,
}

/// Every field with a non-empty interpreted value, in table order.
pub fn interpreted_fields(
    resolved: &ResolvedTable,
    policy: &GroupingPolicy,
) -> IndexMap<String, InterpretedField> {
    resolved
        .iter()
        .filter_map(|field| {
            let interpreted_value = field
                .canonical_value(policy.interpret_boolean)
                .filter(|v| !v.is_empty())?;
            let state = CheckState::of(field.state.as_ref());
            Some((
                field.qualified_name.clone(),
                InterpretedField {
                    raw_value: field.state.clone(),
                    interpreted_value,
                    field_type: field.field_type,
                    is_checked: state == Some(CheckState::Checked),
                    is_unchecked: state == Some(CheckState::Unchecked),
                },
            ))
        })
        .collect()
}

/// Groups keyed by base name: a name ending in the detail suffix feeds the
/// `detail_value` of the group named without it, any other name feeds
/// `primary_value`. Fields without a non-empty value contribute nothing.
pub fn suffix_groups(
    resolved: &ResolvedTable,
    policy: &GroupingPolicy,
) -> IndexMap<String, FieldGroup> {
    let mut groups: IndexMap<String, FieldGroup> = IndexMap::new();

    for field in resolved.iter() {
        let Some(value) = field
            .canonical_value(policy.interpret_boolean)
            .filter(|v| !v.is_empty())
        else {
            continue;
        };

        let name = field.qualified_name.as_str();
        let base = strip_suffix(name, &policy.detail_suffix);
        let key = base.unwrap_or(name).to_string();
        let group = groups.entry(key.clone()).or_insert_with(|| FieldGroup {
            base_name: key,
            primary_value: None,
            detail_value: None,
        });
        if base.is_some() {
            group.detail_value = Some(value);
        } else {
            group.primary_value = Some(value);
        }
    }

    groups
}

fn strip_suffix<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() {
        return None;
    }
    name.strip_suffix(suffix).filter(|base| !base.is_empty())
}
