//! Field Hierarchy Resolver
//!
//! Walks parent links to compute each field's dotted qualified name, its
//! effective raw value (own value, else the nearest ancestor's) and its
//! effective type. Every walk is bounded: a cyclic or absurdly deep chain
//! fails for that one field and the rest of the table is still resolved.

use super::table::{FieldId, FieldTable, FieldType, RawField};
use super::token::{normalize, Token};
use crate::error::FieldError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Default bound on the number of nodes visited in one parent walk.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Which token decides a field's state when value and appearance disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatePrecedence {
    /// The (possibly inherited) value wins; the field's own appearance state
    /// is used only when no value exists anywhere in the chain.
    #[default]
    ValueFirst,
    /// The field's own appearance state wins; the value chain is the fallback.
    AppearanceFirst,
}

/// A field after hierarchy resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub id: FieldId,
    pub qualified_name: String,
    /// First declared type walking up the chain, `Unknown` if none.
    pub field_type: FieldType,
    pub effective_raw_value: Option<Token>,
    /// The field's own appearance state (never inherited).
    pub appearance_state: Option<Token>,
    pub default_value: Option<Token>,
    /// Token selected by the [`StatePrecedence`] in effect.
    pub state: Option<Token>,
}

impl ResolvedField {
    /// Canonical value of the selected state token.
    pub fn canonical_value(&self, interpret_boolean: bool) -> Option<String> {
        normalize(self.state.as_ref(), interpret_boolean)
    }
}

/// Resolved fields keyed by qualified name, in field-table order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTable {
    fields: IndexMap<String, ResolvedField>,
    /// Position in `fields` of each kept node.
    positions: HashMap<FieldId, usize>,
    failures: Vec<(FieldId, FieldError)>,
}

impl ResolvedTable {
    pub fn get(&self, qualified_name: &str) -> Option<&ResolvedField> {
        self.fields.get(qualified_name)
    }

    /// Field resolved from node `id`, if it was kept.
    pub fn by_id(&self, id: FieldId) -> Option<&ResolvedField> {
        let &position = self.positions.get(&id)?;
        self.fields.get_index(position).map(|(_, field)| field)
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.fields.contains_key(qualified_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields omitted because their hierarchy was malformed.
    pub fn failures(&self) -> &[(FieldId, FieldError)] {
        &self.failures
    }

    fn insert(&mut self, field: ResolvedField) {
        if self.fields.contains_key(&field.qualified_name) {
            debug!(name = %field.qualified_name, "duplicate qualified name, keeping first");
            return;
        }
        self.positions.insert(field.id, self.fields.len());
        self.fields.insert(field.qualified_name.clone(), field);
    }
}

/// Resolves a [`FieldTable`] into a [`ResolvedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    pub max_depth: usize,
    pub precedence: StatePrecedence,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            precedence: StatePrecedence::default(),
        }
    }
}

impl Resolver {
    pub fn new(max_depth: usize, precedence: StatePrecedence) -> Self {
        Self {
            max_depth,
            precedence,
        }
    }

    /// Resolve every field with at least one named segment.
    pub fn resolve(&self, table: &FieldTable) -> ResolvedTable {
        let mut resolved = ResolvedTable::default();
        for (id, _) in table.iter() {
            match self.resolve_field(table, id) {
                Ok(Some(field)) => resolved.insert(field),
                Ok(None) => {}
                Err(e) => {
                    warn!("omitting field: {}", e);
                    resolved.failures.push((id, e));
                }
            }
        }
        resolved
    }

    /// Resolve one field. `Ok(None)` when no node in its chain is named.
    pub fn resolve_field(
        &self,
        table: &FieldTable,
        id: FieldId,
    ) -> Result<Option<ResolvedField>, FieldError> {
        let Some(field) = table.get(id) else {
            return Ok(None);
        };

        let mut segments = Vec::new();
        let mut value = None;
        let mut field_type = None;
        for node in self.lineage(table, id) {
            let node = node?;
            if let Some(name) = node.name.as_deref().filter(|n| !n.is_empty()) {
                segments.push(name);
            }
            if value.is_none() {
                value = node.value.as_ref();
            }
            if field_type.is_none() {
                field_type = node.field_type;
            }
        }

        if segments.is_empty() {
            return Ok(None);
        }
        segments.reverse();

        let effective_raw_value = value.cloned();
        let appearance_state = field.appearance_state.clone();
        let state = match self.precedence {
            StatePrecedence::ValueFirst => effective_raw_value
                .clone()
                .or_else(|| appearance_state.clone()),
            StatePrecedence::AppearanceFirst => appearance_state
                .clone()
                .or_else(|| effective_raw_value.clone()),
        };

        Ok(Some(ResolvedField {
            id,
            qualified_name: segments.join("."),
            field_type: field_type.unwrap_or_default(),
            effective_raw_value,
            appearance_state,
            default_value: field.default_value.clone(),
            state,
        }))
    }

    /// Qualified name of a single field.
    pub fn qualified_name(
        &self,
        table: &FieldTable,
        id: FieldId,
    ) -> Result<Option<String>, FieldError> {
        Ok(self.resolve_field(table, id)?.map(|f| f.qualified_name))
    }

    /// Own value, else the nearest ancestor's. Never looks at children.
    pub fn effective_value<'a>(
        &self,
        table: &'a FieldTable,
        id: FieldId,
    ) -> Result<Option<&'a Token>, FieldError> {
        for node in self.lineage(table, id) {
            if let Some(value) = node?.value.as_ref() {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn lineage<'a>(&self, table: &'a FieldTable, start: FieldId) -> Lineage<'a> {
        Lineage {
            table,
            start,
            next: Some(start),
            steps: 0,
            max_depth: self.max_depth,
        }
    }
}

/// The field itself, then each ancestor up to the root.
struct Lineage<'a> {
    table: &'a FieldTable,
    start: FieldId,
    next: Option<FieldId>,
    steps: usize,
    max_depth: usize,
}

impl<'a> Iterator for Lineage<'a> {
    type Item = Result<&'a RawField, FieldError>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if self.steps >= self.max_depth {
            let field = self
                .table
                .get(self.start)
                .and_then(|f| f.name.clone())
                .unwrap_or_else(|| format!("#{}", self.start.index()));
            return Some(Err(FieldError::MalformedDocument {
                field,
                depth: self.max_depth,
            }));
        }
        let Some(node) = self.table.get(id) else {
            debug!(field = self.start.index(), parent = id.index(), "dangling parent reference");
            return None;
        };
        self.steps += 1;
        self.next = node.parent;
        Some(Ok(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(depth: usize) -> (FieldTable, FieldId) {
        let mut table = FieldTable::new();
        let mut id = table.push(RawField::named("n0"));
        for i in 1..depth {
            id = table.push_child(id, RawField::named(format!("n{i}")));
        }
        (table, id)
    }

    #[test]
    fn test_three_level_qualified_name() {
        let mut table = FieldTable::new();
        let gp = table.push(RawField::named("Grandparent"));
        let p = table.push_child(gp, RawField::named("Parent"));
        let c = table.push_child(p, RawField::named("Child"));

        let resolver = Resolver::default();
        assert_eq!(
            resolver.qualified_name(&table, c).unwrap().as_deref(),
            Some("Grandparent.Parent.Child")
        );

        let resolved = resolver.resolve(&table);
        let names: Vec<_> = resolved.names().collect();
        assert_eq!(names, vec!["Grandparent", "Grandparent.Parent", "Grandparent.Parent.Child"]);
    }

    #[test]
    fn test_child_inherits_parent_value() {
        let mut table = FieldTable::new();
        let p = table.push(RawField::named("Group").with_value(Token::name("Yes")));
        let c = table.push_child(p, RawField::named("Box"));

        let resolver = Resolver::default();
        assert_eq!(
            resolver.effective_value(&table, c).unwrap(),
            Some(&Token::name("Yes"))
        );
        let field = resolver.resolve(&table).get("Group.Box").cloned().unwrap();
        assert_eq!(field.effective_raw_value, Some(Token::name("Yes")));
    }

    #[test]
    fn test_own_value_shadows_parent() {
        let mut table = FieldTable::new();
        let p = table.push(RawField::named("Group").with_value(Token::name("Yes")));
        let c = table.push_child(p, RawField::named("Box").with_value(Token::name("Off")));

        let value = Resolver::default().effective_value(&table, c).unwrap();
        assert_eq!(value, Some(&Token::name("Off")));
    }

    #[test]
    fn test_value_never_taken_from_children() {
        let mut table = FieldTable::new();
        let p = table.push(RawField::named("Group"));
        table.push_child(p, RawField::named("Box").with_value(Token::text("x")));

        let value = Resolver::default().effective_value(&table, p).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_two_node_cycle_is_malformed() {
        let mut table = FieldTable::new();
        let a = table.push(RawField::named("A").with_value(Token::name("On")));
        let b = table.push(RawField::named("B"));
        table.set_parent(a, Some(b));
        table.set_parent(b, Some(a));

        let resolver = Resolver::default();
        assert!(matches!(
            resolver.resolve_field(&table, a),
            Err(FieldError::MalformedDocument { .. })
        ));

        let resolved = resolver.resolve(&table);
        assert!(resolved.is_empty());
        assert_eq!(resolved.failures().len(), 2);
    }

    #[test]
    fn test_self_parent_is_malformed() {
        let mut table = FieldTable::new();
        let a = table.push(RawField::named("Loop"));
        table.set_parent(a, Some(a));

        let err = Resolver::default().resolve_field(&table, a).unwrap_err();
        assert_eq!(
            err,
            FieldError::MalformedDocument {
                field: "Loop".to_string(),
                depth: DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_cycle_does_not_poison_other_fields() {
        let mut table = FieldTable::new();
        let a = table.push(RawField::named("A"));
        table.set_parent(a, Some(a));
        table.push(RawField::named("Name").with_value(Token::text("Jane")));

        let resolved = Resolver::default().resolve(&table);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains("Name"));
    }

    #[test]
    fn test_depth_bound() {
        let resolver = Resolver::default();

        let (table, leaf) = chain(DEFAULT_MAX_DEPTH);
        assert!(resolver.resolve_field(&table, leaf).is_ok());

        let (table, leaf) = chain(DEFAULT_MAX_DEPTH + 1);
        assert!(resolver.resolve_field(&table, leaf).is_err());
    }

    #[test]
    fn test_dangling_parent_stops_walk() {
        let mut table = FieldTable::new();
        let c = table.push(RawField::named("Orphan").with_value(Token::text("v")));
        table.set_parent(c, Some(FieldId(42)));

        let field = Resolver::default().resolve_field(&table, c).unwrap().unwrap();
        assert_eq!(field.qualified_name, "Orphan");
        assert_eq!(field.effective_raw_value, Some(Token::text("v")));
    }

    #[test]
    fn test_unnamed_chain_is_skipped() {
        let mut table = FieldTable::new();
        let p = table.push(RawField::anonymous());
        table.push_child(p, RawField::anonymous().with_value(Token::text("x")));

        let resolved = Resolver::default().resolve(&table);
        assert!(resolved.is_empty());
        assert!(resolved.failures().is_empty());
    }

    #[test]
    fn test_unnamed_intermediate_node_contributes_no_segment() {
        let mut table = FieldTable::new();
        let root = table.push(RawField::named("Form"));
        let mid = table.push_child(root, RawField::anonymous());
        let leaf = table.push_child(mid, RawField::named("City"));

        let name = Resolver::default().qualified_name(&table, leaf).unwrap();
        assert_eq!(name.as_deref(), Some("Form.City"));
    }

    #[test]
    fn test_effective_type_is_inherited() {
        let mut table = FieldTable::new();
        let p = table.push(RawField::named("Agree").with_type(FieldType::Button));
        table.push_child(p, RawField::named("Box"));

        let resolved = Resolver::default().resolve(&table);
        assert_eq!(resolved.get("Agree.Box").unwrap().field_type, FieldType::Button);
    }

    #[test]
    fn test_value_first_precedence() {
        let mut table = FieldTable::new();
        table.push(
            RawField::named("Box")
                .with_value(Token::name("Off"))
                .with_appearance(Token::name("On")),
        );
        table.push(RawField::named("Bare").with_appearance(Token::name("On")));

        let resolved = Resolver::default().resolve(&table);
        assert_eq!(resolved.get("Box").unwrap().canonical_value(true).as_deref(), Some("No"));
        assert_eq!(resolved.get("Bare").unwrap().canonical_value(true).as_deref(), Some("Yes"));
    }

    #[test]
    fn test_appearance_first_precedence() {
        let mut table = FieldTable::new();
        table.push(
            RawField::named("Box")
                .with_value(Token::name("Off"))
                .with_appearance(Token::name("On")),
        );

        let resolver = Resolver::new(DEFAULT_MAX_DEPTH, StatePrecedence::AppearanceFirst);
        let resolved = resolver.resolve(&table);
        assert_eq!(resolved.get("Box").unwrap().canonical_value(true).as_deref(), Some("Yes"));
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut table = FieldTable::new();
        table.push(RawField::named("Dup").with_value(Token::text("first")));
        table.push(RawField::named("Dup").with_value(Token::text("second")));

        let resolved = Resolver::default().resolve(&table);
        assert_eq!(resolved.len(), 1);
        assert_eq!(
            resolved.get("Dup").unwrap().canonical_value(false).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_by_id_follows_kept_fields() {
        let mut table = FieldTable::new();
        let first = table.push(RawField::named("Dup").with_value(Token::text("first")));
        let second = table.push(RawField::named("Dup").with_value(Token::text("second")));
        let looped = table.push(RawField::named("Loop"));
        table.set_parent(looped, Some(looped));
        let city = table.push(RawField::named("City").with_value(Token::text("Oslo")));

        let resolved = Resolver::default().resolve(&table);
        assert_eq!(resolved.by_id(first).unwrap().qualified_name, "Dup");
        assert_eq!(resolved.by_id(city).unwrap().qualified_name, "City");
        assert!(resolved.by_id(second).is_none());
        assert!(resolved.by_id(looped).is_none());
        assert!(resolved.by_id(FieldId(99)).is_none());
    }

    #[test]
    fn test_empty_table() {
        let resolved = Resolver::default().resolve(&FieldTable::new());
        assert!(resolved.is_empty());
    }
}
