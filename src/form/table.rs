//! Field arena
//!
//! The document parser owns every field node for the lifetime of a document.
//! Here they live in one insertion-ordered arena and refer to each other by
//! [`FieldId`], so a parent link is an index rather than an owning reference.

use super::token::Token;
use serde::Serialize;

/// Index of a field in its [`FieldTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldId(pub(crate) usize);

impl FieldId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Declared form-field category (`/FT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Button,
    Choice,
    Signature,
    #[default]
    Unknown,
}

impl FieldType {
    /// Map a bare `/FT` name (`Tx`, `Btn`, `Ch`, `Sig`).
    pub fn from_pdf_name(name: &str) -> Self {
        match name {
            "Tx" => Self::Text,
            "Btn" => Self::Button,
            "Ch" => Self::Choice,
            "Sig" => Self::Signature,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Button => "button",
            Self::Choice => "choice",
            Self::Signature => "signature",
            Self::Unknown => "unknown",
        }
    }
}

/// A field node as exposed by the document parser. Read-only to the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawField {
    /// Local (partial) name, not yet qualified by ancestors.
    pub name: Option<String>,
    /// Declared type; `None` when the node inherits it.
    pub field_type: Option<FieldType>,
    pub value: Option<Token>,
    pub default_value: Option<Token>,
    /// Displayed state of a button widget. May disagree with `value`.
    pub appearance_state: Option<Token>,
    pub parent: Option<FieldId>,
    pub children: Vec<FieldId>,
}

impl RawField {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Node without a local name (e.g. an intermediate grouping node).
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_value(mut self, value: Token) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_default(mut self, value: Token) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_appearance(mut self, state: Token) -> Self {
        self.appearance_state = Some(state);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }
}

/// Insertion-ordered arena of fields for one document.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    fields: Vec<RawField>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; its position is its iteration order.
    pub fn push(&mut self, field: RawField) -> FieldId {
        self.fields.push(field);
        FieldId(self.fields.len() - 1)
    }

    /// Append `field` as the last child of `parent`.
    pub fn push_child(&mut self, parent: FieldId, mut field: RawField) -> FieldId {
        field.parent = Some(parent);
        let id = self.push(field);
        if let Some(p) = self.fields.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Overwrite the parent link of `child` without touching child lists.
    ///
    /// Lets callers reproduce whatever the document declares, including
    /// links to ids that do not exist and cycles.
    pub fn set_parent(&mut self, child: FieldId, parent: Option<FieldId>) {
        if let Some(c) = self.fields.get_mut(child.0) {
            c.parent = parent;
        }
    }

    pub fn get(&self, id: FieldId) -> Option<&RawField> {
        self.fields.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: FieldId) -> Option<&mut RawField> {
        self.fields.get_mut(id.0)
    }

    /// Id of the `index`-th inserted field, if any.
    pub fn id_at(&self, index: usize) -> Option<FieldId> {
        (index < self.fields.len()).then_some(FieldId(index))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &RawField)> {
        self.fields.iter().enumerate().map(|(i, f)| (FieldId(i), f))
    }
}
