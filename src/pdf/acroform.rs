//! AcroForm reader
//!
//! Walks `/Root /AcroForm /Fields` and the `/Kids` below it in pre-order and
//! copies every field node into a [`FieldTable`]. Nothing is resolved here:
//! names stay partial and `/Parent` links are copied as declared, including
//! links that form cycles.

use super::decode_text;
use crate::form::{FieldId, FieldTable, FieldType, RawField, Token};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use tracing::debug;

/// Field table plus the PDF object each node (or merged widget) came from.
#[derive(Debug, Default)]
pub(crate) struct FormIndex {
    pub table: FieldTable,
    pub by_object: HashMap<ObjectId, FieldId>,
}

/// Read the interactive form of `doc`. A document without one yields an
/// empty table.
pub(crate) fn read_form(doc: &Document) -> FormIndex {
    let mut reader = Reader {
        doc,
        index: FormIndex::default(),
        pending: Vec::new(),
    };

    let roots = root_fields(doc);
    debug!("acroform has {} top-level fields", roots.len());
    for root in roots {
        reader.walk(root, None);
    }
    reader.link_declared_parents();
    reader.index
}

fn root_fields(doc: &Document) -> Vec<ObjectId> {
    let Some(catalog) = doc
        .trailer
        .get(b"Root")
        .ok()
        .and_then(|root| root.as_reference().ok())
        .and_then(|id| doc.get_dictionary(id).ok())
    else {
        return Vec::new();
    };

    let Some(acroform) = catalog.get(b"AcroForm").ok().and_then(|o| dict_of(doc, o)) else {
        return Vec::new();
    };

    acroform
        .get(b"Fields")
        .ok()
        .and_then(|o| deref(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|fields| refs(fields))
        .unwrap_or_default()
}

struct Reader<'a> {
    doc: &'a Document,
    index: FormIndex,
    /// `/Parent` links that name a node other than the `/Kids` owner.
    pending: Vec<(FieldId, ObjectId)>,
}

impl Reader<'_> {
    /// Pre-order walk from `start`. Returns the id `start` maps to.
    fn walk(&mut self, start: ObjectId, owner: Option<FieldId>) -> Option<FieldId> {
        let doc = self.doc;
        let mut first = None;
        let mut stack = vec![(start, owner)];

        while let Some((object_id, owner)) = stack.pop() {
            if let Some(&seen) = self.index.by_object.get(&object_id) {
                self.adopt(owner, seen);
                first.get_or_insert(seen);
                continue;
            }

            let Ok(dict) = doc.get_dictionary(object_id) else {
                debug!(?object_id, "field reference does not resolve to a dictionary");
                continue;
            };

            let kids = dict
                .get(b"Kids")
                .ok()
                .and_then(|o| deref(doc, o))
                .and_then(|o| o.as_array().ok())
                .map(|k| refs(k))
                .unwrap_or_default();

            if let Some(owner) = owner.filter(|_| is_bare_widget(dict, &kids)) {
                debug!(?object_id, field = owner.index(), "merging nameless widget into its field");
                self.merge_widget(owner, dict);
                self.index.by_object.insert(object_id, owner);
                first.get_or_insert(owner);
                continue;
            }

            let id = self.intern(object_id, dict, owner);
            first.get_or_insert(id);
            for kid in kids.into_iter().rev() {
                stack.push((kid, Some(id)));
            }
        }

        first
    }

    fn intern(&mut self, object_id: ObjectId, dict: &Dictionary, owner: Option<FieldId>) -> FieldId {
        let field = RawField {
            name: text_of(self.doc, dict, b"T"),
            field_type: name_of(self.doc, dict, b"FT").map(|ft| FieldType::from_pdf_name(&ft)),
            value: token_of(self.doc, dict, b"V"),
            default_value: token_of(self.doc, dict, b"DV"),
            appearance_state: token_of(self.doc, dict, b"AS"),
            ..RawField::default()
        };

        let id = match owner {
            Some(owner) => self.index.table.push_child(owner, field),
            None => self.index.table.push(field),
        };
        self.index.by_object.insert(object_id, id);

        if let Ok(Object::Reference(parent)) = dict.get(b"Parent") {
            let declared = self.index.by_object.get(parent).copied();
            if declared.is_none() || declared != owner {
                self.pending.push((id, *parent));
            }
        }
        id
    }

    /// Apply `/Parent` links that differ from the `/Kids` structure. Parents
    /// never reached through `/Fields` are read on demand.
    fn link_declared_parents(&mut self) {
        while let Some((child, parent)) = self.pending.pop() {
            let resolved = match self.index.by_object.get(&parent) {
                Some(&id) => Some(id),
                None if self.doc.get_dictionary(parent).is_ok() => self.walk(parent, None),
                None => {
                    debug!(?parent, "dangling /Parent reference");
                    None
                }
            };
            self.index.table.set_parent(child, resolved);
        }
    }

    fn adopt(&mut self, owner: Option<FieldId>, child: FieldId) {
        let Some(owner) = owner.filter(|&o| o != child) else {
            return;
        };
        if let Some(parent) = self.index.table.get_mut(owner) {
            if !parent.children.contains(&child) {
                parent.children.push(child);
            }
        }
    }

    /// Fold a nameless widget annotation into its field. A visible "on"
    /// state wins over `/Off` so a radio group reports its selection.
    fn merge_widget(&mut self, owner: FieldId, dict: &Dictionary) {
        let Some(state) = token_of(self.doc, dict, b"AS") else {
            return;
        };
        let Some(field) = self.index.table.get_mut(owner) else {
            return;
        };
        let replace = match &field.appearance_state {
            None => true,
            Some(current) => current.stripped() == OFF && state.stripped() != OFF,
        };
        if replace {
            field.appearance_state = Some(state);
        }
    }
}

const OFF: &str = "Off";

fn is_bare_widget(dict: &Dictionary, kids: &[ObjectId]) -> bool {
    kids.is_empty() && dict.get(b"T").is_err()
}

fn refs(objects: &[Object]) -> Vec<ObjectId> {
    objects.iter().filter_map(|o| o.as_reference().ok()).collect()
}

/// Follow one level of indirection.
pub(crate) fn deref<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn dict_of<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    deref(doc, object).and_then(|o| o.as_dict().ok())
}

fn text_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match deref(doc, dict.get(key).ok()?)? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn name_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match deref(doc, dict.get(key).ok()?)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn token_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Token> {
    match deref(doc, dict.get(key).ok()?)? {
        Object::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(scalar_token)
                .map(|t| t.stripped().to_string())
                .collect();
            (!parts.is_empty()).then(|| Token::text(parts.join(", ")))
        }
        other => scalar_token(other),
    }
}

fn scalar_token(object: &Object) -> Option<Token> {
    match object {
        Object::Name(name) => Some(Token::name(&String::from_utf8_lossy(name))),
        Object::String(bytes, _) => Some(Token::text(decode_text(bytes))),
        Object::Integer(i) => Some(Token::text(i.to_string())),
        Object::Real(r) => Some(Token::text(r.to_string())),
        Object::Boolean(b) => Some(Token::text(if *b { "True" } else { "False" })),
        _ => None,
    }
}
