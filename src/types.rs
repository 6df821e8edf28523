use crate::form::{FieldGroup, InterpretedField};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

/// Everything extracted from one document (`pdfqa json`)
#[derive(Debug, Clone, Serialize)]
pub struct StructuredData {
    pub metadata: IndexMap<String, String>,
    /// Non-blank page texts, in page order
    pub text_content: Vec<String>,
    pub fields: IndexMap<String, InterpretedField>,
    pub field_groups: IndexMap<String, FieldGroup>,
    pub total_pages: usize,
    pub pages: Vec<PageContent>,
}

/// One page with the widgets placed on it
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    pub page_number: usize,
    pub text: String,
    pub widgets: Vec<WidgetEntry>,
}

/// A form widget as seen on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetEntry {
    pub name: String,
    pub value: Option<String>,
}

/// Summary of a loaded document (no LLM involved)
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub path: Option<PathBuf>,
    pub metadata: Vec<(String, String)>,
    pub total_pages: usize,
    pub field_count: usize,
    pub context_chars: usize,
}
