//! PDF document loading
//!
//! A [`PdfDocument`] holds everything the rest of the crate reads from a
//! file: the `/Info` metadata, per-page text, the raw form-field table and
//! which widgets sit on which page. The file is parsed once at open time.

mod acroform;
mod text;

use crate::error::DocumentError;
use crate::form::{FieldId, FieldTable};
use lopdf::{Document, Object};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One page of text plus the form fields whose widgets appear on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub text: String,
    pub widgets: Vec<FieldId>,
}

impl Page {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A parsed PDF: metadata, pages and form fields.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    path: Option<PathBuf>,
    metadata: Vec<(String, String)>,
    pages: Vec<Page>,
    fields: FieldTable,
}

impl PdfDocument {
    /// Open and parse the PDF at `path`.
    ///
    /// Page text comes from pdf_oxide when it can read the file, otherwise
    /// from lopdf. Form fields and metadata always come from lopdf.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let doc = parse(&bytes)?;

        let oxide_pages = match text::oxide_page_texts(path) {
            Ok(pages) => Some(pages),
            Err(e) => {
                warn!("pdf_oxide could not read {}: {}, using lopdf text", path.display(), e);
                None
            }
        };

        let mut document = Self::from_lopdf(&doc, oxide_pages);
        document.path = Some(path.to_path_buf());
        info!(
            "loaded {}: {} pages, {} form fields",
            path.display(),
            document.pages.len(),
            document.fields.len()
        );
        Ok(document)
    }

    /// Parse a PDF held in memory. Page text comes from lopdf.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let doc = parse(bytes)?;
        Ok(Self::from_lopdf(&doc, None))
    }

    /// Assemble a document from already-extracted parts.
    pub fn from_parts(
        metadata: Vec<(String, String)>,
        pages: Vec<Page>,
        fields: FieldTable,
    ) -> Self {
        Self {
            path: None,
            metadata,
            pages,
            fields,
        }
    }

    fn from_lopdf(doc: &Document, oxide_pages: Option<Vec<Option<String>>>) -> Self {
        let form = acroform::read_form(doc);
        let oxide_pages = oxide_pages.unwrap_or_default();

        let pages = doc
            .get_pages()
            .into_iter()
            .enumerate()
            .map(|(index, (number, page_id))| {
                let text = oxide_pages
                    .get(index)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| text::lopdf_page_text(doc, number));

                let widgets = doc
                    .get_dictionary(page_id)
                    .ok()
                    .and_then(|page| page.get(b"Annots").ok())
                    .and_then(|annots| acroform::deref(doc, annots))
                    .and_then(|annots| annots.as_array().ok())
                    .map(|annots| {
                        let mut ids: Vec<FieldId> = Vec::new();
                        for id in annots
                            .iter()
                            .filter_map(|a| a.as_reference().ok())
                            .filter_map(|a| form.by_object.get(&a).copied())
                        {
                            if !ids.contains(&id) {
                                ids.push(id);
                            }
                        }
                        ids
                    })
                    .unwrap_or_default();

                Page {
                    number: number as usize,
                    text,
                    widgets,
                }
            })
            .collect::<Vec<_>>();

        debug!("extracted {} pages", pages.len());

        Self {
            path: None,
            metadata: read_metadata(doc),
            pages,
            fields: form.table,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// `/Info` entries in document order, keys without a leading `/`.
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }
}

fn parse(bytes: &[u8]) -> Result<Document, DocumentError> {
    Document::load_mem(bytes).map_err(|e| DocumentError::Malformed(e.to_string()))
}

fn read_metadata(doc: &Document) -> Vec<(String, String)> {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|o| acroform::deref(doc, o))
        .and_then(|o| o.as_dict().ok())
    else {
        return Vec::new();
    };

    info.iter()
        .filter_map(|(key, value)| {
            let value = match acroform::deref(doc, value)? {
                Object::String(bytes, _) => decode_text(bytes),
                Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                _ => return None,
            };
            let value = value.trim().to_string();
            if value.is_empty() {
                return None;
            }
            let key = String::from_utf8_lossy(key);
            Some((key.trim_start_matches('/').to_string(), value))
        })
        .collect()
}

/// Decode a PDF text string: UTF-16 with a byte-order mark, UTF-8, or
/// single-byte text (read as Latin-1).
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
