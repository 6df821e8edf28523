//! Context assembly
//!
//! Renders a [`PdfDocument`] into the text handed to the model: document
//! info, page text, then the grouped form-field lines. Sections without
//! content are left out. The same resolution also feeds [`StructuredData`].

use crate::form::{
    format_fields, interpreted_fields, suffix_groups, GroupingPolicy, ResolvedTable, Resolver,
};
use crate::pdf::PdfDocument;
use crate::types::{PageContent, StructuredData, WidgetEntry};

pub const DOCUMENT_INFO_HEADER: &str = "[Document Info]";
pub const TEXT_CONTENT_HEADER: &str = "[Text Content]";
pub const FORM_FIELDS_HEADER: &str = "[Form Fields]";

/// How form fields are resolved and presented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub resolver: Resolver,
    pub policy: GroupingPolicy,
}

impl Extraction {
    /// Same resolution, but tokens are shown as found (`On`, `Off`, ...).
    pub fn raw(&self) -> Self {
        Self {
            resolver: self.resolver,
            policy: GroupingPolicy {
                interpret_boolean: false,
                ..self.policy.clone()
            },
        }
    }

    pub fn resolve(&self, document: &PdfDocument) -> ResolvedTable {
        self.resolver.resolve(document.fields())
    }

    /// Form-field summary lines for `document`.
    pub fn field_lines(&self, document: &PdfDocument) -> Vec<String> {
        format_fields(&self.resolve(document), &self.policy)
    }
}

/// Page text joined with page markers; blank pages are skipped.
pub fn page_text(document: &PdfDocument) -> String {
    document
        .pages()
        .iter()
        .filter(|page| page.has_text())
        .map(|page| format!("=== Page {} ===\n{}", page.number, page.text.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the model context for `document`.
pub fn build_context(document: &PdfDocument, extraction: &Extraction) -> String {
    let mut lines: Vec<String> = Vec::new();

    let metadata = document.metadata();
    if !metadata.is_empty() {
        lines.push(DOCUMENT_INFO_HEADER.to_string());
        lines.extend(metadata.iter().map(|(key, value)| format!("{key}: {value}")));
        lines.push(String::new());
    }

    let text = page_text(document);
    if !text.is_empty() {
        lines.push(TEXT_CONTENT_HEADER.to_string());
        lines.push(text);
        lines.push(String::new());
    }

    let fields = extraction.field_lines(document);
    if !fields.is_empty() {
        lines.push(FORM_FIELDS_HEADER.to_string());
        lines.extend(fields);
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Structured view of `document`.
pub fn structured_data(document: &PdfDocument, extraction: &Extraction) -> StructuredData {
    let resolved = extraction.resolve(document);
    let policy = &extraction.policy;

    let pages = document
        .pages()
        .iter()
        .map(|page| PageContent {
            page_number: page.number,
            text: page.text.clone(),
            widgets: page
                .widgets
                .iter()
                .filter_map(|&id| resolved.by_id(id))
                .map(|field| WidgetEntry {
                    name: field.qualified_name.clone(),
                    value: field.canonical_value(policy.interpret_boolean),
                })
                .collect(),
        })
        .collect();

    StructuredData {
        metadata: document.metadata().iter().cloned().collect(),
        text_content: document
            .pages()
            .iter()
            .filter(|page| page.has_text())
            .map(|page| page.text.clone())
            .collect(),
        fields: interpreted_fields(&resolved, policy),
        field_groups: suffix_groups(&resolved, policy),
        total_pages: document.page_count(),
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldTable, RawField, Token};
    use crate::pdf::Page;

    fn sample() -> PdfDocument {
        let mut fields = FieldTable::new();
        let vehicle = fields.push(RawField::named("HasVehicle").with_value(Token::name("On")));
        fields.push(RawField::named("HasVehicle0").with_value(Token::text("Ford F-150")));
        fields.push(RawField::named("Name").with_value(Token::text("Jane")));

        PdfDocument::from_parts(
            vec![("Title".to_string(), "Application".to_string())],
            vec![
                Page {
                    number: 1,
                    text: "Applicant details".to_string(),
                    widgets: vec![vehicle],
                },
                Page {
                    number: 2,
                    text: "   ".to_string(),
                    widgets: Vec::new(),
                },
            ],
            fields,
        )
    }

    #[test]
    fn test_build_context_sections() {
        let context = build_context(&sample(), &Extraction::default());
        let expected = "[Document Info]\n\
                        Title: Application\n\
                        \n\
                        [Text Content]\n\
                        === Page 1 ===\n\
                        Applicant details\n\
                        \n\
                        [Form Fields]\n\
                        ✓ HasVehicle: Yes (details: Ford F-150)\n\
                        • Name: Jane\n";
        assert_eq!(context, expected);
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let document = PdfDocument::from_parts(Vec::new(), Vec::new(), FieldTable::new());
        assert_eq!(build_context(&document, &Extraction::default()), "");

        let mut fields = FieldTable::new();
        fields.push(RawField::named("Unchecked").with_value(Token::name("Off")));
        let document = PdfDocument::from_parts(Vec::new(), Vec::new(), fields);
        assert_eq!(build_context(&document, &Extraction::default()), "");
    }

    #[test]
    fn test_raw_extraction_keeps_tokens() {
        let context = build_context(&sample(), &Extraction::default().raw());
        assert!(context.contains("• HasVehicle: On"));
        assert!(context.contains("• HasVehicle0: Ford F-150"));
    }

    #[test]
    fn test_page_text_skips_blank_pages() {
        assert_eq!(page_text(&sample()), "=== Page 1 ===\nApplicant details");
    }

    #[test]
    fn test_structured_data() {
        let data = structured_data(&sample(), &Extraction::default());
        assert_eq!(data.total_pages, 2);
        assert_eq!(data.metadata["Title"], "Application");
        assert_eq!(data.text_content, vec!["Applicant details"]);
        assert_eq!(data.fields.len(), 3);
        assert_eq!(
            data.field_groups["HasVehicle"].detail_value.as_deref(),
            Some("Ford F-150")
        );
        assert_eq!(
            data.pages[0].widgets,
            vec![WidgetEntry {
                name: "HasVehicle".to_string(),
                value: Some("Yes".to_string()),
            }]
        );
        assert!(data.pages[1].widgets.is_empty());
    }

    #[test]
    fn test_structured_data_serializes() {
        let data = structured_data(&sample(), &Extraction::default());
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["fields"]["HasVehicle"]["interpreted_value"], "Yes");
        assert_eq!(json["fields"]["HasVehicle"]["raw_value"]["text"], "/On");
        assert_eq!(json["total_pages"], 2);
    }
}
