//! Page text extraction
//!
//! pdf_oxide converts each page to Markdown, which keeps headings and tables
//! readable for the model. lopdf's content-stream extraction is the fallback
//! for documents pdf_oxide cannot open and for documents loaded from memory.

use anyhow::Result;
use lopdf::Document;
use pdf_oxide::converters::ConversionOptions;
use std::path::Path;
use tracing::warn;

/// Extract every page with pdf_oxide. `None` marks a page that failed.
pub(crate) fn oxide_page_texts(pdf_path: &Path) -> Result<Vec<Option<String>>> {
    let mut doc = pdf_oxide::PdfDocument::open(pdf_path)
        .map_err(|e| anyhow::anyhow!("Failed to open PDF: {}", e))?;

    let page_count = doc
        .page_count()
        .map_err(|e| anyhow::anyhow!("Failed to get page count: {}", e))?;

    let options = ConversionOptions::default();
    let mut pages = Vec::with_capacity(page_count);
    for page_idx in 0..page_count {
        match doc.to_markdown(page_idx, &options) {
            Ok(markdown) => pages.push(Some(markdown)),
            Err(e) => {
                warn!("failed to extract page {}: {}", page_idx + 1, e);
                pages.push(None);
            }
        }
    }

    Ok(pages)
}

/// Text of one page (1-based `page_number`) via lopdf.
pub(crate) fn lopdf_page_text(doc: &Document, page_number: u32) -> String {
    match doc.extract_text(&[page_number]) {
        Ok(text) => normalize_lines(&text),
        Err(e) => {
            warn!("failed to extract page {}: {}", page_number, e);
            String::new()
        }
    }
}

fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lines_drops_blank_lines() {
        assert_eq!(normalize_lines("  a  \n\n   \n b\n"), "a\nb");
    }

    #[test]
    fn test_oxide_missing_file_errors() {
        let result = oxide_page_texts(Path::new("/definitely/not/here.pdf"));
        assert!(result.is_err());
    }
}
