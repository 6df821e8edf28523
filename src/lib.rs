//! pdfqa - ask questions about PDF documents and their form fields
//!
//! Pipeline:
//! - `pdf`: parse the file once (metadata, page text, raw AcroForm table)
//! - `form`: resolve qualified names and inherited values, normalize
//!   checkbox vocabulary, pair checkboxes with their detail fields
//! - `context`: render all of it as plain text for the model
//! - `llm` / `qa`: send that context with the user's question

pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod llm;
pub mod pdf;
pub mod qa;
pub mod types;

pub use config::{Config, ExtractionConfig, LlmConfig, Provider};
pub use context::{build_context, structured_data, Extraction};
pub use error::{DocumentError, FieldError};
pub use llm::{client_from_config, AnthropicClient, ChatClient, LlmError, Message, OpenAiClient, Role};
pub use pdf::{Page, PdfDocument};
pub use qa::{document_info, QaSession};
pub use types::*;

use std::path::Path;

/// Open `path` and build its model context in one step.
pub fn extract_context(path: impl AsRef<Path>, extraction: &Extraction) -> Result<String, DocumentError> {
    let document = PdfDocument::open(path)?;
    Ok(build_context(&document, extraction))
}
