//! Question answering over one loaded document

use crate::context::{build_context, Extraction};
use crate::llm::ChatClient;
use crate::pdf::PdfDocument;
use crate::types::DocumentInfo;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

struct Loaded {
    path: Option<PathBuf>,
    document: PdfDocument,
    context: String,
}

/// A chat client plus the document whose context it answers from.
pub struct QaSession {
    client: Box<dyn ChatClient>,
    extraction: Extraction,
    loaded: Option<Loaded>,
}

impl QaSession {
    pub fn new(client: Box<dyn ChatClient>, extraction: Extraction) -> Self {
        Self {
            client,
            extraction,
            loaded: None,
        }
    }

    /// Open `path` and rebuild the context. The previous document stays
    /// loaded if this fails.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<DocumentInfo> {
        let path = path.as_ref();
        let document = PdfDocument::open(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        Ok(self.load_document(document))
    }

    /// Use an already-parsed document.
    pub fn load_document(&mut self, document: PdfDocument) -> DocumentInfo {
        let context = build_context(&document, &self.extraction);
        let info = document_info(&document, &context, &self.extraction);
        info!("context built: {} chars", info.context_chars);
        self.loaded = Some(Loaded {
            path: document.path().map(Path::to_path_buf),
            document,
            context,
        });
        info
    }

    /// Re-read the current document from disk.
    pub fn reload(&mut self) -> Result<DocumentInfo> {
        let Some(path) = self.loaded.as_ref().and_then(|l| l.path.clone()) else {
            bail!("No PDF file path to reload");
        };
        self.load(path)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn document(&self) -> Option<&PdfDocument> {
        self.loaded.as_ref().map(|l| &l.document)
    }

    pub fn context(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.context.as_str())
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Ask one question against the loaded document.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let Some(context) = self.context() else {
            bail!("No PDF loaded");
        };
        let answer = self
            .client
            .ask(question, Some(context))
            .await
            .context("LLM request failed")?;
        Ok(answer)
    }

    /// Ask each question in order. `progress` runs after every answer with
    /// the number answered so far.
    pub async fn batch_ask<F>(&self, questions: &[String], mut progress: F) -> Result<Vec<(String, String)>>
    where
        F: FnMut(usize),
    {
        let mut results = Vec::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            let answer = self.ask(question).await?;
            results.push((question.clone(), answer));
            progress(i + 1);
        }
        Ok(results)
    }

    /// Summary of the loaded document.
    pub fn info(&self) -> Option<DocumentInfo> {
        self.loaded
            .as_ref()
            .map(|l| document_info(&l.document, &l.context, &self.extraction))
    }
}

/// Summary of `document` given its assembled context.
pub fn document_info(document: &PdfDocument, context: &str, extraction: &Extraction) -> DocumentInfo {
    DocumentInfo {
        path: document.path().map(Path::to_path_buf),
        metadata: document.metadata().to_vec(),
        total_pages: document.page_count(),
        field_count: extraction.resolve(document).len(),
        context_chars: context.chars().count(),
    }
}
