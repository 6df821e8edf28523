//! Context command handler

use anyhow::Result;
use pdfqa::{build_context, PdfDocument};
use std::path::Path;

/// Print exactly what the model would receive.
pub fn run_context(config_path: Option<&Path>, pdf: &Path, raw: bool) -> Result<()> {
    let mut extraction = super::extraction(config_path)?;
    if raw {
        extraction = extraction.raw();
    }

    let document = PdfDocument::open(pdf)?;
    print!("{}", build_context(&document, &extraction));
    Ok(())
}
