//! JSON command handler

use anyhow::{Context, Result};
use pdfqa::{structured_data, PdfDocument};
use std::path::Path;

pub fn run_json(config_path: Option<&Path>, pdf: &Path) -> Result<()> {
    let extraction = super::extraction(config_path)?;
    let document = PdfDocument::open(pdf)?;
    let data = structured_data(&document, &extraction);

    let json = serde_json::to_string_pretty(&data).context("Failed to serialize document")?;
    println!("{}", json);
    Ok(())
}
