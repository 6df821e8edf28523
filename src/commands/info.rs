//! Info command handler

use crate::utils::format_chars;
use anyhow::Result;
use colored::Colorize;
use pdfqa::{build_context, document_info, DocumentInfo, PdfDocument};
use std::path::Path;

pub fn run_info(config_path: Option<&Path>, pdf: &Path) -> Result<()> {
    let extraction = super::extraction(config_path)?;
    let document = PdfDocument::open(pdf)?;
    let context = build_context(&document, &extraction);
    print_document_info(&document_info(&document, &context, &extraction));
    Ok(())
}

pub fn print_document_info(info: &DocumentInfo) {
    println!("\n{}", "=".repeat(60));
    println!("{}", "PDF Document Info".bold());
    println!("{}", "=".repeat(60));

    if let Some(path) = &info.path {
        println!("File:        {}", path.display());
    }
    for (key, value) in &info.metadata {
        println!("{}: {}", key, value);
    }

    println!("\nPages:       {}", info.total_pages);
    if info.field_count > 0 {
        println!("Form fields: {}", info.field_count);
    }
    println!("Context:     {}", format_chars(info.context_chars));
    println!("{}", "=".repeat(60));
}
