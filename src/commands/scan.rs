//! Scan command handler

use crate::utils::is_pdf;
use anyhow::Result;
use colored::Colorize;
use pdfqa::form::format_fields;
use pdfqa::PdfDocument;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Print the form-field block of every PDF under `dir`.
pub fn run_scan(config_path: Option<&Path>, dir: &Path) -> Result<()> {
    let extraction = super::extraction(config_path)?;

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_pdf(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No PDF files found in {}", dir.display());
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        println!("{}", "=".repeat(60));
        println!("{}", file.display().to_string().bold());

        let document = match PdfDocument::open(file) {
            Ok(document) => document,
            Err(e) => {
                failed += 1;
                println!("{} {}", "✗".red(), e);
                continue;
            }
        };

        let resolved = extraction.resolve(&document);
        let lines = format_fields(&resolved, &extraction.policy);
        println!(
            "{} pages, {} fields, {} shown",
            document.page_count(),
            resolved.len(),
            lines.len()
        );
        for line in &lines {
            println!("  {}", line);
        }
    }

    println!("{}", "=".repeat(60));
    println!("{} files scanned, {} failed", files.len(), failed);
    Ok(())
}
