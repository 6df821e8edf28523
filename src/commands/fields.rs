//! Fields command handler

use anyhow::Result;
use colored::Colorize;
use pdfqa::form::{CheckState, FieldType};
use pdfqa::PdfDocument;
use std::path::Path;

/// List resolved fields. With `buttons_only`, list checkbox/radio fields and
/// count how many are checked.
pub fn run_fields(config_path: Option<&Path>, pdf: &Path, buttons_only: bool) -> Result<()> {
    let extraction = super::extraction(config_path)?;
    let document = PdfDocument::open(pdf)?;
    let resolved = extraction.resolve(&document);

    if resolved.is_empty() {
        println!("No form fields found.");
        return Ok(());
    }

    let mut total = 0;
    let mut checked = 0;
    for field in resolved.iter() {
        if buttons_only && field.field_type != FieldType::Button {
            continue;
        }
        total += 1;

        let raw = field
            .state
            .as_ref()
            .map(|t| t.raw().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let value = field
            .canonical_value(extraction.policy.interpret_boolean)
            .unwrap_or_default();

        if buttons_only {
            let state = CheckState::of(field.state.as_ref());
            if state == Some(CheckState::Checked) {
                checked += 1;
            }
            let mark = match state {
                Some(s @ CheckState::Checked) => s.mark().green(),
                Some(s @ CheckState::Unchecked) => s.mark().red(),
                Some(s) => s.mark().yellow(),
                None => "-".dimmed(),
            };
            println!("{} {}  {}", mark, field.qualified_name.bold(), raw.dimmed());
        } else {
            println!(
                "{:<40} {:<10} {:<16} {}",
                field.qualified_name,
                field.field_type.label(),
                raw,
                value
            );
        }
    }

    if buttons_only {
        println!("\n{}", "=".repeat(60));
        println!("{} button fields, {} checked", total, checked);
    } else {
        println!("\n{} fields", total);
    }

    for (id, error) in resolved.failures() {
        println!("{} field #{} skipped: {}", "Warning:".yellow(), id.index(), error);
    }
    Ok(())
}
