//! Inspect command handler (checkbox diagnostics)

use anyhow::Result;
use colored::Colorize;
use pdfqa::form::{CheckState, FieldType, StatePrecedence, Token};
use pdfqa::PdfDocument;
use std::path::Path;

pub fn run_inspect(config_path: Option<&Path>, pdf: &Path, name: &str) -> Result<()> {
    let extraction = super::extraction(config_path)?;
    let document = PdfDocument::open(pdf)?;
    let resolved = extraction.resolve(&document);

    let Some(field) = resolved.get(name) else {
        println!("{} field not found: {}", "✗".red(), name);
        println!("\nAvailable button fields:");
        for field in resolved.iter().filter(|f| f.field_type == FieldType::Button) {
            println!("  - {}", field.qualified_name);
        }
        return Ok(());
    };

    println!("{}", "=".repeat(60));
    println!("Field: {}", field.qualified_name.bold());
    println!("{}", "=".repeat(60));
    println!("Type: {}", field.field_type.label());

    println!("\nValues:");
    println!("  /V  (value):         {}", show(field.effective_raw_value.as_ref()));
    println!("  /AS (appearance):    {}", show(field.appearance_state.as_ref()));
    println!("  /DV (default value): {}", show(field.default_value.as_ref()));

    println!("\nVerdicts:");
    println!("  by appearance (/AS): {}", verdict(field.appearance_state.as_ref()));
    println!("  by value (/V):       {}", verdict(field.effective_raw_value.as_ref()));

    let source = match extraction.resolver.precedence {
        StatePrecedence::ValueFirst => "value first",
        StatePrecedence::AppearanceFirst => "appearance first",
    };
    println!(
        "\nReported ({}): {}",
        source,
        field
            .canonical_value(extraction.policy.interpret_boolean)
            .unwrap_or_else(|| "(none)".to_string())
    );
    Ok(())
}

fn show(token: Option<&Token>) -> String {
    token
        .map(|t| t.raw().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn verdict(token: Option<&Token>) -> String {
    match CheckState::of(token) {
        Some(CheckState::Checked) => format!("{} checked", "✓".green()),
        Some(CheckState::Unchecked) => format!("{} unchecked", "✗".red()),
        Some(CheckState::Other) => format!("? unknown ({})", show(token)),
        None => "(no state)".to_string(),
    }
}
