//! Utility functions for the pdfqa CLI

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Expand ~ to home directory in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Format a character count into a human-readable string
pub fn format_chars(chars: usize) -> String {
    if chars >= 1_000_000 {
        format!("{:.1}M chars", chars as f64 / 1_000_000.0)
    } else if chars >= 1_000 {
        format!("{:.1}K chars", chars as f64 / 1_000.0)
    } else {
        format!("{} chars", chars)
    }
}

/// Read a questions file: one question per non-empty line, `#` comments skipped
pub fn read_questions(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read questions file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// True for paths with a `.pdf` extension (any case)
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}
