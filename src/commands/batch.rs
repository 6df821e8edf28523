//! Batch command handler

use crate::utils::read_questions;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub async fn run_batch(
    config_path: Option<&Path>,
    pdf: &Path,
    questions_file: &Path,
    provider: Option<&str>,
) -> Result<()> {
    let questions = read_questions(questions_file)?;
    if questions.is_empty() {
        println!("No questions in {}", questions_file.display());
        return Ok(());
    }

    let Some(mut session) = super::open_session(config_path, provider)? else {
        return Ok(());
    };
    let info = match session.load(pdf) {
        Ok(info) => info,
        Err(e) => {
            println!("{} {:#}", "Error:".red(), e);
            return Ok(());
        }
    };
    println!(
        "{} Loaded {} ({} pages), {} questions\n",
        "✓".green(),
        pdf.display(),
        info.total_pages,
        questions.len()
    );

    let pb = ProgressBar::new(questions.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    pb.set_message("asking");

    let results = session
        .batch_ask(&questions, |done| pb.set_position(done as u64))
        .await;
    pb.finish_and_clear();

    for (i, (question, answer)) in results?.iter().enumerate() {
        println!("{} {}", format!("[{}/{}]", i + 1, questions.len()).dimmed(), question.bold());
        println!("{}\n", answer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreadable_pdf_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("pdfqa.toml");
        std::fs::write(&config, "[llm]\nprovider = \"openai\"\napi_key = \"sk-test\"\n").unwrap();
        let questions = dir.path().join("questions.txt");
        std::fs::write(&questions, "Who?\n").unwrap();

        let missing = dir.path().join("missing.pdf");
        let result = run_batch(Some(&config), &missing, &questions, None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_config_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let questions = dir.path().join("questions.txt");
        std::fs::write(&questions, "Who?\n").unwrap();

        let config = dir.path().join("absent.toml");
        let result = run_batch(Some(&config), &dir.path().join("a.pdf"), &questions, None).await;
        assert!(result.is_ok());
    }
}
