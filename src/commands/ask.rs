//! Ask command handler (single question or interactive loop)

use super::info::print_document_info;
use anyhow::Result;
use colored::Colorize;
use pdfqa::QaSession;
use std::io::{self, Write};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

pub async fn run_ask(
    config_path: Option<&Path>,
    pdf: Option<&Path>,
    question: Option<&str>,
    provider: Option<&str>,
) -> Result<()> {
    let Some(pdf) = pdf else {
        println!("Usage:");
        println!("  pdfqa ask <PDF> [-q QUESTION] [-i]");
        println!("\nOptions:");
        println!("  -q, --question   Ask one question and exit");
        println!("  -i, --interactive  Interactive mode (default)");
        return Ok(());
    };

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
    println!("{} Loaded {}", "✓".green(), pdf.display());
    println!("{} {} pages", "✓".green(), info.total_pages);
    println!("{} Context: {} chars\n", "✓".green(), info.context_chars);

    match question {
        Some(question) => ask_once(&session, question).await,
        None => interactive(&mut session, BufReader::new(tokio::io::stdin())).await,
    }
}

async fn ask_once(session: &QaSession, question: &str) -> Result<()> {
    println!("{} {}", "Question:".bold(), question);
    println!("{}", "Thinking...".dimmed());

    let answer = session.ask(question).await?;
    println!("\n{} {}\n", "Answer:".bold(), answer);
    Ok(())
}

/// Question loop reading one command or question per line from `input`.
async fn interactive<R>(session: &mut QaSession, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", "=".repeat(60));
    println!("{} (model: {})", "PDF Q&A - interactive mode".bold(), session.model());
    println!("{}", "=".repeat(60));
    println!("Type a question to start. 'quit' or 'exit' leaves.");
    println!("'reload' re-reads the PDF, 'info' shows document info.");
    println!("{}", "-".repeat(60));

    let mut lines = input.lines();
    loop {
        print!("\n{} ", "Question:".cyan());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\nGoodbye!");
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "reload" => match session.reload() {
                Ok(info) => println!(
                    "{} Reloaded: {} pages, {} chars",
                    "✓".green(),
                    info.total_pages,
                    info.context_chars
                ),
                Err(e) => println!("{} {:#}", "Error:".red(), e),
            },
            "info" => match session.info() {
                Some(info) => print_document_info(&info),
                None => println!("No PDF loaded"),
            },
            _ => {
                if let Err(e) = ask_once(session, input).await {
                    println!("{} {:#}", "Error:".red(), e);
                }
            }
        }
    }

    Ok(())
}
