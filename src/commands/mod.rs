//! CLI command handlers

pub mod ask;
pub mod batch;
pub mod context;
pub mod fields;
pub mod info;
pub mod inspect;
pub mod json;
pub mod scan;

pub use ask::run_ask;
pub use batch::run_batch;
pub use context::run_context;
pub use fields::run_fields;
pub use info::run_info;
pub use inspect::run_inspect;
pub use json::run_json;
pub use scan::run_scan;

use anyhow::Result;
use colored::Colorize;
use pdfqa::{client_from_config, Config, Extraction, LlmError, QaSession};
use std::path::Path;

/// Load the config file, falling back to defaults when there is none.
/// Extraction-only commands never need a file.
pub fn load_config_or_default(config_path: Option<&Path>) -> Result<Config> {
    let path = Config::resolve_path(config_path)?;
    Ok(Config::load(&path)?.unwrap_or_default())
}

/// Extraction settings from the config file (or defaults).
pub fn extraction(config_path: Option<&Path>) -> Result<Extraction> {
    Ok(load_config_or_default(config_path)?.extraction.extraction())
}

/// Build a QA session from config. `Ok(None)` after printing a hint when the
/// config file is missing or no API key is available.
pub fn open_session(config_path: Option<&Path>, provider: Option<&str>) -> Result<Option<QaSession>> {
    let path = Config::resolve_path(config_path)?;
    let Some(mut config) = Config::load(&path)? else {
        println!("{} configuration file not found: {}", "Error:".red(), path.display());
        println!("Create it or pass --config <path>. Minimal example:\n");
        println!("  [llm]");
        println!("  provider = \"openai\"");
        println!("  api_key = \"sk-...\"");
        return Ok(None);
    };

    if let Some(name) = provider {
        match pdfqa::llm::parse_provider(name) {
            Ok(p) => {
                if p != config.llm.provider {
                    config.llm.api_key = None;
                    config.llm.model = None;
                    config.llm.base_url = None;
                }
                config.llm.provider = p;
            }
            Err(e) => {
                println!("{} {}", "Error:".red(), e);
                return Ok(None);
            }
        }
    }

    let client = match client_from_config(&config.llm) {
        Ok(client) => client,
        Err(e @ LlmError::MissingCredential { .. }) => {
            println!("{} {}", "Error:".red(), e);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Some(QaSession::new(client, config.extraction.extraction())))
}
