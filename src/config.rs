//! Configuration management for pdfqa
//!
//! One TOML file with an `[llm]` section (provider, credentials, model) and
//! an `[extraction]` section (how form fields are resolved and presented).
//! Every key has a default, so a partial file is valid.

use crate::context::Extraction;
use crate::form::{GroupingPolicy, Resolver, StatePrecedence, DEFAULT_DETAIL_SUFFIX, DEFAULT_MAX_DEPTH};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pdfqa.toml";

/// Chat completion provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI or any OpenAI-compatible endpoint
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable consulted when the file carries no key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Anthropic => "claude-3-sonnet-20240229",
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// OpenAI-compatible endpoints only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            model: None,
            base_url: None,
            max_tokens: 4096,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// API key from the file, else from the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(self.provider.api_key_env()).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// `[extraction]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub interpret_boolean: bool,
    pub detail_suffix: String,
    pub state_precedence: StatePrecedence,
    pub max_depth: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            interpret_boolean: true,
            detail_suffix: DEFAULT_DETAIL_SUFFIX.to_string(),
            state_precedence: StatePrecedence::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ExtractionConfig {
    /// Reject settings no document could be resolved with.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            bail!("extraction.max_depth must be at least 1, got {}", self.max_depth);
        }
        Ok(())
    }

    pub fn extraction(&self) -> Extraction {
        Extraction {
            resolver: Resolver::new(self.max_depth, self.state_precedence),
            policy: GroupingPolicy {
                interpret_boolean: self.interpret_boolean,
                detail_suffix: self.detail_suffix.clone(),
            },
        }
    }
}

/// pdfqa configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Get the user config file path (~/.pdfqa/config.toml)
    pub fn user_path() -> Result<PathBuf> {
        Ok(pdfqa_dir()?.join("config.toml"))
    }

    /// Pick the config file: an explicit path, else `./pdfqa.toml` when it
    /// exists, else the user config.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }
        Self::user_path()
    }

    /// Load config from `path`, or return None if it doesn't exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .extraction
            .validate()
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(Some(config))
    }

    /// Save config to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the base pdfqa directory path (~/.pdfqa)
pub fn pdfqa_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".pdfqa"))
}
