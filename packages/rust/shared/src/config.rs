//! Application configuration for postcraft.
//!
//! User config lives at `~/.postcraft/postcraft.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PostcraftError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "postcraft.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".postcraft";

// ---------------------------------------------------------------------------
// Config structs (matching postcraft.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Template database location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Content analysis defaults.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Template store behaviour.
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL template database. A leading `~/` is expanded.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.postcraft/templates.db".into()
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of keywords reported per document.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Character budget for the summary.
    #[serde(default = "default_summary_max_length")]
    pub summary_max_length: usize,

    /// Sentence budget for the summary.
    #[serde(default = "default_summary_max_sentences")]
    pub summary_max_sentences: usize,

    /// Character budget per section when splitting documents.
    #[serde(default = "default_max_section_length")]
    pub max_section_length: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_keywords: default_max_keywords(),
            summary_max_length: default_summary_max_length(),
            summary_max_sentences: default_summary_max_sentences(),
            max_section_length: default_max_section_length(),
        }
    }
}

fn default_max_keywords() -> usize {
    10
}
fn default_summary_max_length() -> usize {
    300
}
fn default_summary_max_sentences() -> usize {
    3
}
fn default_max_section_length() -> usize {
    800
}

/// `[templates]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Seed the built-in templates when the store is opened.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Analysis options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime analysis options, merged from the config file and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub max_keywords: usize,
    pub summary_max_length: usize,
    pub summary_max_sentences: usize,
    pub max_section_length: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for AnalysisOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_keywords: config.analysis.max_keywords,
            summary_max_length: config.analysis.summary_max_length,
            summary_max_sentences: config.analysis.summary_max_sentences,
            max_section_length: config.analysis.max_section_length,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.postcraft/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PostcraftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.postcraft/postcraft.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PostcraftError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PostcraftError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PostcraftError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PostcraftError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PostcraftError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the configured database path, expanding a leading `~/`.
pub fn resolve_db_path(config: &StorageConfig) -> Result<PathBuf> {
    match config.db_path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| PostcraftError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(&config.db_path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("db_path"));
        assert!(toml_str.contains("max_keywords"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.analysis.max_keywords, 10);
        assert_eq!(parsed.analysis.max_section_length, 800);
        assert!(parsed.templates.seed_defaults);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[analysis]
max_keywords = 25

[templates]
seed_defaults = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.analysis.max_keywords, 25);
        assert_eq!(config.analysis.summary_max_sentences, 3);
        assert!(!config.templates.seed_defaults);
        assert_eq!(config.storage.db_path, "~/.postcraft/templates.db");
    }

    #[test]
    fn analysis_options_from_app_config() {
        let app = AppConfig::default();
        let opts = AnalysisOptions::from(&app);
        assert_eq!(opts.max_keywords, 10);
        assert_eq!(opts.summary_max_length, 300);
        assert_eq!(opts, AnalysisOptions::default());
    }

    #[test]
    fn absolute_db_path_is_kept() {
        let storage = StorageConfig {
            db_path: "/var/lib/postcraft/t.db".into(),
        };
        let path = resolve_db_path(&storage).expect("resolve");
        assert_eq!(path, PathBuf::from("/var/lib/postcraft/t.db"));
    }
}
