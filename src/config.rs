//! Configuration for filegrid.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (FILEGRID_FOLDER_ID, FILEGRID_CONF)
//! 2. Config file (.filegrid/config.yaml)
//! 3. Defaults (~/.filegrid)
//!
//! Config file discovery:
//! - Searches current directory and parents for .filegrid/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Default title for the published spreadsheet
pub const DEFAULT_REPORT_TITLE: &str = "file_availability_matrix";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    /// Drive folder to inventory
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub report: Option<ReportConfig>,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Spreadsheet title
    pub title: Option<String>,
    /// Folder columns dropped from the matrix before publishing
    #[serde(default)]
    pub exclude_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Credentials directory (relative to config file)
    pub conf: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Drive folder to inventory (None until configured)
    pub folder_id: Option<String>,
    /// Spreadsheet title for the published report
    pub report_title: String,
    /// Folder columns excluded from the published matrix
    pub exclude_columns: Vec<String>,
    /// Absolute path to the credentials directory
    pub conf_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".filegrid").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default conf directory
    let default_conf = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".filegrid");

    // Check for config file
    let config_file = find_config_file();

    let (folder_id, report_title, exclude_columns, conf_dir) =
        if let Some(ref config_path) = config_file {
            // Config file found - use it as base
            let config = load_config_file(config_path)?;

            // Base directory is the parent of .filegrid/ (project root)
            let base_dir = config_path
                .parent() // .filegrid/
                .and_then(|p| p.parent()) // project root
                .unwrap_or(Path::new("."));

            let folder_id = std::env::var("FILEGRID_FOLDER_ID")
                .ok()
                .or(config.folder_id);

            let report = config.report.unwrap_or_default();
            let report_title = report
                .title
                .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());

            let conf_dir = if let Ok(env_conf) = std::env::var("FILEGRID_CONF") {
                PathBuf::from(env_conf)
            } else if let Some(ref conf_path) = config.paths.conf {
                resolve_path(base_dir, conf_path)
            } else {
                default_conf.clone()
            };

            (folder_id, report_title, report.exclude_columns, conf_dir)
        } else {
            // No config file - use env vars or defaults
            let folder_id = std::env::var("FILEGRID_FOLDER_ID").ok();
            let conf_dir = std::env::var("FILEGRID_CONF")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_conf.clone());

            (
                folder_id,
                DEFAULT_REPORT_TITLE.to_string(),
                Vec::new(),
                conf_dir,
            )
        };

    Ok(ResolvedConfig {
        folder_id,
        report_title,
        exclude_columns,
        conf_dir,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
