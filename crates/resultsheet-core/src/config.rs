//! Deployment configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scheme::SchemeRegistry;

/// Top-level resultsheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsheetConfig {
    /// Printed as `Name of Assessing Body` in sheet preambles.
    #[serde(default = "default_assessing_body")]
    pub assessing_body: String,
    /// Fallback assessor name. An assessor recorded on the batch wins.
    #[serde(default)]
    pub assessor_name: String,
    /// Scheme used when a batch records none.
    #[serde(default = "default_scheme")]
    pub default_scheme: String,
    /// Replacement scheme configuration; the built-in table when unset.
    #[serde(default)]
    pub schemes_file: Option<PathBuf>,
    /// Output directory for sheets.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// First preamble line.
    #[serde(default = "default_report_title")]
    pub report_title: String,
}

fn default_assessing_body() -> String {
    "WMPSC Assessor".to_string()
}
fn default_scheme() -> String {
    "mbjr".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./resultsheet-results")
}
fn default_report_title() -> String {
    "RESULT SHEET".to_string()
}

impl Default for ResultsheetConfig {
    fn default() -> Self {
        Self {
            assessing_body: default_assessing_body(),
            assessor_name: String::new(),
            default_scheme: default_scheme(),
            schemes_file: None,
            output_dir: default_output_dir(),
            report_title: default_report_title(),
        }
    }
}

impl ResultsheetConfig {
    /// Build the scheme registry this configuration points at.
    pub fn scheme_registry(&self) -> Result<SchemeRegistry> {
        match &self.schemes_file {
            Some(path) => SchemeRegistry::from_path(path),
            None => SchemeRegistry::builtin(),
        }
    }

    /// Assessor for a batch: the batch's own record, else the configured one.
    pub fn assessor_for<'a>(&'a self, batch_assessor: Option<&'a str>) -> &'a str {
        batch_assessor.unwrap_or(&self.assessor_name)
    }
}

/// Expand `${NAME}` references from the environment. Unset variables expand
/// to nothing; an unterminated `${` is kept as written.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find("${") {
        let Some(len) = rest[open + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&std::env::var(&rest[open + 2..open + 2 + len]).unwrap_or_default());
        rest = &rest[open + 3 + len..];
    }
    out.push_str(rest);
    out
}

fn resolve_config(config: &mut ResultsheetConfig) {
    config.assessing_body = resolve_env_vars(&config.assessing_body);
    config.assessor_name = resolve_env_vars(&config.assessor_name);
    config.default_scheme = resolve_env_vars(&config.default_scheme);
    config.report_title = resolve_env_vars(&config.report_title);
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));
    config.schemes_file = config
        .schemes_file
        .as_ref()
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `resultsheet.toml` in the current directory
/// 2. `~/.config/resultsheet/config.toml`
///
/// Environment variable override: `RESULTSHEET_ASSESSOR`.
pub fn load_config() -> Result<ResultsheetConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ResultsheetConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("resultsheet.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config(path)?,
        None => ResultsheetConfig::default(),
    };

    if let Ok(assessor) = std::env::var("RESULTSHEET_ASSESSOR") {
        config.assessor_name = assessor;
    }

    resolve_config(&mut config);

    if let Some(path) = &config_path {
        tracing::debug!("using config {}", path.display());
    }
    Ok(config)
}

fn parse_config(path: &Path) -> Result<ResultsheetConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ResultsheetConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("resultsheet"))
}
