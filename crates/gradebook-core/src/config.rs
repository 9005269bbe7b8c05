//! Gradebook configuration.
//!
//! Everything has a default, so a missing config file is not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "gradebook.toml";

/// Top-level gradebook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Student name shown in the report banner and footer.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Institution shown next to the owner in the banner.
    #[serde(default = "default_institution")]
    pub institution: String,
    /// Application name used in the footer credit line.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Directory exported reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_owner() -> String {
    "Eliane Orozco".to_string()
}
fn default_institution() -> String {
    "Universidad del Magdalena".to_string()
}
fn default_app_name() -> String {
    "Calculadora Académica".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            institution: default_institution(),
            app_name: default_app_name(),
            output_dir: default_output_dir(),
        }
    }
}

impl GradebookConfig {
    /// Owner line printed under the banner title.
    pub fn owner_line(&self) -> String {
        if self.institution.is_empty() {
            self.owner.clone()
        } else {
            format!("{} - {}", self.owner, self.institution)
        }
    }

    /// Credit line printed at the bottom of every page.
    pub fn footer_line(&self) -> String {
        format!("Generado por {} - {}", self.app_name, self.owner)
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// An explicit path must exist. Otherwise the search order is:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// Defaults are used when neither file exists.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config_file(&path)
        }
        None => Ok(GradebookConfig::default()),
    }
}

fn parse_config_file(path: &Path) -> Result<GradebookConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<GradebookConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GradebookConfig::default();
        assert_eq!(config.owner, "Eliane Orozco");
        assert_eq!(
            config.owner_line(),
            "Eliane Orozco - Universidad del Magdalena"
        );
        assert_eq!(
            config.footer_line(),
            "Generado por Calculadora Académica - Eliane Orozco"
        );
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: GradebookConfig = toml::from_str(
            r#"
owner = "Ana Pérez"
output_dir = "reports"
"#,
        )
        .unwrap();
        assert_eq!(config.owner, "Ana Pérez");
        assert_eq!(config.institution, "Universidad del Magdalena");
        assert_eq!(config.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn owner_line_without_institution() {
        let config = GradebookConfig {
            institution: String::new(),
            ..GradebookConfig::default()
        };
        assert_eq!(config.owner_line(), "Eliane Orozco");
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config_from(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradebook.toml");
        std::fs::write(&path, "institution = \"UNAL\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.institution, "UNAL");
        assert_eq!(config.owner, "Eliane Orozco");
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "owner = [").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
