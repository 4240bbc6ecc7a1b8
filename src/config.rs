use crate::error::{InsightsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path of the raw dataset read when the CLI does not override it.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory all artifacts are written into.
    pub out_dir: PathBuf,
    /// How many repositories each leaderboard keeps.
    pub top_repos: usize,
    /// How many tags the tag-frequency artifact keeps.
    pub top_tags: usize,
    /// Size of the most-starred subset used for correlation.
    pub popular_subset: usize,
    /// How many owners the ownership artifact keeps.
    pub top_owners: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Github_data.csv"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
            top_repos: 10,
            top_tags: 15,
            popular_subset: 100,
            top_owners: 10,
        }
    }
}

impl Config {
    /// Loads configuration. An explicitly requested file must exist; the
    /// default `config.toml` is optional and falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::read_file(default)
                } else {
                    tracing::debug!("no config.toml found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            InsightsError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_knob() {
        let config = Config::default();
        assert_eq!(config.input.path, PathBuf::from("Github_data.csv"));
        assert_eq!(config.report.out_dir, PathBuf::from("reports"));
        assert_eq!(config.report.top_repos, 10);
        assert_eq!(config.report.top_tags, 15);
        assert_eq!(config.report.popular_subset, 100);
        assert_eq!(config.report.top_owners, 10);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let config: Config = toml::from_str(
            r#"
            [report]
            top_tags = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.report.top_tags, 20);
        assert_eq!(config.report.top_repos, 10);
        assert_eq!(config.input.path, PathBuf::from("Github_data.csv"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/insights.toml"))).unwrap_err();
        assert!(err.to_string().contains("insights.toml"));
    }
}
