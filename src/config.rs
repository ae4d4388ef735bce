use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::patterns::{PatternError, PatternSet};

pub const DEFAULT_CONFIG_FILE: &str = "sitemap_stats.toml";

// Written by `--init`
const DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0} (run with --init to create one)")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("`sitemap_url` must not be empty")]
    EmptySitemapUrl,
    #[error("`output.chart_top` must be greater than 0")]
    ZeroChartTop,
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("{0} already exists. Remove it first if you want to reinitialize.")]
    AlreadyExists(PathBuf),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raw pattern strings as they appear under `[patterns]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Marks a category page. Checked before `product`.
    pub category: String,
    /// Marks a product page.
    pub product: String,
    /// First capture group is the category name.
    pub category_name: String,
    /// First capture group is the manufacturer name.
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub chart_top: usize,
    pub timeout_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            chart_top: 20,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub sitemap_url: String,
    pub patterns: PatternConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!(action = "load", component = "config_file", file_path = ?path, "Loading configuration");
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        info!(action = "loaded", component = "config_file", sitemap_url = %config.sitemap_url, "Loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sitemap_url.trim().is_empty() {
            return Err(ConfigError::EmptySitemapUrl);
        }
        if self.output.chart_top == 0 {
            return Err(ConfigError::ZeroChartTop);
        }
        Ok(())
    }

    pub fn compile_patterns(&self) -> Result<PatternSet, ConfigError> {
        Ok(PatternSet::compile(&self.patterns)?)
    }
}

pub fn init_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    println!("Created {} with default patterns", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
sitemap_url = "https://a.com/sitemap.xml"

[patterns]
category = "/categoria/"
product = "/prodotto/"
category_name = "/categoria/([^/]+)"
manufacturer = "/prodotto/([a-z]+)-"
"#;

    #[test]
    fn embedded_default_config_is_valid() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.output, OutputConfig::default());
        config.compile_patterns().unwrap();
    }

    #[test]
    fn output_section_is_optional() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.sitemap_url, "https://a.com/sitemap.xml");
        assert_eq!(config.output.directory, PathBuf::from("output"));
        assert_eq!(config.output.chart_top, 20);
    }

    #[test]
    fn partial_output_section_keeps_defaults() {
        let content = format!("{MINIMAL}\n[output]\nchart_top = 5\n");
        let config = Config::parse(&content).unwrap();
        assert_eq!(config.output.chart_top, 5);
        assert_eq!(config.output.timeout_secs, 30);
    }

    #[test]
    fn missing_pattern_is_a_parse_error() {
        let content = MINIMAL.replace("manufacturer = \"/prodotto/([a-z]+)-\"", "");
        assert!(matches!(
            Config::parse(&content),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_url_is_rejected() {
        let content = MINIMAL.replace("https://a.com/sitemap.xml", " ");
        assert!(matches!(
            Config::parse(&content),
            Err(ConfigError::EmptySitemapUrl)
        ));
    }

    #[test]
    fn malformed_pattern_fails_at_compile() {
        let content = MINIMAL.replace("/categoria/([^/]+)", "/categoria/([^/]+");
        let config = Config::parse(&content).unwrap();
        assert!(matches!(
            config.compile_patterns(),
            Err(ConfigError::Pattern(PatternError::Invalid {
                key: "category_name",
                ..
            }))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn init_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        init_default_config(&path).unwrap();
        assert!(Config::load(&path).is_ok());
        assert!(matches!(
            init_default_config(&path),
            Err(ConfigError::AlreadyExists(_))
        ));
    }
}
