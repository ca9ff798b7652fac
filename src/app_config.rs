use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module holds the tunables of a training run that are not tied to a
/// particular language: worker limits, tool lookup and timeouts, logging.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Parallel rendering jobs
    #[serde(default = "default_render_workers")]
    pub render_workers: usize,

    /// Parallel feature extraction jobs
    #[serde(default = "default_feature_workers")]
    pub feature_workers: usize,

    /// Page cap passed to the renderer, 0 means no cap
    #[serde(default)]
    pub max_pages: u32,

    /// Per-tool wall clock limit in seconds, none by default
    #[serde(default)]
    pub tool_timeout_secs: Option<u64>,

    /// Root the tool search directories are relative to
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Subdirectories of the install root probed before PATH
    #[serde(default = "default_tool_search_roots")]
    pub tool_search_roots: Vec<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_render_workers() -> usize {
    1
}

fn default_feature_workers() -> usize {
    2
}

fn default_install_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_tool_search_roots() -> Vec<String> {
    vec![String::new(), "api".to_string(), "training".to_string()]
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.render_workers == 0 {
            return Err(anyhow!("render_workers must be at least 1"));
        }

        if self.feature_workers == 0 {
            return Err(anyhow!("feature_workers must be at least 1"));
        }

        if self.tool_timeout_secs == Some(0) {
            return Err(anyhow!("tool_timeout_secs must be positive when set"));
        }

        Ok(())
    }

    /// Absolute directories probed for tools, in search order
    pub fn tool_search_dirs(&self) -> Vec<PathBuf> {
        self.tool_search_roots
            .iter()
            .map(|sub| {
                if sub.is_empty() {
                    self.install_root.clone()
                } else {
                    self.install_root.join(sub)
                }
            })
            .collect()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: LogLevel::default(),
            render_workers: default_render_workers(),
            feature_workers: default_feature_workers(),
            max_pages: 0,
            tool_timeout_secs: None,
            install_root: default_install_root(),
            tool_search_roots: default_tool_search_roots(),
        }
    }
}
