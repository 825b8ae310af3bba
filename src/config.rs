//! Configuration file and settings resolution
//!
//! Precedence: command line, then `foxi.toml`, then built-in defaults.

use crate::cli::{CliArgs, MAX_VARIABLES_LIMIT};
use crate::error::ConfigError;
use crate::prover::DEFAULT_MAX_VARIABLES;
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "foxi.toml";

/// History file used when neither the CLI nor the config names one
pub const DEFAULT_HISTFILE: &str = "./.foxi-history";

/// Contents of `foxi.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub histfile: Option<PathBuf>,
    pub max_variables: Option<usize>,
    pub color: Option<bool>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::parse_error(path, e.to_string()))?;

        if let Some(n) = config.max_variables {
            if n == 0 || n > MAX_VARIABLES_LIMIT {
                return Err(ConfigError::invalid_value(
                    "max_variables",
                    format!("must be between 1 and {}, got {}", MAX_VARIABLES_LIMIT, n),
                ));
            }
        }
        Ok(config)
    }

    /// Load `--config` if given, else `./foxi.toml` if it exists, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub files: Vec<PathBuf>,
    pub debug: bool,
    pub test: bool,
    pub quiet: bool,
    pub json: bool,
    pub color: bool,
    pub histfile: PathBuf,
    pub max_variables: usize,
}

impl Settings {
    /// Resolve settings from the command line and the discovered config file
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = FileConfig::discover(args.config.as_deref())?;
        let color = std::io::stdout().is_terminal();
        Ok(Self::merge(args, file, color))
    }

    /// Merge CLI arguments over file values; `terminal` says whether stdout is a tty
    pub fn merge(args: &CliArgs, file: FileConfig, terminal: bool) -> Self {
        Self {
            files: args.files.clone(),
            debug: args.debug,
            test: args.test,
            quiet: args.quiet,
            json: args.json,
            color: terminal && !args.no_color && file.color.unwrap_or(true),
            histfile: args
                .histfile
                .clone()
                .or(file.histfile)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTFILE)),
            max_variables: args
                .max_variables
                .or(file.max_variables)
                .unwrap_or(DEFAULT_MAX_VARIABLES),
        }
    }
}
