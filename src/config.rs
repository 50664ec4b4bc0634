//! Configuration for the rendering pipeline
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`--config` or `./tex2typ.toml`), `TEX2TYP_*` environment variables.
//! Command-line flags are applied last by the binary.
//!
//! ```toml
//! [typst]
//! compiler = "/opt/typst/bin/typst"
//! timeout_secs = 10
//! template = "page.typ"
//!
//! [output]
//! dpi = 600
//! strip_delimiters = true
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::utils::error::{ConversionError, ConversionResult};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "tex2typ.toml";

pub const ENV_TYPST: &str = "TEX2TYP_TYPST";
pub const ENV_TIMEOUT_SECS: &str = "TEX2TYP_TIMEOUT_SECS";
pub const ENV_DPI: &str = "TEX2TYP_DPI";
pub const ENV_TEMPLATE: &str = "TEX2TYP_TEMPLATE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub typst: TypstConfig,
    pub output: OutputConfig,
}

/// External compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypstConfig {
    /// Program name or path of the `typst` binary
    pub compiler: String,
    /// Seconds before a compile is killed
    pub timeout_secs: u64,
    /// Page template with an `${EQUATION}` placeholder
    pub template: Option<PathBuf>,
}

impl Default for TypstConfig {
    fn default() -> Self {
        Self {
            compiler: "typst".to_string(),
            timeout_secs: default_timeout_secs(),
            template: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
    pub strip_delimiters: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            strip_delimiters: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_dpi() -> u32 {
    300
}

impl Config {
    /// Load from `path` (or `./tex2typ.toml` if present), then apply the
    /// environment.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file just means defaults.
    pub fn load(path: Option<&Path>) -> ConversionResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load_from_file(default_path)?
                } else {
                    debug!("No configuration file found, using defaults");
                    Config::default()
                }
            }
        };
        config.apply_env_from(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> ConversionResult<Self> {
        info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            ConversionError::io(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConversionError::IoError { message } => {
                ConversionError::io(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> ConversionResult<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConversionError::io(format!("invalid TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(compiler) = lookup(ENV_TYPST).filter(|v| !v.trim().is_empty()) {
            self.typst.compiler = compiler;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.typst.timeout_secs = secs,
                _ => warn!("ignoring {}={:?}: expected a positive integer", ENV_TIMEOUT_SECS, raw),
            }
        }

        if let Some(raw) = lookup(ENV_DPI) {
            match raw.trim().parse::<u32>() {
                Ok(dpi) if dpi > 0 => self.output.dpi = dpi,
                _ => warn!("ignoring {}={:?}: expected a positive integer", ENV_DPI, raw),
            }
        }

        if let Some(template) = lookup(ENV_TEMPLATE).filter(|v| !v.trim().is_empty()) {
            self.typst.template = Some(PathBuf::from(template));
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.typst.timeout_secs)
    }

    fn validate(&self) -> ConversionResult<()> {
        if self.output.dpi == 0 {
            return Err(ConversionError::io("output.dpi must be a positive integer"));
        }
        if self.typst.timeout_secs == 0 {
            return Err(ConversionError::io(
                "typst.timeout_secs must be a positive integer",
            ));
        }
        Ok(())
    }
}
