// ⚙️ Configuration - optional JSON file, defaults for everything

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::{CommandShareTarget, NoShareTarget, ShareTarget};
use crate::pricing::{PricingTable, PricingTableError};

/// Environment variable holding the tracing filter
pub const LOG_ENV: &str = "MOBILE_PRICE_WIZARD_LOG";

pub const LOG_FILE_NAME: &str = "mobile-price-wizard.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pricing(#[from] PricingTableError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    /// Where downloads and shared files are written
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Directory for the TUI log file (defaults to the system temp dir)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub share_command: Option<CommandShareTarget>,

    /// JSON pricing table replacing the built-in multipliers
    #[serde(default)]
    pub pricing_file: Option<PathBuf>,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for WizardConfig {
    fn default() -> Self {
        WizardConfig {
            export_dir: default_export_dir(),
            log_dir: None,
            share_command: None,
            pricing_file: None,
        }
    }
}

impl WizardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn pricing_table(&self) -> Result<PricingTable, ConfigError> {
        match &self.pricing_file {
            Some(path) => Ok(PricingTable::from_file(path)?),
            None => Ok(PricingTable::default()),
        }
    }

    pub fn share_target(&self) -> Box<dyn ShareTarget> {
        match &self.share_command {
            Some(command) => Box::new(command.clone()),
            None => Box::new(NoShareTarget),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
