//! Layered service configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional
//! TOML file, then `PRODUCTS_*` environment variables
//! (`PRODUCTS_DATABASE_PATH`, `PRODUCTS_LOG_LEVEL`, `PRODUCTS_LOG_DIR`).

use crate::logging::{default_log_level, LogTarget};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "PRODUCTS_";
const DEFAULT_DATABASE_FILE: &str = "products.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    MissingFile(PathBuf),
    Load(Box<figment::Error>),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile(path) => {
                write!(f, "config file `{}` does not exist", path.display())
            }
            Self::Load(err) => write!(f, "failed to load config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingFile(_) => None,
            Self::Load(err) => Some(err.as_ref()),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Load(Box::new(value))
    }
}

/// Runtime settings for the products service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file; created and migrated on open.
    pub database_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rotated log files. Logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Loads defaults, then `config_file` when given, then the environment.
    ///
    /// A named `config_file` must exist; only the file layer is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extracts configuration from a caller-assembled provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    pub fn log_target(&self) -> LogTarget {
        match &self.log_dir {
            Some(dir) => LogTarget::Directory(dir.clone()),
            None => LogTarget::Stderr,
        }
    }
}
