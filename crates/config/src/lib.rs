//! Layered configuration for inpxer.
//!
//! Values are resolved from, in increasing priority:
//! 1. built-in defaults,
//! 2. a configuration file (`toml`, `yaml`/`yml` or `json`, chosen by
//!    extension),
//! 3. environment variables prefixed with `INPXER_` (`INPXER_BATCH_SIZE=500`).
//!
//! Without an explicit file, `./inpxer.toml` is used if present, then
//! `inpxer.toml` in the platform configuration directory.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use inpxer_index::Storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Name of the configuration file looked up when none is given.
pub const FILE_NAME: &str = "inpxer.toml";
/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "INPXER_";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the index and its freshness markers.
    pub index_path: PathBuf,
    /// Language the index is built for.
    pub language: String,
    pub storage: Storage,
    /// Number of books collected before a flush is due. A flush happens once
    /// the batch grows past this size.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            language: DEFAULT_LANGUAGE.to_string(),
            storage: Storage::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "inpxer")
}

fn default_index_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("index"))
        .unwrap_or_else(|| PathBuf::from("index"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Find a configuration file when none was requested.
fn discover() -> Option<PathBuf> {
    let local = PathBuf::from(FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    project_dirs()
        .map(|dirs| dirs.config_dir().join(FILE_NAME))
        .filter(|path| path.is_file())
}

impl Config {
    /// Resolve the configuration from every layer and validate it.
    ///
    /// An explicit `file` must exist; a discovered one is optional.
    #[instrument(skip_all)]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.display().to_string())),
            Some(path) => Some(path.to_path_buf()),
            None => discover(),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Using configuration file"),
            None => tracing::debug!("No configuration file, using defaults and environment"),
        }
        let figment = Self::figment(file.as_deref())?.merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(figment)
    }

    /// Defaults merged with the given file, without environment overrides.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let Some(path) = file else {
            return Ok(figment);
        };
        Ok(match FileFormat::from_path(path)? {
            FileFormat::Toml => figment.merge(Toml::file_exact(path)),
            FileFormat::Yaml => figment.merge(Yaml::file_exact(path)),
            FileFormat::Json => figment.merge(Json::file_exact(path)),
        })
    }

    /// Extract and validate a configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_path.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("index_path"));
        }
        if self.language.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("language"));
        }
        if self.batch_size == 0 {
            exn::bail!(ErrorKind::Invalid("batch_size"));
        }
        Ok(())
    }
}
