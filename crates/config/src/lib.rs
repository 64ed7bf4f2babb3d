//! Layered configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: the path given on the command line, otherwise
//!    `config.toml` in the platform configuration directory (for example
//!    `~/.config/slidepack/config.toml`) if it exists. TOML, YAML and JSON
//!    are recognised by extension.
//! 3. Environment variables prefixed with `SLIDEPACK_`, nested with `__`
//!    (`SLIDEPACK_NAMING__ARCHIVE="backup_{{ date }}"`).
//!
//! Configuration is read-only: nothing is ever written back.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SLIDEPACK_";
const APPLICATION: &str = "slidepack";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// One step more verbose, saturating at `trace`.
    pub fn raised(self, steps: u8) -> Self {
        (0..steps).fold(self, |level, _| match level {
            Self::Error => Self::Warn,
            Self::Warn => Self::Info,
            Self::Info => Self::Debug,
            Self::Debug | Self::Trace => Self::Trace,
        })
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Canvas shape for generated slideshows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideLayout {
    #[default]
    #[serde(rename = "16x9", alias = "16:9")]
    Widescreen,
    #[serde(rename = "4x3", alias = "4:3")]
    Standard,
}

/// Artifact naming templates. Unset means the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub slideshow: Option<String>,
    pub archive: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidesConfig {
    pub layout: SlideLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where finished artifacts are written.
    pub output_dir: PathBuf,
    pub log_level: LogLevel,
    pub naming: NamingConfig,
    pub slides: SlidesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            log_level: LogLevel::default(),
            naming: NamingConfig::default(),
            slides: SlidesConfig::default(),
        }
    }
}

impl Config {
    /// Load from `file` if given (it must exist), otherwise from the default
    /// location if present, then apply the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        tracing::debug!(file = ?file, "Loading configuration");
        Self::extract(Self::figment(file.as_deref()))
    }

    /// `config.toml` in the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// The provider stack, exposed so callers can layer more on top.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            let extension = file.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
            figment = match extension.as_deref() {
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => figment.merge(Toml::file(file)),
            };
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from any figment.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let templates = [("naming.slideshow", &self.naming.slideshow), ("naming.archive", &self.naming.archive)];
        for (field, template) in templates {
            if template.as_deref().is_some_and(|t| t.trim().is_empty()) {
                exn::bail!(ErrorKind::Validation { field, reason: "template must not be blank" });
            }
        }
        if self.output_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Validation { field: "output_dir", reason: "must not be empty" });
        }
        Ok(())
    }
}
