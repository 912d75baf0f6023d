//! Configuration system: TOML file + env var overrides + smart defaults.
//!
//! Only TOML is read. A `config.yml` left next to the config path is reported by
//! `gday config path` but never parsed.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{GdayError, Result};
use crate::schedule::render::RenderMode;
use crate::source::InputFormat;

/// Full gday configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// How the schedule is printed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default ordering when neither `--sort-alpha` nor `--sort-interleaved` is given.
    pub sort: RenderMode,
    /// Colorize titles in human output.
    pub color: bool,
    /// Print skipped/suppressed entries to stderr.
    pub show_issues: bool,
}

/// Where the day's agenda comes from when no input is passed on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SourceConfig {
    pub agenda_file: Option<PathBuf>,
    pub format: Option<InputFormat>,
}

/// JSONL activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by gday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sort: RenderMode::Chronological,
            color: true,
            show_issues: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[GDAY-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("gday").join("config.toml");
        let data = home_dir.join(".local").join("share").join("gday");
        Self {
            config_file: cfg,
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// A YAML config sitting next to `path` (`config.yml` / `config.yaml`), if any.
    #[must_use]
    pub fn stray_yaml_config(path: &Path) -> Option<PathBuf> {
        ["yml", "yaml"]
            .into_iter()
            .map(|ext| path.with_extension(ext))
            .find(|candidate| candidate.is_file())
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    /// [`Config::load`] with an injectable environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| GdayError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(GdayError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes and releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GdayError::Serialization {
            context: "toml",
            details: e.to_string(),
        })
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // display
        if let Some(raw) = lookup("GDAY_DISPLAY_SORT") {
            self.display.sort = raw.parse().map_err(|_| env_error("GDAY_DISPLAY_SORT", &raw))?;
        }
        if let Some(raw) = lookup("GDAY_DISPLAY_COLOR") {
            self.display.color = parse_env_bool("GDAY_DISPLAY_COLOR", &raw)?;
        }
        if let Some(raw) = lookup("GDAY_DISPLAY_SHOW_ISSUES") {
            self.display.show_issues = parse_env_bool("GDAY_DISPLAY_SHOW_ISSUES", &raw)?;
        }

        // source
        if let Some(raw) = lookup("GDAY_SOURCE_AGENDA_FILE") {
            self.source.agenda_file = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("GDAY_SOURCE_FORMAT") {
            self.source.format =
                Some(raw.parse().map_err(|_| env_error("GDAY_SOURCE_FORMAT", &raw))?);
        }

        // logging
        if let Some(raw) = lookup("GDAY_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("GDAY_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("GDAY_LOGGING_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    /// Range-check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.logging.max_rotated_files == 0 {
            return Err(GdayError::InvalidConfig {
                details: "logging.max_rotated_files must be >= 1".to_string(),
            });
        }

        // A single activity line is a few hundred bytes; smaller caps rotate every write.
        if self.logging.max_size_bytes < 4096 {
            return Err(GdayError::InvalidConfig {
                details: format!(
                    "logging.max_size_bytes ({}) must be >= 4096",
                    self.logging.max_size_bytes
                ),
            });
        }

        if self.logging.enabled && self.paths.jsonl_log.as_os_str().is_empty() {
            return Err(GdayError::InvalidConfig {
                details: "paths.jsonl_log must be set when logging.enabled=true".to_string(),
            });
        }

        if let Some(file) = &self.source.agenda_file
            && file.as_os_str().is_empty()
        {
            return Err(GdayError::InvalidConfig {
                details: "source.agenda_file must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn env_error(name: &str, raw: &str) -> GdayError {
    GdayError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: unrecognized value"),
    }
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| GdayError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
