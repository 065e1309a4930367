//! Persistent configuration: `config.json` and `proxies.txt`.
//!
//! Both live in `$XDG_CONFIG_HOME/jobcli/`, falling back to
//! `$HOME/.config/jobcli/`. Built-in defaults can be overridden through
//! `JOBCLI_DEFAULT_LOCATION`, `JOBCLI_DEFAULT_COUNTRY` and
//! `JOBCLI_DEFAULT_LIMIT`; a config file then overlays its non-empty values.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DIR_NAME: &str = "jobcli";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const PROXIES_FILE_NAME: &str = "proxies.txt";
pub const PROXIES_ENV: &str = "JOBCLI_PROXIES";

const DEFAULT_COUNTRY: &str = "usa";
const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot locate config directory: set XDG_CONFIG_HOME or HOME")]
    NoConfigDir,

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Default search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub default_location: String,
    pub default_country: String,
    pub default_limit: usize,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    default_location: Option<String>,
    default_country: Option<String>,
    default_limit: Option<usize>,
}

impl Config {
    /// Built-in defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::defaults_with(|key| env::var(key).ok())
    }

    /// Built-in defaults, reading overrides through `lookup`.
    ///
    /// An unparsable `JOBCLI_DEFAULT_LIMIT` falls back to the built-in limit.
    pub fn defaults_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            default_location: non_empty("JOBCLI_DEFAULT_LOCATION").unwrap_or_default(),
            default_country: non_empty("JOBCLI_DEFAULT_COUNTRY")
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            default_limit: non_empty("JOBCLI_DEFAULT_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Loads `config.json` from `dir` over `defaults`.
    ///
    /// A missing or whitespace-only file yields `defaults` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read or parsed.
    pub fn load_from(dir: &Path, defaults: Self) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(defaults),
            Err(e) => return Err(ConfigError::io(&path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(defaults);
        }
        let file: FileConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");

        let mut config = defaults;
        if let Some(location) = file.default_location.filter(|v| !v.trim().is_empty()) {
            config.default_location = location;
        }
        if let Some(country) = file.default_country.filter(|v| !v.trim().is_empty()) {
            config.default_country = country;
        }
        if let Some(limit) = file.default_limit.filter(|v| *v > 0) {
            config.default_limit = limit;
        }
        Ok(config)
    }

    /// Loads from the default config directory.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`]; also fails when no directory can be resolved.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&dir, Self::from_env())
    }
}

/// `$XDG_CONFIG_HOME/jobcli`, else `$HOME/.config/jobcli`.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join(DIR_NAME));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join(DIR_NAME))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Creates `dir` with a default `config.json` and an empty `proxies.txt`.
///
/// Existing files are left alone. Returns the paths that were created.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] on any filesystem failure.
pub fn init_in(dir: &Path, defaults: &Config) -> Result<Vec<PathBuf>, ConfigError> {
    fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;
    let mut created = Vec::new();

    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        let mut body = serde_json::to_string_pretty(defaults).map_err(|source| {
            ConfigError::Json {
                path: config_path.clone(),
                source,
            }
        })?;
        body.push('\n');
        fs::write(&config_path, body).map_err(|e| ConfigError::io(&config_path, e))?;
        created.push(config_path);
    }

    let proxies_path = dir.join(PROXIES_FILE_NAME);
    if !proxies_path.exists() {
        fs::write(&proxies_path, "").map_err(|e| ConfigError::io(&proxies_path, e))?;
        created.push(proxies_path);
    }

    Ok(created)
}

/// Resolves the proxy list.
///
/// An inline `flag` value wins, then `env_value`, then the lines of
/// `proxies.txt` in `dir`. A missing file means no proxies.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if `proxies.txt` exists but cannot be read.
pub fn load_proxies_from(
    flag: &str,
    env_value: Option<&str>,
    dir: Option<&Path>,
) -> Result<Vec<String>, ConfigError> {
    if !flag.trim().is_empty() {
        return Ok(split_csv(flag));
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(split_csv(value));
    }
    let Some(dir) = dir else {
        return Ok(Vec::new());
    };
    let path = dir.join(PROXIES_FILE_NAME);
    match fs::read_to_string(&path) {
        Ok(raw) => Ok(parse_proxy_lines(&raw)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(ConfigError::io(&path, e)),
    }
}

/// [`load_proxies_from`] with `JOBCLI_PROXIES` and the default directory.
///
/// # Errors
///
/// See [`load_proxies_from`].
pub fn load_proxies(flag: &str) -> Result<Vec<String>, ConfigError> {
    let env_value = env::var(PROXIES_ENV).ok();
    load_proxies_from(flag, env_value.as_deref(), config_dir().as_deref())
}

/// Splits on commas, trimming and dropping blanks.
#[must_use]
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-blank lines that are not `#` comments.
#[must_use]
pub fn parse_proxy_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// `1`, `true`, `yes` and `on` (any case) are truthy.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Whether environment variable `name` is set to a truthy value.
#[must_use]
pub fn env_truthy(name: &str) -> bool {
    env::var(name).is_ok_and(|v| is_truthy(&v))
}
