//! Output format selection and rendering.
//!
//! [`resolve_format`] is a pure function of the output flags, whether an
//! output file was requested and whether stdout is a terminal. Rendering
//! lives in [`write_jobs`]; the run summary in [`format_search_summary`].

mod render;
mod summary;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use render::{RenderOptions, hyperlink, short_url_label, write_jobs};
pub use summary::{format_search_summary, site_counts};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutputError {
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    #[error("unknown link style '{0}'")]
    UnknownLinkStyle(String),
    #[error("unknown color mode '{0}'")]
    UnknownColorMode(String),
}

/// Render format for a job list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Csv,
    Tsv,
    Json,
    Markdown,
}

impl Format {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = OutputError;

    /// Accepts `csv`, `json`, `md`/`markdown`, `tsv` and `table`; an empty
    /// name means table.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "tsv" => Ok(Self::Tsv),
            "table" | "" => Ok(Self::Table),
            _ => Err(OutputError::UnknownFormat(value.to_string())),
        }
    }
}

/// How URLs appear in table output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LinkStyle {
    /// `host/path` label, only used when the URL is also a hyperlink.
    Short,
    #[default]
    Full,
}

impl FromStr for LinkStyle {
    type Err = OutputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "short" => Ok(Self::Short),
            "full" => Ok(Self::Full),
            other => Err(OutputError::UnknownLinkStyle(other.to_string())),
        }
    }
}

/// Color preference from `--color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

impl FromStr for ColorMode {
    type Err = OutputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(OutputError::UnknownColorMode(other.to_string())),
        }
    }
}

/// Picks the render format.
///
/// With an output file: `--json`, then `--plain`, then an explicit format,
/// otherwise CSV. On stdout: `--json`, then `--plain`, then an explicit
/// format, then a table for terminals and CSV otherwise.
///
/// # Errors
///
/// Returns [`OutputError::UnknownFormat`] for an unrecognized format name.
pub fn resolve_format(
    json: bool,
    plain: bool,
    format: &str,
    has_output_path: bool,
    stdout_is_terminal: bool,
) -> Result<Format, OutputError> {
    if json {
        return Ok(Format::Json);
    }
    if plain {
        return Ok(Format::Tsv);
    }
    if !format.trim().is_empty() {
        return format.parse();
    }
    if has_output_path || !stdout_is_terminal {
        Ok(Format::Csv)
    } else {
        Ok(Format::Table)
    }
}

/// Whether to emit ANSI color.
///
/// Machine-readable modes and `NO_COLOR` always disable color; otherwise
/// `auto` follows the terminal.
#[must_use]
pub fn color_enabled(
    mode: ColorMode,
    machine_output: bool,
    no_color_env: bool,
    is_terminal: bool,
) -> bool {
    if machine_output || no_color_env {
        return false;
    }
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => is_terminal,
    }
}
