//! Config command handlers: create defaults and show the config directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use jobcli_core::config;
use jobcli_core::{Config, ConfigError};

fn require_dir(config_dir: Option<&Path>) -> Result<&Path> {
    config_dir.ok_or_else(|| anyhow!(ConfigError::NoConfigDir))
}

/// Writes `config.json` and `proxies.txt` when they do not exist yet.
pub fn run_config_init_command(
    config_dir: Option<&Path>,
    defaults: &Config,
    out: &mut dyn Write,
) -> Result<()> {
    let dir = require_dir(config_dir)?;
    let created = config::init_in(dir, defaults)?;
    writeln!(out, "{}", init_message(dir, &created))?;
    Ok(())
}

fn init_message(dir: &Path, created: &[PathBuf]) -> String {
    if created.is_empty() {
        return format!("Config already initialized at {}", dir.display());
    }
    let paths: Vec<String> = created.iter().map(|p| p.display().to_string()).collect();
    format!("Created: {}", paths.join(", "))
}

pub fn run_config_path_command(config_dir: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let dir = require_dir(config_dir)?;
    writeln!(out, "{}", dir.display())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn defaults() -> Config {
        Config::defaults_with(|_| None)
    }

    #[test]
    fn test_config_init_then_already_initialized() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("jobcli");

        let mut out = Vec::new();
        run_config_init_command(Some(&dir), &defaults(), &mut out).unwrap();
        let first = String::from_utf8(out).unwrap();
        assert!(first.starts_with("Created: "));
        assert!(first.contains("config.json"));
        assert!(first.contains("proxies.txt"));

        let mut out = Vec::new();
        run_config_init_command(Some(&dir), &defaults(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Config already initialized at {}\n", dir.display())
        );
    }

    #[test]
    fn test_config_path_prints_dir() {
        let mut out = Vec::new();
        run_config_path_command(Some(Path::new("/tmp/cfg/jobcli")), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/tmp/cfg/jobcli\n");
    }

    #[test]
    fn test_config_path_without_dir_fails() {
        let err = run_config_path_command(None, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("config directory"));
    }
}
