//! Seen-history file persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Job;

/// Errors reading or writing a jobs JSON file.
#[derive(Debug, Error)]
pub enum SeenIoError {
    /// An empty path was supplied.
    #[error("path is required")]
    MissingPath,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File content is not a JSON array of jobs.
    #[error("{}: invalid jobs JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SeenIoError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true when the error means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

fn require_path(path: &Path) -> Result<(), SeenIoError> {
    if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
        return Err(SeenIoError::MissingPath);
    }
    Ok(())
}

/// Reads a JSON array of jobs.
///
/// Whitespace-only files and a JSON `null` both read as an empty list.
///
/// # Errors
///
/// Returns [`SeenIoError`] when the path is empty, the file cannot be read,
/// or the content is not a jobs array.
pub fn read_jobs(path: &Path) -> Result<Vec<Job>, SeenIoError> {
    require_path(path)?;
    let data = fs::read_to_string(path).map_err(|e| SeenIoError::io(path, e))?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let jobs: Option<Vec<Job>> =
        serde_json::from_str(&data).map_err(|e| SeenIoError::json(path, e))?;
    Ok(jobs.unwrap_or_default())
}

/// Like [`read_jobs`] but a missing file reads as empty history.
///
/// # Errors
///
/// Returns every [`read_jobs`] error except "not found".
pub fn read_jobs_allow_missing(path: &Path) -> Result<Vec<Job>, SeenIoError> {
    match read_jobs(path) {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

/// Writes `jobs` as pretty-printed JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`SeenIoError`] when the path is empty or the write fails.
pub fn write_jobs(path: &Path, jobs: &[Job]) -> Result<(), SeenIoError> {
    require_path(path)?;
    let mut data = serde_json::to_string_pretty(jobs).map_err(|e| SeenIoError::json(path, e))?;
    data.push('\n');
    fs::write(path, data).map_err(|e| SeenIoError::io(path, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_jobs_empty_path_is_error() {
        let err = read_jobs(Path::new("")).unwrap_err();
        assert!(matches!(err, SeenIoError::MissingPath));
        assert_eq!(err.to_string(), "path is required");
    }

    #[test]
    fn test_read_jobs_whitespace_and_null_are_empty() {
        let dir = TempDir::new().unwrap();
        let blank = dir.path().join("blank.json");
        fs::write(&blank, " \n\t").unwrap();
        assert!(read_jobs(&blank).unwrap().is_empty());

        let null = dir.path().join("null.json");
        fs::write(&null, "null").unwrap();
        assert!(read_jobs(&null).unwrap().is_empty());
    }

    #[test]
    fn test_read_jobs_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"title":"x"}"#).unwrap();
        assert!(matches!(read_jobs(&path), Err(SeenIoError::Json { .. })));
    }

    #[test]
    fn test_read_jobs_allow_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(read_jobs(&missing).unwrap_err().is_not_found());
        assert!(read_jobs_allow_missing(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_write_jobs_is_pretty_with_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let jobs = vec![Job::new("linkedin", "Engineer", "Acme")];

        write_jobs(&path, &jobs).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"site\": \"linkedin\""));
        assert!(raw.ends_with("]\n"));
        assert_eq!(read_jobs(&path).unwrap(), jobs);
    }

    #[test]
    fn test_write_jobs_empty_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        write_jobs(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
