//! File collaborator boundary.
//!
//! The engine never touches the filesystem directly; open/save go through
//! [`FileStore`] so sessions can be tested without disk and a future remote
//! store can slot in. Blocking is accepted: a long save stalls only its own
//! session.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Byte-stream load/save boundary, line-oriented to match the buffer.
pub trait FileStore {
    fn load(&self, path: &Path) -> Result<Vec<String>, FileError>;
    fn save(&self, path: &Path, lines: &[String]) -> Result<(), FileError>;
}

/// `std::fs` implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn load(&self, path: &Path) -> Result<Vec<String>, FileError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                FileError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FileError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        // split (not str::lines) so a trailing newline yields a final empty
        // line, matching what the buffer would hold after typing it.
        Ok(content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect())
    }

    fn save(&self, path: &Path, lines: &[String]) -> Result<(), FileError> {
        fs::write(path, lines.join("\n")).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let lines = vec!["alpha".to_string(), "".into(), "gamma".into()];
        DiskStore.save(&path, &lines).unwrap();
        assert_eq!(DiskStore.load(&path).unwrap(), lines);
    }

    #[test]
    fn trailing_newline_becomes_empty_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "a\nb\n").unwrap();
        assert_eq!(
            DiskStore.load(&path).unwrap(),
            vec!["a".to_string(), "b".into(), "".into()]
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskStore.load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }

    #[test]
    fn crlf_input_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        fs::write(&path, "a\r\nb").unwrap();
        assert_eq!(
            DiskStore.load(&path).unwrap(),
            vec!["a".to_string(), "b".into()]
        );
    }
}
