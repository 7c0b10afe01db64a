//! Writes tool output into the configured output directory.

use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("invalid output file name: {0:?}")]
    InvalidName(String),
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `content` verbatim, replacing any file of the same name.
    ///
    /// Only the last path component of `file_name` is honoured; without one the
    /// file is named `output_<UTC timestamp>.txt`.
    pub async fn write(&self, content: &str, file_name: Option<&str>) -> Result<PathBuf, OutputError> {
        let name = match file_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(requested) => Path::new(requested)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| OutputError::InvalidName(requested.to_string()))?,
            None => format!("output_{}.txt", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| OutputError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| OutputError::Io {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), bytes = content.len(), "Wrote output file");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_verbatim_and_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = OutputWriter::new(dir.path().join("output"));
        let path = writer
            .write("line one\nline two", Some("notes.md"))
            .await
            .expect("write");
        assert_eq!(path, dir.path().join("output").join("notes.md"));
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "line one\nline two"
        );
    }

    #[tokio::test]
    async fn strips_directories_from_requested_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = OutputWriter::new(dir.path());
        let path = writer
            .write("x", Some("../../etc/passwd"))
            .await
            .expect("write");
        assert_eq!(path, dir.path().join("passwd"));
    }

    #[tokio::test]
    async fn default_name_is_timestamped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = OutputWriter::new(dir.path());
        let path = writer.write("x", None).await.expect("write");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("output_"));
        assert!(name.ends_with(".txt"));
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = OutputWriter::new(dir.path());
        writer.write("old", Some("a.txt")).await.expect("write");
        let path = writer.write("new", Some("a.txt")).await.expect("write");
        assert_eq!(std::fs::read_to_string(path).expect("read"), "new");
    }

    #[tokio::test]
    async fn parent_reference_alone_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = OutputWriter::new(dir.path());
        let err = writer.write("x", Some("..")).await.expect_err("invalid");
        assert!(matches!(err, OutputError::InvalidName(_)));
    }
}
