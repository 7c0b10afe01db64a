//! One-shot loader for the bootstrap document corpus.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::types::SourceDocument;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus directory {path:?} does not exist")]
    Missing { path: PathBuf },
    #[error("failed to read corpus at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads every regular, non-hidden file directly inside `dir` as one document
/// titled by its file name. PDFs contribute their extracted text; other files
/// must be UTF-8. Undecodable and blank files are skipped. The result is sorted
/// by file name so start-up is deterministic.
pub async fn load_directory(dir: &Path) -> Result<Vec<SourceDocument>, CorpusError> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        return Err(CorpusError::Missing {
            path: dir.to_path_buf(),
        });
    }

    let io_err = |source| CorpusError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let file_type = entry.file_type().await.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !file_type.is_file() || name.starts_with('.') {
            continue;
        }
        files.push((name, entry.path()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut documents = Vec::with_capacity(files.len());
    for (name, path) in files {
        let bytes = tokio::fs::read(&path).await.map_err(|source| CorpusError::Io {
            path: path.clone(),
            source,
        })?;
        let text = if is_pdf(&path) {
            extract_pdf_text(&name, bytes).await
        } else {
            String::from_utf8(bytes)
                .inspect_err(|_| warn!(file = %name, "Skipping non UTF-8 corpus file"))
                .ok()
        };
        match text {
            Some(text) if !text.trim().is_empty() => {
                debug!(file = %name, "Loaded corpus document");
                documents.push(SourceDocument::new(name, text));
            }
            Some(_) => warn!(file = %name, "Skipping empty corpus file"),
            None => {}
        }
    }
    Ok(documents)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Runs on the blocking pool. Extraction errors and panics both skip the file.
async fn extract_pdf_text(name: &str, bytes: Vec<u8>) -> Option<String> {
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
        Ok(Ok(text)) => Some(text),
        Ok(Err(err)) => {
            warn!(file = %name, error = %err, "Skipping unreadable PDF");
            None
        }
        Err(err) => {
            warn!(file = %name, error = %err, "PDF extraction aborted");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn loads_text_files_sorted_and_skips_hidden() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.txt"), "second").expect("write");
        fs::write(dir.path().join("a.md"), "first").expect("write");
        fs::write(dir.path().join(".hidden"), "secret").expect("write");
        fs::write(dir.path().join("blank.txt"), "  \n").expect("write");
        fs::write(dir.path().join("binary.bin"), [0xff, 0xfe, 0x00]).expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");

        let documents = load_directory(dir.path()).await.expect("load");
        let titles: Vec<_> = documents.iter().map(|d| d.metadata.title.as_str()).collect();
        assert_eq!(titles, vec!["a.md", "b.txt"]);
        assert_eq!(documents[0].text, "first");
    }

    /// Single-page PDF showing `text` in Helvetica, with a valid xref table.
    fn minimal_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 18 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (number, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", number + 1).as_bytes());
        }
        let xref_at = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.extend_from_slice(xref.as_bytes());
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[tokio::test]
    async fn pdf_papers_contribute_their_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("attention.pdf"), minimal_pdf("Attention Is All You Need"))
            .expect("write");
        fs::write(dir.path().join("notes.txt"), "plain notes").expect("write");

        let documents = load_directory(dir.path()).await.expect("load");

        let titles: Vec<_> = documents.iter().map(|d| d.metadata.title.as_str()).collect();
        assert_eq!(titles, vec!["attention.pdf", "notes.txt"]);
        assert!(documents[0].text.contains("Attention"));
        assert!(!documents[0].text.contains("%PDF"));
    }

    #[tokio::test]
    async fn unreadable_pdf_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut broken = b"%PDF-1.7\n".to_vec();
        broken.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0xff]);
        fs::write(dir.path().join("broken.PDF"), broken).expect("write");
        fs::write(dir.path().join("notes.txt"), "plain notes").expect("write");

        let documents = load_directory(dir.path()).await.expect("load");

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].metadata.title, "notes.txt");
    }

    #[tokio::test]
    async fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_directory(&dir.path().join("data"))
            .await
            .expect_err("missing corpus");
        assert!(matches!(err, CorpusError::Missing { .. }));
    }
}
