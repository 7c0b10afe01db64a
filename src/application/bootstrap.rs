use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::infrastructure::corpus::{self, CorpusError};
use crate::infrastructure::embedding::EmbeddingProvider;
use crate::infrastructure::index::{IndexError, IndexHandle};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the index came to be available at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapMode {
    Created { documents: usize },
    Loaded { documents: usize },
}

/// Loads the index from `persist_dir`, or builds it from the corpus in
/// `data_dir` when `persist_dir` does not exist yet. The branch taken is
/// announced on `status` before any work starts. Embedding requests carry at
/// most `embed_batch_size` texts.
pub async fn open_or_create<W: Write>(
    persist_dir: &Path,
    data_dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    embed_batch_size: usize,
    status: &mut W,
) -> Result<(IndexHandle, BootstrapMode), BootstrapError> {
    if tokio::fs::try_exists(persist_dir).await.unwrap_or(false) {
        writeln!(
            status,
            "Index found, loading from directory: {}",
            persist_dir.display()
        )?;
        let handle = IndexHandle::open(persist_dir, embedder)
            .await?
            .with_embed_batch_size(embed_batch_size);
        let documents = handle.len().await;
        return Ok((handle, BootstrapMode::Loaded { documents }));
    }

    writeln!(status, "Index not found, creating one...")?;
    info!(data_dir = %data_dir.display(), "Building index from corpus");
    let documents = corpus::load_directory(data_dir).await?;
    let count = documents.len();
    let handle =
        IndexHandle::create_batched(persist_dir, documents, embedder, embed_batch_size).await?;
    Ok((handle, BootstrapMode::Created { documents: count }))
}
