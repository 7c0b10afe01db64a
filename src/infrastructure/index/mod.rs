//! Persisted semantic index over paper summaries and corpus documents.
//!
//! [`IndexHandle`] is opened once at start-up and handed to the tools that
//! read or mutate the index. Every mutating call finishes by writing the whole
//! index back to `<persist_dir>/docstore.json`.
//!
//! An update is *insert, then refresh, then persist*. The three steps are not
//! atomic: if persisting fails the in-memory index is already ahead of disk.
//! Updates are not idempotent either; repeating one replaces the matching
//! documents with copies under new ids.

mod query;
mod store;

pub use query::{DEFAULT_SIMILARITY_TOP_K, QueryAnswer, QueryEngine, QueryError};
pub use store::{
    IndexedDocument, ScoredDocument, VectorIndex, cosine_similarity, normalize_title,
};

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::types::{PaperRecord, SourceDocument};
use crate::infrastructure::embedding::{EmbeddingError, EmbeddingProvider};

pub const DOCSTORE_FILE: &str = "docstore.json";
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to access index at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("index at {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error("embedding provider returned {received} vectors for {expected} documents")]
    EmbeddingCount { expected: usize, received: usize },
}

/// Outcome of one [`IndexHandle::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub inserted: usize,
    pub replaced: usize,
    pub total: usize,
}

#[derive(Clone)]
pub struct IndexHandle {
    index: Arc<Mutex<VectorIndex>>,
    persist_dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    embed_batch_size: usize,
}

impl IndexHandle {
    /// Builds a fresh index from `documents` and persists it.
    pub async fn create(
        persist_dir: impl Into<PathBuf>,
        documents: Vec<SourceDocument>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, IndexError> {
        Self::create_batched(persist_dir, documents, embedder, DEFAULT_EMBED_BATCH_SIZE).await
    }

    /// Like [`IndexHandle::create`], sending at most `embed_batch_size` texts
    /// per embedding request.
    pub async fn create_batched(
        persist_dir: impl Into<PathBuf>,
        documents: Vec<SourceDocument>,
        embedder: Arc<dyn EmbeddingProvider>,
        embed_batch_size: usize,
    ) -> Result<Self, IndexError> {
        let handle = Self {
            index: Arc::new(Mutex::new(VectorIndex::new(embedder.model_name()))),
            persist_dir: persist_dir.into(),
            embedder,
            embed_batch_size: embed_batch_size.max(1),
        };
        {
            let embeddings = handle.embed_documents(&documents).await?;
            let mut index = handle.index.lock().await;
            for (document, embedding) in documents.into_iter().zip(embeddings) {
                index.insert(document, embedding);
            }
            info!(documents = index.len(), "Built new vector index");
        }
        handle.persist().await?;
        Ok(handle)
    }

    /// Loads a previously persisted index without embedding anything.
    pub async fn open(
        persist_dir: impl Into<PathBuf>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, IndexError> {
        let persist_dir = persist_dir.into();
        let path = persist_dir.join(DOCSTORE_FILE);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| IndexError::Io {
                path: path.clone(),
                source,
            })?;
        let index: VectorIndex =
            serde_json::from_str(&raw).map_err(|source| IndexError::Corrupt {
                path: path.clone(),
                source,
            })?;
        if index.embedding_model != embedder.model_name() {
            warn!(
                stored = index.embedding_model.as_str(),
                configured = embedder.model_name(),
                "Index was built with a different embedding model"
            );
        }
        info!(path = %path.display(), documents = index.len(), "Loaded vector index");
        Ok(Self {
            index: Arc::new(Mutex::new(index)),
            persist_dir,
            embedder,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
        })
    }

    /// Caps how many texts later updates send per embedding request.
    #[must_use]
    pub fn with_embed_batch_size(mut self, embed_batch_size: usize) -> Self {
        self.embed_batch_size = embed_batch_size.max(1);
        self
    }

    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.lock().await.is_empty()
    }

    /// Copy of the current documents, in insertion order.
    pub async fn documents(&self) -> Vec<IndexedDocument> {
        self.index.lock().await.documents().to_vec()
    }

    /// Inserts one document per record, refreshes them by title, and persists.
    pub async fn update(&self, records: Vec<PaperRecord>) -> Result<UpdateReport, IndexError> {
        let documents: Vec<SourceDocument> =
            records.into_iter().map(SourceDocument::from).collect();
        let embeddings = self.embed_documents(&documents).await?;

        let report = {
            let mut index = self.index.lock().await;
            for (document, embedding) in documents.iter().cloned().zip(embeddings) {
                index.insert(document, embedding);
            }
            let removed = index.refresh(&documents);
            UpdateReport {
                inserted: documents.len(),
                replaced: removed,
                total: index.len(),
            }
        };
        debug!(?report, "Vector index updated in memory");

        self.persist().await?;
        Ok(report)
    }

    /// Embeds `question` and returns the `k` closest documents.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<ScoredDocument>, IndexError> {
        if self.is_empty().await {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(question).await?;
        Ok(self.index.lock().await.nearest(&query, k))
    }

    pub async fn persist(&self) -> Result<(), IndexError> {
        tokio::fs::create_dir_all(&self.persist_dir)
            .await
            .map_err(|source| IndexError::Io {
                path: self.persist_dir.clone(),
                source,
            })?;
        let path = self.persist_dir.join(DOCSTORE_FILE);
        let payload = {
            let index = self.index.lock().await;
            serde_json::to_vec(&*index).map_err(|source| IndexError::Corrupt {
                path: path.clone(),
                source,
            })?
        };
        tokio::fs::write(&path, payload)
            .await
            .map_err(|source| IndexError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "Persisted vector index");
        Ok(())
    }

    async fn embed_documents(&self, documents: &[SourceDocument]) -> Result<Vec<Vec<f32>>, IndexError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<String> = documents.iter().map(|doc| doc.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch, chunk) in texts.chunks(self.embed_batch_size).enumerate() {
            let vectors = self.embedder.embed_batch(chunk).await?;
            if vectors.len() != chunk.len() {
                return Err(IndexError::EmbeddingCount {
                    expected: chunk.len(),
                    received: vectors.len(),
                });
            }
            debug!(batch, size = chunk.len(), "Embedded document batch");
            embeddings.extend(vectors);
        }
        Ok(embeddings)
    }
}
