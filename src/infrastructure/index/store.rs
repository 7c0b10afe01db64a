use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::types::{DocumentMetadata, SourceDocument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: Uuid,
    pub text: String,
    pub metadata: DocumentMetadata,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: IndexedDocument,
    pub score: f32,
}

/// In-memory vector store; the serialized form is what lands in `docstore.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    pub embedding_model: String,
    /// Length of the stored vectors, fixed by the first insert.
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    documents: Vec<IndexedDocument>,
}

impl VectorIndex {
    pub fn new(embedding_model: impl Into<String>) -> Self {
        Self {
            embedding_model: embedding_model.into(),
            dimension: None,
            documents: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    /// Appends a document under a fresh id. Never deduplicates; see [`Self::refresh`].
    pub fn insert(&mut self, source: SourceDocument, embedding: Vec<f32>) -> Uuid {
        let id = Uuid::new_v4();
        if self.dimension.is_none() && !embedding.is_empty() {
            self.dimension = Some(embedding.len());
        }
        self.documents.push(IndexedDocument {
            id,
            text: source.text,
            metadata: source.metadata,
            embedding,
        });
        id
    }

    /// Keeps only the newest document for every title in `batch`, comparing
    /// titles by [`normalize_title`]. Returns how many older copies were dropped.
    pub fn refresh(&mut self, batch: &[SourceDocument]) -> usize {
        let keys: Vec<String> = batch
            .iter()
            .map(|doc| normalize_title(&doc.metadata.title))
            .collect();

        let mut newest: HashMap<&str, usize> = HashMap::new();
        for (position, document) in self.documents.iter().enumerate() {
            let key = normalize_title(&document.metadata.title);
            if let Some(matched) = keys.iter().find(|candidate| **candidate == key) {
                newest.insert(matched.as_str(), position);
            }
        }

        let before = self.documents.len();
        let mut position = 0;
        self.documents.retain(|document| {
            let current = position;
            position += 1;
            let key = normalize_title(&document.metadata.title);
            match newest.get(key.as_str()) {
                Some(&keep) => keep == current,
                None => true,
            }
        });
        before - self.documents.len()
    }

    /// Top-`k` documents by cosine similarity, best first.
    pub fn nearest(&self, query: &[f32], k: usize) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .map(|document| ScoredDocument {
                score: cosine_similarity(query, &document.embedding),
                document: document.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Lowercased, trimmed, whitespace-collapsed title used as the dedup key.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cosine similarity; `0.0` for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
