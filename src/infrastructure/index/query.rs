use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::{IndexError, IndexHandle, ScoredDocument};
use crate::domain::types::{ChatMessage, MessageRole};
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest};

pub const DEFAULT_SIMILARITY_TOP_K: usize = 2;

const EMPTY_INDEX_ANSWER: &str = "The research index does not contain any documents yet.";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub response: String,
    pub sources: Vec<String>,
}

/// Retrieval plus synthesis: nearest documents are stuffed into a context
/// prompt and the language model writes the answer.
#[derive(Clone)]
pub struct QueryEngine {
    index: IndexHandle,
    provider: Arc<dyn ModelProvider>,
    model: String,
    top_k: usize,
}

impl QueryEngine {
    pub fn new(index: IndexHandle, provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            index,
            provider,
            model: model.into(),
            top_k: DEFAULT_SIMILARITY_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub async fn query(&self, question: &str) -> Result<QueryAnswer, QueryError> {
        let hits = self.index.retrieve(question, self.top_k).await?;
        if hits.is_empty() {
            info!("Query against empty index");
            return Ok(QueryAnswer {
                response: EMPTY_INDEX_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }
        debug!(
            hits = hits.len(),
            best_score = hits[0].score,
            "Retrieved context for query"
        );

        let prompt = compose_prompt(question, &hits);
        let response = self
            .provider
            .chat(ModelRequest {
                model: self.model.clone(),
                messages: vec![ChatMessage::new(MessageRole::User, prompt)],
                session_id: None,
            })
            .await?;

        Ok(QueryAnswer {
            response: response.message.content.trim().to_string(),
            sources: hits
                .into_iter()
                .map(|hit| hit.document.metadata.title)
                .collect(),
        })
    }
}

fn compose_prompt(question: &str, hits: &[ScoredDocument]) -> String {
    let context = hits
        .iter()
        .map(|hit| {
            format!(
                "title: {}\n\n{}",
                hit.document.metadata.title, hit.document.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Context information is below.\n---------------------\n{context}\n---------------------\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {question}\nAnswer: "
    )
}
