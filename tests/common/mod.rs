// Shared stubs for integration tests. Nothing here touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use research_indexer::application::tooling::{ToolInterface, ToolInvokeError, ToolKind};
use research_indexer::domain::types::{ChatMessage, MessageRole, PaperBatch, PaperRecord};
use research_indexer::infrastructure::arxiv::{PaperSource, SearchError};
use research_indexer::infrastructure::embedding::{EmbeddingProvider, EmbeddingResult};
use research_indexer::infrastructure::model::{
    ModelError, ModelProvider, ModelRequest, ModelResponse,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

const DIMENSIONS: usize = 64;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
    requests: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn embedded(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; DIMENSIONS];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.len() > 3)
    {
        let bucket = word
            .to_lowercase()
            .bytes()
            .fold(7usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as usize));
        vector[bucket % DIMENSIONS] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|text| keyword_vector(text)).collect())
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Paper source that always returns the same batch.
#[derive(Default)]
pub struct StubSource {
    pub papers: Vec<PaperRecord>,
    pub queries: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn with_papers(papers: Vec<PaperRecord>) -> Self {
        Self {
            papers,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaperSource for StubSource {
    async fn search(&self, tags: &str) -> Result<PaperBatch, SearchError> {
        self.queries.lock().await.push(tags.to_string());
        Ok(PaperBatch::from_records(self.papers.clone()))
    }
}

pub fn transformer_papers() -> Vec<PaperRecord> {
    vec![
        PaperRecord::new(
            "Attention Is All You Need",
            "We propose the Transformer, a network architecture based solely on attention mechanisms, dispensing with recurrence and convolutions entirely.",
        ),
        PaperRecord::new(
            "An Image is Worth 16x16 Words",
            "Vision Transformer applies a pure transformer directly to sequences of image patches and performs very well on image classification tasks.",
        ),
        PaperRecord::new(
            "BERT: Pre-training of Deep Bidirectional Transformers",
            "BERT pretrains deep bidirectional representations from unlabeled text by jointly conditioning on left and right context.",
        ),
    ]
}

/// Answers a context prompt by naming the first title it was given.
#[derive(Default)]
pub struct ContextEchoProvider;

#[async_trait]
impl ModelProvider for ContextEchoProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let prompt = request
            .messages
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        let title = prompt
            .lines()
            .find_map(|line| line.strip_prefix("title: "))
            .unwrap_or("nothing relevant");
        Ok(ModelResponse {
            message: ChatMessage::new(MessageRole::Assistant, format!("According to {title}.")),
            session_id: request.session_id,
        })
    }
}

/// Replays canned agent replies; `Err` entries become model failures.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    responses: Arc<Mutex<Vec<Result<String, String>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses
                    .into_iter()
                    .map(|entry| entry.map(String::from).map_err(String::from))
                    .collect(),
            )),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(ModelError::InvalidResponse("script exhausted".into()));
        }
        match responses.remove(0) {
            Ok(text) => Ok(ModelResponse {
                message: ChatMessage::new(MessageRole::Assistant, text),
                session_id: request.session_id,
            }),
            Err(message) => Err(ModelError::InvalidResponse(message)),
        }
    }
}

/// Tool stub that counts invocations and echoes its arguments.
#[derive(Default)]
pub struct CountingTools {
    calls: AtomicUsize,
}

impl CountingTools {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolInterface for CountingTools {
    async fn invoke(&self, kind: ToolKind, arguments: Value) -> Result<Value, ToolInvokeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "tool": kind.name(), "arguments": arguments }))
    }
}
