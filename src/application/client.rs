use crate::domain::types::{ChatMessage, MessageRole};
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub default_model: String,
    pub default_system_prompt: Option<String>,
}

impl ClientConfig {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            default_system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.default_system_prompt = Some(prompt.into());
        self
    }
}

#[derive(Debug)]
pub struct ChatRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatResult {
    pub content: String,
    pub session_id: String,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ChatError {
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Model(err) => err.user_message(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    system_prompt: Option<String>,
    history: Vec<ChatMessage>,
}

/// Multi-turn chat over a [`ModelProvider`]. A session remembers the system
/// prompt it was opened with and replays its history on every turn.
pub struct ChatClient<P: ModelProvider> {
    provider: P,
    config: ClientConfig,
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl<P: ModelProvider> ChatClient<P> {
    pub fn new(provider: P, config: ClientConfig) -> Self {
        Self {
            provider,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResult, ChatError> {
        let model = request
            .model
            .unwrap_or_else(|| self.config.default_model.clone());
        let session_id = request.session_id.unwrap_or_else(new_session_id);

        let (system, history) = {
            let mut sessions = self.sessions.lock().await;
            let state = sessions.entry(session_id.clone()).or_default();
            if state.system_prompt.is_none() {
                state.system_prompt = request
                    .system_prompt
                    .or_else(|| self.config.default_system_prompt.clone());
            }
            (state.system_prompt.clone(), state.history.clone())
        };
        debug!(
            session_id = session_id.as_str(),
            history_count = history.len(),
            "Preparing chat request with prior history"
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = system.filter(|text| !text.trim().is_empty()) {
            messages.push(ChatMessage::new(MessageRole::System, system));
        }
        messages.extend(history);
        messages.push(ChatMessage::new(MessageRole::User, request.prompt.clone()));

        let response = self
            .provider
            .chat(ModelRequest {
                model,
                messages,
                session_id: Some(session_id.clone()),
            })
            .await?;

        info!(
            session_id = session_id.as_str(),
            "Received response from model provider"
        );
        let content = response.message.content.clone();
        self.persist_exchange(&session_id, request.prompt, response.message)
            .await;

        Ok(ChatResult {
            content,
            session_id,
        })
    }

    /// Drops the history of `session_id`. Unknown ids are ignored.
    pub async fn end_session(&self, session_id: &str) {
        if self.sessions.lock().await.remove(session_id).is_some() {
            debug!(session_id, "Session closed");
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn persist_exchange(
        &self,
        session_id: &str,
        user_prompt: String,
        assistant: ChatMessage,
    ) {
        let mut sessions = self.sessions.lock().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state
            .history
            .push(ChatMessage::new(MessageRole::User, user_prompt));
        state.history.push(assistant);
        debug!(
            session_id,
            total_messages = state.history.len(),
            "Persisted chat exchange to session history"
        );
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
