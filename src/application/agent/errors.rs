use crate::application::client::ChatError;
use crate::application::tooling::{ToolInvokeError, model_kind};
use crate::domain::types::FailureKind;
use thiserror::Error;

/// Anything the retry envelope can sort into a [`FailureKind`].
pub trait Classified {
    fn kind(&self) -> FailureKind;
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
    #[error("agent exceeded the maximum of {0} tool calls")]
    StepLimit(usize),
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Chat(err) => err.user_message(),
            AgentError::Tool(err) => err.user_message(),
            AgentError::InvalidResponse(_) => {
                "The model gave a response that could not be understood.".to_string()
            }
            AgentError::StepLimit(limit) => {
                format!("The agent gave up after {limit} tool calls without an answer.")
            }
        }
    }
}

impl Classified for AgentError {
    fn kind(&self) -> FailureKind {
        match self {
            AgentError::Chat(ChatError::Model(err)) => model_kind(err),
            AgentError::Tool(err) => err.kind(),
            AgentError::InvalidResponse(_) | AgentError::StepLimit(_) => FailureKind::Protocol,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),
    #[error("failed to execute tool '{tool}': {source}")]
    Execution {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
}

impl ToolError {
    pub fn user_message(&self) -> String {
        match self {
            ToolError::UnknownTool(name) => format!("Tool \"{name}\" is not available."),
            ToolError::Execution { tool, source } => {
                format!("Tool \"{tool}\" failed: {source}")
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ToolError::UnknownTool(_) => FailureKind::Protocol,
            ToolError::Execution { source, .. } => source.kind(),
        }
    }
}
