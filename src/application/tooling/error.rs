use thiserror::Error;

use crate::domain::types::FailureKind;
use crate::infrastructure::arxiv::SearchError;
use crate::infrastructure::embedding::EmbeddingError;
use crate::infrastructure::index::{IndexError, QueryError};
use crate::infrastructure::model::ModelError;
use crate::infrastructure::output::OutputError;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: &'static str, message: String },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl ToolInvokeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ToolInvokeError::InvalidArguments { .. } => FailureKind::Protocol,
            ToolInvokeError::Search(SearchError::Parse(_)) => FailureKind::Parse,
            ToolInvokeError::Search(_) => FailureKind::Network,
            ToolInvokeError::Index(err) => index_kind(err),
            ToolInvokeError::Query(QueryError::Index(err)) => index_kind(err),
            ToolInvokeError::Query(QueryError::Model(err)) => model_kind(err),
            ToolInvokeError::Output(_) => FailureKind::Storage,
        }
    }
}

fn index_kind(err: &IndexError) -> FailureKind {
    match err {
        IndexError::Io { .. } | IndexError::Corrupt { .. } => FailureKind::Storage,
        IndexError::Embedding(EmbeddingError::Network(_)) => FailureKind::Network,
        IndexError::Embedding(_) | IndexError::EmbeddingCount { .. } => FailureKind::Model,
    }
}

pub(crate) fn model_kind(err: &ModelError) -> FailureKind {
    match err {
        ModelError::Network(_) => FailureKind::Network,
        ModelError::InvalidResponse(_) => FailureKind::Model,
    }
}
