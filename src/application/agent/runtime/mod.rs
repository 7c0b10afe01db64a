mod execution;
mod instructions;
mod parser;

use std::sync::Arc;

pub(super) use super::context::ToolContext;
pub(super) use super::directive::AgentDirective;
pub(super) use super::errors::{AgentError, ToolError};
pub(super) use serde_json::{Value, json};

use crate::application::tooling::ToolInterface;

/// Prompt construction, response parsing and tool dispatch for one agent.
pub struct ToolRuntime {
    context: ToolContext,
    tools: Arc<dyn ToolInterface>,
}

impl ToolRuntime {
    pub fn new(tools: Arc<dyn ToolInterface>) -> Self {
        Self {
            context: ToolContext::registry(),
            tools,
        }
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }
}
