use serde::Serialize;
use serde_json::Value;

use crate::config::DEFAULT_MAX_STEPS;

#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: Value,
    pub success: bool,
    pub output: Value,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub session_id: String,
    pub response: String,
    pub steps: Vec<AgentStep>,
}

/// Per-cycle knobs. Every cycle opens its own session, so there is no
/// session id to carry over.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_steps: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: None,
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}
