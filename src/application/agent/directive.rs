use serde_json::Value;

/// What the model asked for in one turn.
#[derive(Debug, PartialEq)]
pub enum AgentDirective {
    Final { response: String },
    CallTool { tool: String, input: Value },
}
