use serde::Serialize;
use serde_json::Value;

use crate::application::tooling::ToolKind;

/// Registry view handed to the model, in registration order.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ToolContext {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDescriptor>,
}

impl ToolContext {
    pub fn registry() -> Self {
        Self {
            tools: ToolKind::ALL.into_iter().map(ToolDescriptor::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl From<ToolKind> for ToolDescriptor {
    fn from(kind: ToolKind) -> Self {
        Self {
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            input_schema: kind.input_schema(),
        }
    }
}
