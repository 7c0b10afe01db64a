use super::{ToolError, ToolRuntime, Value};
use crate::application::tooling::ToolKind;
use tracing::{debug, info, warn};

pub(crate) struct ToolExecution {
    pub tool: String,
    pub success: bool,
    pub input: Value,
    pub output: Value,
    pub message: Option<String>,
}

impl ToolRuntime {
    /// Runs one requested tool. A failing tool is an error, not an observation:
    /// the caller abandons the cycle.
    pub(crate) async fn execute(
        &self,
        tool_name: &str,
        input: Value,
    ) -> Result<ToolExecution, ToolError> {
        if tool_name.trim().eq_ignore_ascii_case("list_tools") {
            let manifest = self.context();
            let output = serde_json::to_value(manifest).unwrap_or(Value::Null);
            debug!("Agent requested tool catalogue via list_tools");
            let execution = ToolExecution {
                tool: "list_tools".to_string(),
                success: true,
                input,
                output,
                message: Some(format!("{} tools available.", manifest.tools.len())),
            };
            info!(tool = %execution.tool, success = execution.success, "Tool executed");
            return Ok(execution);
        }

        let Some(kind) = ToolKind::from_name(tool_name) else {
            warn!(requested_tool = %tool_name, "Unknown tool requested by agent");
            return Err(ToolError::UnknownTool(tool_name.to_string()));
        };

        debug!(tool = kind.name(), mutates_index = kind.mutates_index(), "Dispatching tool");
        match self.tools.invoke(kind, input.clone()).await {
            Ok(output) => {
                let execution = ToolExecution {
                    tool: kind.name().to_string(),
                    success: true,
                    input,
                    output,
                    message: None,
                };
                info!(tool = %execution.tool, success = execution.success, "Tool executed");
                Ok(execution)
            }
            Err(source) => {
                warn!(tool = kind.name(), %source, "Tool execution failed");
                Err(ToolError::Execution {
                    tool: kind.name().to_string(),
                    source,
                })
            }
        }
    }
}
