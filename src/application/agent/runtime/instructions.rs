use super::{ToolContext, ToolRuntime, json};

impl ToolRuntime {
    /// `purpose` leads the prompt; the action protocol and tool registry follow.
    pub fn compose_system_instructions(&self, purpose: &str) -> String {
        let mut lines = Vec::new();
        if !purpose.trim().is_empty() {
            lines.push(purpose.trim().to_string());
        }
        lines.extend([
            "You are an autonomous assistant that can call tools to solve user requests."
                .to_string(),
            "All responses must be valid JSON without commentary or code fences.".to_string(),
            "When you need to invoke a tool, respond with: {\"action\":\"call_tool\",\"tool\":\"tool_name\",\"input\":{...}}."
                .to_string(),
            "To obtain the list of available tools, call the special tool: {\"action\":\"call_tool\",\"tool\":\"list_tools\"}."
                .to_string(),
            "When you are ready to give the final answer to the user, respond with: {\"action\":\"final\",\"response\":\"...\"}."
                .to_string(),
            "Search results can be added to the research index with update_vector_index before querying it."
                .to_string(),
        ]);

        let context: &ToolContext = self.context();
        lines.push("Available tools:".to_string());
        for descriptor in &context.tools {
            let schema = serde_json::to_string(&descriptor.input_schema).unwrap_or_default();
            lines.push(format!(
                "- {}: {}. Input schema: {}",
                descriptor.name, descriptor.description, schema
            ));
        }

        lines.join(" ")
    }

    pub fn initial_user_prompt(&self, prompt: &str) -> String {
        json!({
            "action": "user_request",
            "prompt": prompt,
        })
        .to_string()
    }
}
