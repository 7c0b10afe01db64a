use super::directive::AgentDirective;
use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, AgentStep};
use super::retry::{RetryError, RetryOutcome, RetryPolicy, retry_with_policy};
use super::runtime::ToolRuntime;
use crate::application::client::{ChatClient, ChatRequest};
use crate::application::tooling::ToolInterface;
use crate::infrastructure::model::ModelProvider;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct Agent<P: ModelProvider> {
    client: Arc<ChatClient<P>>,
    runtime: ToolRuntime,
    purpose: String,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(client: Arc<ChatClient<P>>, tools: Arc<dyn ToolInterface>) -> Self {
        Self {
            client,
            runtime: ToolRuntime::new(tools),
            purpose: String::new(),
        }
    }

    /// Context string placed at the top of every system prompt.
    pub fn with_context(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    /// Runs one reasoning cycle in a session of its own.
    pub async fn run(
        &self,
        prompt: &str,
        options: AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        let session_id = Uuid::new_v4().to_string();
        info!(session_id = session_id.as_str(), "Agent run started");
        let result = self.cycle(&session_id, prompt, options).await;
        self.client.end_session(&session_id).await;
        result
    }

    /// Runs [`Self::run`] under `policy`, restarting the whole cycle after a
    /// failure. `on_failure` is told about every failed attempt.
    pub async fn run_with_retry<H>(
        &self,
        prompt: &str,
        options: &AgentOptions,
        policy: &RetryPolicy,
        on_failure: H,
    ) -> Result<RetryOutcome<AgentOutcome>, RetryError<AgentError>>
    where
        H: FnMut(u32, &AgentError),
    {
        retry_with_policy(
            policy,
            move |attempt| {
                debug!(attempt, "Starting agent attempt");
                self.run(prompt, options.clone())
            },
            on_failure,
        )
        .await
    }

    async fn cycle(
        &self,
        session_id: &str,
        prompt: &str,
        options: AgentOptions,
    ) -> Result<AgentOutcome, AgentError> {
        let mut steps = Vec::new();
        let instructions = self.runtime.compose_system_instructions(&self.purpose);
        let system_prompt = match options.system_prompt {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{existing}\n\n{instructions}")
            }
            _ => instructions,
        };

        let mut next_prompt = self.runtime.initial_user_prompt(prompt);
        let mut remaining_steps = options.max_steps;
        let mut system_prompt_to_send = Some(system_prompt);

        loop {
            debug!(session_id, remaining_steps, "Submitting agent turn to model provider");
            let request = ChatRequest {
                prompt: next_prompt,
                model: options.model.clone(),
                system_prompt: system_prompt_to_send.take(),
                session_id: Some(session_id.to_string()),
            };

            let result = self.client.chat(request).await?;

            match self.runtime.parse_agent_action(&result.content)? {
                AgentDirective::Final { response } => {
                    info!(
                        session_id = result.session_id.as_str(),
                        steps = steps.len(),
                        "Agent returned final response"
                    );
                    return Ok(AgentOutcome {
                        session_id: result.session_id,
                        response,
                        steps,
                    });
                }
                AgentDirective::CallTool { tool, input } => {
                    if remaining_steps == 0 {
                        warn!("Agent exceeded max tool interactions");
                        return Err(AgentError::StepLimit(options.max_steps));
                    }
                    remaining_steps -= 1;
                    info!(tool = %tool, "Agent requested tool execution");
                    let execution = self.runtime.execute(&tool, input).await?;

                    steps.push(AgentStep {
                        tool: execution.tool.clone(),
                        input: execution.input.clone(),
                        success: execution.success,
                        output: execution.output.clone(),
                        message: execution.message.clone(),
                    });

                    next_prompt = json!({
                        "tool_result": {
                            "tool": execution.tool,
                            "input": execution.input,
                            "success": execution.success,
                            "output": execution.output,
                            "message": execution.message,
                        }
                    })
                    .to_string();
                }
            }
        }
    }
}
