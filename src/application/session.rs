use crate::application::agent::{Agent, AgentOptions, AgentOutcome, RetryPolicy};
use crate::infrastructure::model::ModelProvider;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

pub const PROMPT: &str = "Enter a prompt (q to quit): ";
pub const QUIT_SENTINEL: &str = "q";
pub const GIVE_UP_MESSAGE: &str = "Unable to process request, try again...";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters for one interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub prompts: usize,
    pub answered: usize,
    pub abandoned: usize,
}

/// Line-oriented prompt loop over an [`Agent`].
pub struct Session<'a, P: ModelProvider> {
    agent: &'a Agent<P>,
    options: AgentOptions,
    policy: RetryPolicy,
}

impl<'a, P: ModelProvider> Session<'a, P> {
    pub fn new(agent: &'a Agent<P>, options: AgentOptions, policy: RetryPolicy) -> Self {
        Self {
            agent,
            options,
            policy,
        }
    }

    /// Reads prompts from `input` until `q` or end of input. Diagnostics and
    /// answers go to `output`.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> Result<SessionSummary, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut summary = SessionSummary::default();

        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(output)?;
                debug!("Input closed");
                break;
            };
            let prompt = line.trim();
            if prompt == QUIT_SENTINEL {
                info!("Quit requested");
                break;
            }
            if prompt.is_empty() {
                continue;
            }

            summary.prompts += 1;
            if self.handle_prompt(prompt, output).await? {
                summary.answered += 1;
            } else {
                summary.abandoned += 1;
            }
        }

        output.flush()?;
        info!(
            prompts = summary.prompts,
            answered = summary.answered,
            abandoned = summary.abandoned,
            "Session finished"
        );
        Ok(summary)
    }

    async fn handle_prompt<W: Write>(&self, prompt: &str, output: &mut W) -> Result<bool, SessionError> {
        let mut write_failure = None;
        let result = self
            .agent
            .run_with_retry(prompt, &self.options, &self.policy, |attempt, err| {
                let notice = err.user_message();
                let written = writeln!(output, "Error occurred, retry #{attempt}: {notice}");
                if let Err(io_err) = written {
                    write_failure.get_or_insert(io_err);
                }
            })
            .await;
        if let Some(io_err) = write_failure {
            return Err(io_err.into());
        }

        match result {
            Ok(outcome) => {
                render_outcome(output, &outcome.value)?;
                Ok(true)
            }
            Err(err) => {
                error!(attempts = err.attempts(), error = %err.last_error(), "Prompt abandoned");
                writeln!(output, "{GIVE_UP_MESSAGE}")?;
                Ok(false)
            }
        }
    }
}

fn render_outcome<W: Write>(output: &mut W, outcome: &AgentOutcome) -> std::io::Result<()> {
    for step in &outcome.steps {
        writeln!(output, "[tool] {}", step.tool)?;
    }
    writeln!(output, "{}", outcome.response)
}
