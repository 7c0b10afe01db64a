mod context;
mod directive;
mod errors;
mod models;
mod retry;
mod runner;
mod runtime;


pub use context::{ToolContext, ToolDescriptor};
pub use directive::AgentDirective;
pub use errors::{AgentError, Classified, ToolError};
pub use models::{AgentOptions, AgentOutcome, AgentStep};
pub use retry::{RetryError, RetryOutcome, RetryPolicy, retry_with_policy};
pub use runner::Agent;
