//! Conversational research assistant: a tool-calling agent over arXiv search
//! and a persisted semantic index of paper summaries.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::agent::{
    Agent, AgentError, AgentOptions, AgentOutcome, RetryError, RetryPolicy,
};
pub use application::client::{ChatClient, ClientConfig};
pub use application::session::{Session, SessionSummary};
pub use application::tooling::{ResearchToolbox, ToolInterface, ToolKind};
pub use config::AppConfig;
