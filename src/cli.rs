use std::path::PathBuf;

use clap::Parser;
use research_indexer::config::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "research-indexer",
    version,
    about = "Research assistant that searches arXiv and keeps a local semantic index of papers"
)]
pub struct Cli {
    /// TOML configuration file; defaults to config/research.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the Ollama server used for chat and embeddings.
    #[arg(long)]
    pub ollama_url: Option<String>,
    /// Chat model used by the agent and the query engine.
    #[arg(long)]
    pub model: Option<String>,
    /// Extra system prompt sent with every agent session.
    #[arg(long)]
    pub system: Option<String>,
}

impl Cli {
    /// Flags given on the command line win over the file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.ollama_url {
            config.ollama_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
    }
}
