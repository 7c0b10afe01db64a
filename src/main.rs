mod cli;

use clap::Parser;
use cli::Cli;
use research_indexer::application::agent::{Agent, AgentOptions, RetryPolicy};
use research_indexer::application::bootstrap::{self, BootstrapMode};
use research_indexer::application::client::{ChatClient, ClientConfig};
use research_indexer::application::session::Session;
use research_indexer::application::tooling::ResearchToolbox;
use research_indexer::config::AppConfig;
use research_indexer::infrastructure::arxiv::ArxivClient;
use research_indexer::infrastructure::embedding::{EmbeddingProvider, OllamaEmbedder};
use research_indexer::infrastructure::index::QueryEngine;
use research_indexer::infrastructure::model::{ModelProvider, OllamaClient};
use research_indexer::infrastructure::output::OutputWriter;
use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("Starting research-indexer");
    let cli = Cli::parse();
    debug!(config = ?cli.config, "CLI arguments parsed");

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    info!(
        model = config.model.as_str(),
        embedding_model = config.embedding_model.as_str(),
        ollama_url = config.ollama_url.as_str(),
        "Configuration resolved"
    );

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let provider = Arc::new(OllamaClient::with_timeout(config.ollama_url.clone(), timeout)?);
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::with_timeout(
        config.ollama_url.clone(),
        config.embedding_model.clone(),
        timeout,
    )?);

    let mut stdout = io::stdout();
    let (index, mode) = bootstrap::open_or_create(
        &config.persist_dir,
        &config.data_dir,
        embedder,
        config.embed_batch_size,
        &mut stdout,
    )
    .await?;
    match mode {
        BootstrapMode::Created { documents } => info!(documents, "Index created"),
        BootstrapMode::Loaded { documents } => info!(documents, "Index loaded"),
    }

    let chat_provider: Arc<dyn ModelProvider> = provider.clone();
    let query = QueryEngine::new(index.clone(), chat_provider, config.model.clone())
        .with_top_k(config.similarity_top_k);
    let toolbox = ResearchToolbox::new(
        Arc::new(ArxivClient::with_timeout(
            config.arxiv_endpoint.clone(),
            config.max_results,
            timeout,
        )?),
        index,
        query,
        OutputWriter::new(config.output_dir.clone()),
    );

    let client = Arc::new(ChatClient::new(
        provider,
        ClientConfig::new(config.model.clone()),
    ));
    let agent = Agent::new(client, Arc::new(toolbox)).with_context(config.context.clone());
    let options = AgentOptions {
        model: None,
        system_prompt: cli.system.clone(),
        max_steps: config.max_steps,
    };
    let policy = RetryPolicy::default().with_max_attempts(config.max_retries);

    let session = Session::new(&agent, options, policy);
    let summary = session
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;
    info!(prompts = summary.prompts, "research-indexer finished");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
