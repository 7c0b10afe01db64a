use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::ToolInvokeError;
use super::interface::ToolInterface;
use super::kind::ToolKind;
use crate::domain::types::PaperBatch;
use crate::infrastructure::arxiv::PaperSource;
use crate::infrastructure::index::{IndexHandle, QueryEngine};
use crate::infrastructure::output::OutputWriter;

/// Binds every [`ToolKind`] to the collaborator that serves it.
#[derive(Clone)]
pub struct ResearchToolbox {
    source: Arc<dyn PaperSource>,
    index: IndexHandle,
    query: QueryEngine,
    output: OutputWriter,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    tags: String,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    titles: Vec<String>,
    summaries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    #[serde(alias = "query", alias = "question")]
    input: String,
}

#[derive(Debug, Deserialize)]
struct OutputArgs {
    content: String,
    #[serde(default, alias = "filename")]
    file_name: Option<String>,
}

impl ResearchToolbox {
    pub fn new(
        source: Arc<dyn PaperSource>,
        index: IndexHandle,
        query: QueryEngine,
        output: OutputWriter,
    ) -> Self {
        Self {
            source,
            index,
            query,
            output,
        }
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    async fn search(&self, args: SearchArgs) -> Result<Value, ToolInvokeError> {
        let batch = self.source.search(&args.tags).await?;
        info!(tags = %args.tags, results = batch.len(), "Paper search finished");
        Ok(json!({
            "titles": batch.titles,
            "summaries": batch.summaries,
        }))
    }

    async fn update(&self, args: UpdateArgs) -> Result<Value, ToolInvokeError> {
        if args.titles.len() != args.summaries.len() {
            return Err(ToolInvokeError::InvalidArguments {
                tool: ToolKind::UpdateVectorIndex.name(),
                message: format!(
                    "received {} titles but {} summaries",
                    args.titles.len(),
                    args.summaries.len()
                ),
            });
        }
        let batch = PaperBatch {
            titles: args.titles,
            summaries: args.summaries,
        };
        let report = self.index.update(batch.records().collect()).await?;
        info!(
            inserted = report.inserted,
            replaced = report.replaced,
            total = report.total,
            "Vector index updated"
        );
        Ok(json!({
            "inserted": report.inserted,
            "replaced": report.replaced,
            "total": report.total,
        }))
    }

    async fn query(&self, args: QueryArgs) -> Result<Value, ToolInvokeError> {
        let answer = self.query.query(&args.input).await?;
        Ok(json!({
            "response": answer.response,
            "sources": answer.sources,
        }))
    }

    async fn write(&self, args: OutputArgs) -> Result<Value, ToolInvokeError> {
        let path = self
            .output
            .write(&args.content, args.file_name.as_deref())
            .await?;
        Ok(json!({
            "path": path.display().to_string(),
            "bytes": args.content.len(),
        }))
    }
}

#[async_trait]
impl ToolInterface for ResearchToolbox {
    async fn invoke(&self, kind: ToolKind, arguments: Value) -> Result<Value, ToolInvokeError> {
        debug!(tool = kind.name(), "Dispatching tool");
        match kind {
            ToolKind::SearchResearch => self.search(parse_arguments(kind, arguments)?).await,
            ToolKind::UpdateVectorIndex => self.update(parse_arguments(kind, arguments)?).await,
            ToolKind::ResearchQueryEngine => self.query(parse_arguments(kind, arguments)?).await,
            ToolKind::Output => self.write(parse_arguments(kind, arguments)?).await,
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> Result<T, ToolInvokeError> {
    let arguments = match (arguments, kind.primary_argument()) {
        (Value::String(text), Some(key)) => {
            let mut map = Map::new();
            map.insert(key.to_string(), Value::String(text));
            Value::Object(map)
        }
        (Value::Null, _) => Value::Object(Map::new()),
        (other, _) => other,
    };
    serde_json::from_value(arguments).map_err(|err| ToolInvokeError::InvalidArguments {
        tool: kind.name(),
        message: err.to_string(),
    })
}
