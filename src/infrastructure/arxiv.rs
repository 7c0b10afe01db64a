//! arXiv catalog search over the public Atom API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::types::{PaperBatch, PaperRecord};

pub const DEFAULT_ARXIV_ENDPOINT: &str = "http://export.arxiv.org/api/query";
pub const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("catalog returned HTTP {0}")]
    Status(u16),
    #[error("failed to parse catalog feed: {0}")]
    Parse(#[from] quick_xml::DeError),
}

/// Source of paper metadata for free-text tags.
#[async_trait]
pub trait PaperSource: Send + Sync {
    async fn search(&self, tags: &str) -> Result<PaperBatch, SearchError>;
}

#[derive(Clone)]
pub struct ArxivClient {
    http: Client,
    endpoint: String,
    max_results: usize,
}

impl ArxivClient {
    pub fn new(endpoint: impl Into<String>, max_results: usize) -> Self {
        Self::with_client(endpoint, max_results, Client::new())
    }

    /// Builds a client whose catalog requests give up after `timeout`.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(endpoint, max_results, http))
    }

    pub fn with_client(endpoint: impl Into<String>, max_results: usize, client: Client) -> Self {
        Self {
            http: client,
            endpoint: endpoint.into(),
            max_results,
        }
    }

    fn query_params(&self, tags: &str) -> [(&'static str, String); 4] {
        [
            ("search_query", tags.to_string()),
            ("start", "0".to_string()),
            ("max_results", self.max_results.to_string()),
            ("sortBy", "relevance".to_string()),
        ]
    }
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new(DEFAULT_ARXIV_ENDPOINT, DEFAULT_MAX_RESULTS)
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn search(&self, tags: &str) -> Result<PaperBatch, SearchError> {
        info!(tags, max_results = self.max_results, "Searching arXiv");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.query_params(tags))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let batch = parse_feed(&body)?;
        debug!(results = batch.len(), "Parsed arXiv feed");
        Ok(batch)
    }
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    summary: Option<String>,
}

/// Extracts one title and one summary per `entry`, in feed order.
///
/// Entries lacking either child are dropped so the two columns stay aligned.
pub fn parse_feed(xml: &str) -> Result<PaperBatch, SearchError> {
    let feed: AtomFeed = quick_xml::de::from_str(xml)?;
    let records = feed
        .entries
        .into_iter()
        .filter_map(|entry| match (entry.title, entry.summary) {
            (Some(title), Some(summary)) => {
                Some(PaperRecord::new(collapse(&title), collapse(&summary)))
            }
            _ => None,
        })
        .collect();
    Ok(PaperBatch::from_records(records))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
