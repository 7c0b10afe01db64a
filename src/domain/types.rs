use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(MessageRole::System),
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A paper as returned by the catalog search. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub summary: String,
}

impl PaperRecord {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// Search output kept as two index-aligned columns: `titles[i]` belongs to
/// `summaries[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperBatch {
    pub titles: Vec<String>,
    pub summaries: Vec<String>,
}

impl PaperBatch {
    pub fn from_records(records: Vec<PaperRecord>) -> Self {
        let (titles, summaries) = records
            .into_iter()
            .map(|record| (record.title, record.summary))
            .unzip();
        Self { titles, summaries }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = PaperRecord> + '_ {
        self.titles
            .iter()
            .zip(self.summaries.iter())
            .map(|(title, summary)| PaperRecord::new(title.clone(), summary.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
}

/// Text plus metadata, prior to embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl SourceDocument {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: DocumentMetadata {
                title: title.into(),
            },
        }
    }
}

impl From<PaperRecord> for SourceDocument {
    fn from(record: PaperRecord) -> Self {
        SourceDocument::new(record.title, record.summary)
    }
}

/// Coarse classification of a failure, used to decide whether retrying a
/// prompt can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Parse,
    Model,
    Storage,
    Protocol,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::Model => "model",
            FailureKind::Storage => "storage",
            FailureKind::Protocol => "protocol",
        }
    }
}
