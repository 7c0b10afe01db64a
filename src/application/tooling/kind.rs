use serde_json::{Value, json};

/// The fixed set of tools the agent may call. Registration order is the order
/// the tools are presented to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    SearchResearch,
    UpdateVectorIndex,
    ResearchQueryEngine,
    Output,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::SearchResearch,
        ToolKind::UpdateVectorIndex,
        ToolKind::ResearchQueryEngine,
        ToolKind::Output,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::SearchResearch => "search_research_tool",
            ToolKind::UpdateVectorIndex => "update_vector_index",
            ToolKind::ResearchQueryEngine => "research_query_engine",
            ToolKind::Output => "output_tool",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::SearchResearch => {
                "This tool can search the internet for getting summaries on research paper, will take tags as a variable and give top 5 results"
            }
            ToolKind::UpdateVectorIndex => {
                "Updates the existing vector index with new data information which can be obtained from a variety of sources, primarily the internet"
            }
            ToolKind::ResearchQueryEngine => {
                "this tool can query the vector index about information about research papers"
            }
            ToolKind::Output => {
                "this tool writes any information passed as a variable to a file present in output folder"
            }
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            ToolKind::SearchResearch => json!({
                "type": "object",
                "properties": { "tags": { "type": "string" } },
                "required": ["tags"],
            }),
            ToolKind::UpdateVectorIndex => json!({
                "type": "object",
                "properties": {
                    "titles": { "type": "array", "items": { "type": "string" } },
                    "summaries": { "type": "array", "items": { "type": "string" } },
                },
                "required": ["titles", "summaries"],
            }),
            ToolKind::ResearchQueryEngine => json!({
                "type": "object",
                "properties": { "input": { "type": "string" } },
                "required": ["input"],
            }),
            ToolKind::Output => json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string" },
                    "file_name": { "type": "string" },
                },
                "required": ["content"],
            }),
        }
    }

    /// Argument a bare string input is bound to, when the model skips the object.
    pub fn primary_argument(self) -> Option<&'static str> {
        match self {
            ToolKind::SearchResearch => Some("tags"),
            ToolKind::UpdateVectorIndex => None,
            ToolKind::ResearchQueryEngine => Some("input"),
            ToolKind::Output => Some("content"),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn mutates_index(self) -> bool {
        matches!(self, ToolKind::UpdateVectorIndex)
    }
}
