use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;
use super::kind::ToolKind;

/// Uniform invocation surface for every [`ToolKind`].
#[async_trait]
pub trait ToolInterface: Send + Sync {
    async fn invoke(&self, kind: ToolKind, arguments: Value) -> Result<Value, ToolInvokeError>;
}
