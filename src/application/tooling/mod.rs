mod error;
mod interface;
mod kind;
mod toolbox;

pub use error::ToolInvokeError;
pub(crate) use error::model_kind;
pub use interface::ToolInterface;
pub use kind::ToolKind;
pub use toolbox::ResearchToolbox;
