//! Service Kit - Agent Tools
//!
//! Domain tools that implement `agent_core::Tool` for the paper scout.

mod search_arxiv;

pub use search_arxiv::{effective_max_results, SearchArxivTool, TOOL_NAME};
