//! Target renderers for the projection AST.
//!
//! Renderers turn a validated [`SelectQuery`] back into query text for the
//! remote store. Only the SELECT list and sub-select boundaries are
//! restructured; the tail after the FROM target passes through verbatim.

mod native;

pub use native::NativeRenderer;

use crate::error::RenderError;
use crate::ir::SelectQuery;

/// Output from rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQuery {
    /// The generated query text
    pub text: String,
}

/// Trait for rendering the projection AST to a target dialect.
pub trait QueryRenderer: Send + Sync {
    /// Unique name for this renderer
    fn name(&self) -> &str;

    /// Render the query to target text
    fn render(&self, query: &SelectQuery) -> Result<RenderedQuery, RenderError>;
}
