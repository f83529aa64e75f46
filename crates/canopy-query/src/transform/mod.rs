//! Validation passes over the projection AST.
//!
//! Transforms run before schema resolution and may reject or rewrite a
//! [`SelectQuery`]. They never consult the resolver.

mod validate;

pub use validate::ValidateTransform;

use crate::error::TransformError;
use crate::ir::SelectQuery;

/// A pass over a parsed query
pub trait QueryTransform: Send + Sync {
    /// Unique name for this transform
    fn name(&self) -> &'static str;

    /// Check or rewrite the query
    fn transform(&self, query: SelectQuery) -> Result<SelectQuery, TransformError>;
}
