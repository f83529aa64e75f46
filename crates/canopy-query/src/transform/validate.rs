//! Validation transform.
//!
//! Rejects projections the analyzer cannot turn into a schema tree.

use crate::error::TransformError;
use crate::ir::{ProjectionItem, SelectQuery};
use crate::transform::QueryTransform;
use std::collections::HashSet;

/// Structural checks on a projection before it is resolved.
///
/// - every level selects at least one item
/// - explicit aliases are unique within one level (case-insensitive)
/// - sub-selects nest no deeper than `max_depth`
pub struct ValidateTransform {
    max_depth: usize,
}

impl Default for ValidateTransform {
    fn default() -> Self {
        Self { max_depth: 1 }
    }
}

impl ValidateTransform {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn check(&self, query: &SelectQuery, depth: usize) -> Result<(), TransformError> {
        if query.items.is_empty() {
            return Err(TransformError::EmptyProjection {
                entity: query.from.clone(),
            });
        }

        let mut aliases = HashSet::new();
        for item in &query.items {
            if let Some(alias) = item.alias() {
                if !aliases.insert(alias.to_lowercase()) {
                    return Err(TransformError::DuplicateAlias {
                        entity: query.from.clone(),
                        alias: alias.to_string(),
                    });
                }
            }

            if let ProjectionItem::SubQuery(sub) = item {
                if depth + 1 > self.max_depth {
                    return Err(TransformError::NestedTooDeep {
                        relationship: sub.from.clone(),
                        depth: depth + 1,
                        max: self.max_depth,
                    });
                }
                self.check(sub, depth + 1)?;
            }
        }

        Ok(())
    }
}

impl QueryTransform for ValidateTransform {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn transform(&self, query: SelectQuery) -> Result<SelectQuery, TransformError> {
        self.check(&query, 0)?;
        Ok(query)
    }
}
