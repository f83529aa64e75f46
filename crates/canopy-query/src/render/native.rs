//! Native dialect renderer.
//!
//! Emits `SELECT <items> FROM <entity>[ <tail>]`:
//! - columns as dotted paths, aliases dropped (the remote dialect rejects
//!   aliases on plain columns)
//! - aggregates as `FUNC(args)` followed by their explicit alias
//! - sub-selects parenthesized, each with its own tail

use crate::error::RenderError;
use crate::ir::{ProjectionItem, SelectQuery};
use crate::render::{QueryRenderer, RenderedQuery};

/// Renderer for the remote store's own query dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRenderer;

impl NativeRenderer {
    fn render_select(&self, query: &SelectQuery) -> Result<String, RenderError> {
        if query.items.is_empty() {
            return Err(RenderError::EmptyProjection {
                entity: query.from.clone(),
            });
        }

        let items = query
            .items
            .iter()
            .map(|item| self.render_item(item, &query.from))
            .collect::<Result<Vec<_>, _>>()?;

        let mut text = format!("SELECT {} FROM {}", items.join(", "), query.from);
        if let Some(tail) = &query.tail {
            text.push(' ');
            text.push_str(tail);
        }
        Ok(text)
    }

    fn render_item(&self, item: &ProjectionItem, entity: &str) -> Result<String, RenderError> {
        match item {
            ProjectionItem::Column(column) => {
                if column.path.is_empty() {
                    return Err(RenderError::EmptyPath {
                        entity: entity.to_string(),
                    });
                }
                Ok(column.full_path())
            }
            ProjectionItem::Aggregate(call) => {
                if call.args.iter().any(|arg| arg.path.is_empty()) {
                    return Err(RenderError::EmptyPath {
                        entity: entity.to_string(),
                    });
                }
                Ok(match &call.alias {
                    Some(alias) => format!("{} {}", call, alias),
                    None => call.to_string(),
                })
            }
            ProjectionItem::SubQuery(sub) => Ok(format!("({})", self.render_select(sub)?)),
        }
    }
}

impl QueryRenderer for NativeRenderer {
    fn name(&self) -> &str {
        "native"
    }

    fn render(&self, query: &SelectQuery) -> Result<RenderedQuery, RenderError> {
        Ok(RenderedQuery {
            text: self.render_select(query)?,
        })
    }
}
