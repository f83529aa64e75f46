//! Query engine facade.
//!
//! Ties the pipeline together:
//!
//! ```text
//! SQL text -> parse -> validate -> analyze -> render   (compile)
//! raw page -> build result trees -> expand              (reshape)
//! ```
//!
//! A [`CompiledQuery`] is read-only once built and can be shared across
//! threads; every page is reshaped independently against it.

use crate::analyze::Analyzer;
use crate::build::{ResultField, ResultTreeBuilder};
use crate::config::EngineConfig;
use crate::error::QueryResult;
use crate::expand::{Expander, Row};
use crate::ir::SelectQuery;
use crate::raw::RawNode;
use crate::render::{NativeRenderer, QueryRenderer};
use crate::resolver::SchemaResolver;
use crate::schema::{ColumnMeta, FieldDefTree, SemanticType};
use crate::syntax::parse_select;
use rayon::prelude::*;
use tracing::{debug, info};

/// A query analyzed and rendered for the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Entity named by the top-level FROM
    pub root_entity: String,
    pub schema: FieldDefTree,
    /// Query text to send to the remote store
    pub native: String,
    /// One entry per output column
    pub columns: Vec<ColumnMeta>,
}

impl CompiledQuery {
    /// Width of every output row
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Pair each value of `row` with its column metadata
    pub fn cells<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = Cell<'a>> + 'a {
        self.columns
            .iter()
            .zip(row.iter())
            .map(|(column, field)| Cell { column, field: field.as_ref() })
    }
}

/// One value of an output row alongside its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    pub column: &'a ColumnMeta,
    pub field: Option<&'a ResultField>,
}

impl<'a> Cell<'a> {
    pub fn semantic_type(&self) -> SemanticType {
        self.column.semantic_type
    }

    /// Value text; `None` is a SQL null
    pub fn value(&self) -> Option<&'a str> {
        self.field.and_then(|field| field.value.as_deref())
    }

    pub fn is_null(&self) -> bool {
        self.value().is_none()
    }
}

/// Compiles projections and reshapes responses against a schema resolver.
pub struct QueryEngine<R: SchemaResolver> {
    resolver: R,
    config: EngineConfig,
    builder: ResultTreeBuilder,
    renderer: NativeRenderer,
}

impl<R: SchemaResolver> QueryEngine<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, EngineConfig::default())
    }

    pub fn with_config(resolver: R, config: EngineConfig) -> Self {
        Self {
            builder: ResultTreeBuilder::from_config(&config),
            resolver,
            config,
            renderer: NativeRenderer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Parse, validate, analyze and render `sql`
    pub fn compile(&self, sql: &str) -> QueryResult<CompiledQuery> {
        let query = parse_select(sql)?;
        self.compile_query(&query)
    }

    /// Compile an already-parsed projection
    pub fn compile_query(&self, query: &SelectQuery) -> QueryResult<CompiledQuery> {
        let schema = Analyzer::new(&self.resolver)
            .with_max_subquery_depth(self.config.max_subquery_depth)
            .analyze(query)?;
        let native = self.renderer.render(query)?.text;
        let columns = schema.columns();

        info!(
            entity = %query.from,
            columns = columns.len(),
            renderer = self.renderer.name(),
            "Compiled query"
        );
        Ok(CompiledQuery {
            root_entity: query.from.clone(),
            schema,
            native,
            columns,
        })
    }

    /// Reshape one page of raw records into flat rows
    pub fn reshape(&self, compiled: &CompiledQuery, records: &[RawNode]) -> QueryResult<Vec<Row>> {
        let trees = self.builder.build_all(records, &compiled.root_entity)?;
        let rows = Expander::new(&compiled.schema).expand(trees)?;
        Ok(rows)
    }

    /// Reshape several pages, concatenating rows in page order
    pub fn reshape_pages(
        &self,
        compiled: &CompiledQuery,
        pages: &[Vec<RawNode>],
    ) -> QueryResult<Vec<Row>> {
        let batches: Vec<Vec<Row>> = if self.config.parallel_pages && pages.len() > 1 {
            pages
                .par_iter()
                .map(|page| self.reshape(compiled, page))
                .collect::<QueryResult<_>>()?
        } else {
            pages
                .iter()
                .map(|page| self.reshape(compiled, page))
                .collect::<QueryResult<_>>()?
        };

        let rows: Vec<Row> = batches.into_iter().flatten().collect();
        debug!(
            entity = %compiled.root_entity,
            pages = pages.len(),
            rows = rows.len(),
            "Reshaped pages"
        );
        Ok(rows)
    }
}
