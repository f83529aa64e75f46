//! Error types for each pipeline stage.
//!
//! Compile-time errors (parse, validate, analyze, render) abort the query
//! before anything is sent to the remote store. Reshape errors abort row
//! production for a page; no partial rows are returned.

use thiserror::Error;

/// Projection text could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was blank
    #[error("Empty query")]
    Empty,

    /// Input does not start like a SELECT statement
    #[error("Not a SELECT query: {input}")]
    NotSelect { input: String },

    /// Parser diagnostics, formatted with line and column
    #[error("Syntax error:\n{errors}")]
    Syntax { errors: String },
}

/// Failures surfaced by a [`SchemaResolver`](crate::resolver::SchemaResolver).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No entity with this name is known to the resolver
    #[error("Unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    /// The resolver could not answer (transient on its side)
    #[error("Schema resolver unavailable: {message}")]
    Unavailable { message: String },
}

/// Projection-level validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// SELECT list is empty
    #[error("Empty projection for '{entity}'")]
    EmptyProjection { entity: String },

    /// The same explicit alias appears twice at one level
    #[error("Duplicate alias '{alias}' in projection for '{entity}'")]
    DuplicateAlias { entity: String, alias: String },

    /// Correlated sub-selects nested beyond the allowed depth
    #[error("Sub-select on '{relationship}' nested {depth} levels deep (max {max})")]
    NestedTooDeep {
        relationship: String,
        depth: usize,
        max: usize,
    },
}

/// Compile-time semantic errors raised while building the schema tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    /// Field path does not resolve on the entity it was requested from
    #[error("Unknown field '{path}' on '{entity}'")]
    UnknownField { entity: String, path: String },

    /// Qualifier does not name a reference relationship
    #[error("Unknown relationship '{relationship}' on '{entity}' (in '{path}')")]
    UnknownRelationship {
        entity: String,
        relationship: String,
        path: String,
    },

    /// Sub-select FROM target is not a child relationship of the parent
    #[error("Unknown child relationship '{relationship}' on '{entity}'")]
    UnknownChildRelationship { entity: String, relationship: String },

    /// Aggregate called with a malformed argument
    #[error("Invalid argument to {function}(): {message}")]
    InvalidAggregate { function: String, message: String },

    #[error(transparent)]
    Invalid(#[from] TransformError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Native query text could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A column reference with no path segments
    #[error("Empty column path in projection for '{entity}'")]
    EmptyPath { entity: String },

    /// SELECT list is empty
    #[error("Nothing to select from '{entity}'")]
    EmptyProjection { entity: String },
}

/// Failures while turning raw records into flat rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReshapeError {
    /// Builder was handed something other than a record node
    #[error("Expected a record node, found '{name}'")]
    NotARecord { name: String },

    /// Raw payload could not be interpreted
    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    /// Result tree disagrees with the schema tree that produced the query.
    ///
    /// Indicates the native query text and the analyzer's schema are out of
    /// sync; never retried.
    #[error(
        "Result does not match schema at schema position {schema_position}, \
         column {column_position}: {reason}"
    )]
    StructuralMismatch {
        schema_position: usize,
        column_position: usize,
        reason: String,
    },
}

/// Engine configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Umbrella error for the [`QueryEngine`](crate::engine::QueryEngine) facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Reshape(#[from] ReshapeError),
}

impl From<TransformError> for QueryError {
    fn from(err: TransformError) -> Self {
        Self::Analyze(AnalyzeError::Invalid(err))
    }
}

impl From<ResolveError> for QueryError {
    fn from(err: ResolveError) -> Self {
        Self::Analyze(AnalyzeError::Resolve(err))
    }
}

/// Result type for engine operations
pub type QueryResult<T> = Result<T, QueryError>;
