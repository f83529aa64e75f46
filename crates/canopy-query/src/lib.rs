//! Query translation and result reshaping for hierarchical record stores
//!
//! Lets a relational client read a remote store whose records nest
//! one-to-many child collections, by compiling SELECT projections into the
//! store's native query text and flattening the nested responses into
//! fixed-width rows.
//!
//! ## Pipeline
//!
//! ```text
//! SELECT text
//!     │  syntax::parse_select
//!     ▼
//! SelectQuery (projection AST)
//!     │  Analyzer (+ SchemaResolver)          NativeRenderer
//!     ▼                                             │
//! FieldDefTree (schema tree) ◄──────────────────────┘ native text
//!     │
//!     │   raw response ──► ResultTreeBuilder ──► ResultTree per record
//!     ▼                                               │
//! Expander ◄──────────────────────────────────────────┘
//!     │
//!     ▼
//! Vec<Row>  (cartesian product of nested collections)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canopy_query::{page_from_json, InMemoryResolver, QueryEngine};
//!
//! let resolver = InMemoryResolver::from_json(&describe_json)?;
//! let engine = QueryEngine::new(resolver);
//!
//! let compiled = engine.compile("SELECT Name, (SELECT LastName FROM Contacts) FROM Account")?;
//! // send compiled.native to the remote store, then:
//! let records = page_from_json(&compiled.root_entity, &response)?;
//! for row in engine.reshape(&compiled, &records)? {
//!     for cell in compiled.cells(&row) {
//!         println!("{} = {:?}", cell.column.label, cell.value());
//!     }
//! }
//! ```

pub mod analyze;
pub mod build;
pub mod config;
pub mod engine;
pub mod error;
pub mod expand;
pub mod ir;
pub mod raw;
pub mod render;
pub mod resolver;
pub mod schema;
pub mod syntax;
pub mod transform;
pub mod tree;

// Re-exports
pub use analyze::Analyzer;
pub use build::{ResultField, ResultTree, ResultTreeBuilder};
pub use config::EngineConfig;
pub use engine::{Cell, CompiledQuery, QueryEngine};
pub use error::{
    AnalyzeError, ConfigError, ParseError, QueryError, QueryResult, RenderError, ReshapeError,
    ResolveError, TransformError,
};
pub use expand::{Expander, Row};
pub use ir::{AggregateCall, ColumnRef, ProjectionItem, SelectQuery};
pub use raw::{page_from_json, NodeKind, RawNode};
pub use render::{NativeRenderer, QueryRenderer, RenderedQuery};
pub use resolver::{
    ChildRelationship, EntityDescribe, FieldDescribe, InMemoryResolver, SchemaResolver,
};
pub use schema::{ColumnMeta, FieldDef, FieldDefTree, SemanticType};
pub use syntax::parse_select;
pub use tree::TreeNode;
