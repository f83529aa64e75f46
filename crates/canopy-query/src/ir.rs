//! Projection AST.
//!
//! The client-facing shape of a SELECT: an ordered projection list, the
//! FROM target and an opaque tail (WHERE / ORDER BY / LIMIT ...) that is
//! passed through to the remote store untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed SELECT statement (top level or correlated sub-select)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub items: Vec<ProjectionItem>,
    /// Root entity, or the child relationship name for a sub-select
    pub from: String,
    /// Everything after the FROM target, verbatim
    pub tail: Option<String>,
}

impl SelectQuery {
    pub fn new(from: impl Into<String>, items: Vec<ProjectionItem>) -> Self {
        Self {
            items,
            from: from.into(),
            tail: None,
        }
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        let tail = tail.into();
        self.tail = if tail.trim().is_empty() {
            None
        } else {
            Some(tail.trim().to_string())
        };
        self
    }

    /// Depth of correlated sub-select nesting (0 for a flat projection)
    pub fn nesting_depth(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| match item {
                ProjectionItem::SubQuery(sub) => Some(1 + sub.nesting_depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// One entry of a projection list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionItem {
    /// `Field` or `Rel.Field`
    Column(ColumnRef),
    /// `FUNC(args)`
    Aggregate(AggregateCall),
    /// `(SELECT ... FROM ChildRelation ...)`
    SubQuery(Box<SelectQuery>),
}

impl ProjectionItem {
    /// Explicit alias, if the client gave one
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Column(column) => column.alias.as_deref(),
            Self::Aggregate(call) => call.alias.as_deref(),
            Self::SubQuery(_) => None,
        }
    }
}

/// Column reference, possibly relationship-qualified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Path segments; all but the last are relationship qualifiers
    pub path: Vec<String>,
    pub alias: Option<String>,
}

impl ColumnRef {
    /// Parse a dotted path like `Account.Owner.Name`
    pub fn dotted(path: &str) -> Self {
        Self {
            path: path.split('.').map(str::to_string).collect(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The bare field name (last segment)
    pub fn field(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn qualifiers(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, qualifiers)) => qualifiers,
            None => &[],
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.path.len() > 1
    }

    /// Full dotted path
    pub fn full_path(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// Aggregate function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCall {
    /// Function name as written by the client
    pub function: String,
    pub args: Vec<ColumnRef>,
    pub alias: Option<String>,
}

impl AggregateCall {
    pub fn new(function: impl Into<String>, args: Vec<ColumnRef>) -> Self {
        Self {
            function: function.into(),
            args,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Whether the result is always a count regardless of the argument type
    pub fn is_count(&self) -> bool {
        self.function.eq_ignore_ascii_case("count")
            || self.function.eq_ignore_ascii_case("count_distinct")
    }
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args
            .iter()
            .map(ColumnRef::full_path)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.function, args)
    }
}
