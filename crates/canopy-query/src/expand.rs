//! Cartesian expansion: result trees to flat relational rows.
//!
//! Walks the schema tree's top-level children with two cursors:
//! `schema_position` over schema children and `column_position` over the
//! current row's children. Leaf positions advance both cursors by one and
//! require a value leaf in the row. A null value whose name prefixes the
//! next N schema leaves (`Account` before `Account.Name`, `Account.Type`) is
//! a null related record and widens to N null fields.
//! At a branch position the row's child at `column_position` must be a
//! payload-less branch holding the nested records, or a null value, which
//! counts as an empty collection:
//!
//! - with nested records, each record yields a variant (a copy of the row
//!   with that record's values spliced in place of the branch)
//! - with none, a single variant gets `nested_leaf_count` null slots
//!
//! Every variant is then expanded through the remaining positions, so
//! sibling branches multiply rather than zip. The column cursor advances by
//! `nested_leaf_count`, since the branch now occupies that many columns.

use crate::build::{ResultField, ResultTree};
use crate::error::ReshapeError;
use crate::schema::FieldDefTree;
use crate::tree::TreeNode;
use tracing::debug;

/// One flat output row; `None` is a SQL null
pub type Row = Vec<Option<ResultField>>;

/// Expands result trees against one compiled schema.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'s> {
    schema: &'s FieldDefTree,
}

impl<'s> Expander<'s> {
    pub fn new(schema: &'s FieldDefTree) -> Self {
        Self { schema }
    }

    /// Expand every record of a page, concatenating rows in record order
    pub fn expand(&self, records: Vec<ResultTree>) -> Result<Vec<Row>, ReshapeError> {
        let record_count = records.len();
        let mut rows = Vec::with_capacity(record_count);
        for record in records {
            rows.extend(self.expand_record(record)?);
        }

        debug!(records = record_count, rows = rows.len(), "Expanded page");
        Ok(rows)
    }

    /// Expand one record into one or more rows
    pub fn expand_record(&self, record: ResultTree) -> Result<Vec<Row>, ReshapeError> {
        let mut rows = Vec::new();
        expand_row(self.schema, record, 0, 0, &mut rows)?;
        Ok(rows)
    }
}

fn mismatch(schema_position: usize, column_position: usize, reason: String) -> ReshapeError {
    ReshapeError::StructuralMismatch {
        schema_position,
        column_position,
        reason,
    }
}

/// Number of schema leaves from `schema_position` that a null related record
/// named by `field` stands in for. Zero when `field` is an ordinary value.
fn null_relationship_width(
    schema: &FieldDefTree,
    schema_position: usize,
    field: &ResultField,
) -> usize {
    if field.value.is_some() {
        return 0;
    }
    let prefix = format!("{}.", field.full_name.to_lowercase());
    schema.children()[schema_position..]
        .iter()
        .take_while(|node| {
            node.is_leaf()
                && node
                    .payload()
                    .is_some_and(|def| def.full_name.to_lowercase().starts_with(&prefix))
        })
        .count()
}

fn expand_row(
    schema: &FieldDefTree,
    mut row: ResultTree,
    mut column_position: usize,
    mut schema_position: usize,
    out: &mut Vec<Row>,
) -> Result<(), ReshapeError> {
    // Leaf positions need no expansion, but the row must hold a value there
    while let Some(def) = schema.child(schema_position).filter(|node| node.is_leaf()) {
        let expected = def.payload().map_or("", |def| def.full_name.as_str());
        let field = match row.child(column_position) {
            None => {
                return Err(mismatch(
                    schema_position,
                    column_position,
                    format!("expected field '{}', row ended", expected),
                ))
            }
            Some(value) => value.payload().ok_or_else(|| {
                mismatch(
                    schema_position,
                    column_position,
                    format!("expected field '{}', found nested records", expected),
                )
            })?,
        };

        let covered = null_relationship_width(schema, schema_position, field);
        if covered > 0 {
            let nulls: Vec<ResultTree> = schema.children()
                [schema_position..schema_position + covered]
                .iter()
                .filter_map(TreeNode::payload)
                .map(|def| TreeNode::leaf(ResultField::new(def.full_name.clone(), None)))
                .collect();
            row.splice_child(column_position, nulls);
        }

        let step = covered.max(1);
        column_position += step;
        schema_position += step;
    }

    let Some(nested_schema) = schema.child(schema_position) else {
        let flat = row.flatten();
        if flat.len() != schema.leaf_count() {
            return Err(mismatch(
                schema_position,
                column_position,
                format!(
                    "row has {} values, schema has {} columns",
                    flat.len(),
                    schema.leaf_count()
                ),
            ));
        }
        out.push(flat);
        return Ok(());
    };

    let nested_leaf_count = nested_schema.leaf_count();

    let value = row.child(column_position).ok_or_else(|| {
        mismatch(
            schema_position,
            column_position,
            "expected nested records, row ended".to_string(),
        )
    })?;
    // A null in place of a collection is an empty collection
    let nested_records = match value.payload() {
        None => value.child_count(),
        Some(field) if field.value.is_none() => 0,
        Some(field) => {
            return Err(mismatch(
                schema_position,
                column_position,
                format!("expected nested records, found field '{}'", field.full_name),
            ))
        }
    };

    let variants = if nested_records > 0 {
        let mut variants = Vec::with_capacity(nested_records);
        for nested in value.children() {
            let mut nested_rows = Vec::new();
            expand_row(nested_schema, nested.clone(), 0, 0, &mut nested_rows)?;

            for nested_row in nested_rows {
                if nested_row.len() != nested_leaf_count {
                    return Err(mismatch(
                        schema_position,
                        column_position,
                        format!(
                            "nested record has {} values, expected {}",
                            nested_row.len(),
                            nested_leaf_count
                        ),
                    ));
                }
                let mut variant = row.clone();
                variant.splice_child(column_position, nested_row.into_iter().map(TreeNode::new));
                variants.push(variant);
            }
        }
        variants
    } else {
        row.splice_child(
            column_position,
            std::iter::repeat_with(TreeNode::structural).take(nested_leaf_count),
        );
        vec![row]
    };

    for variant in variants {
        expand_row(
            schema,
            variant,
            column_position + nested_leaf_count,
            schema_position + 1,
            out,
        )?;
    }
    Ok(())
}
