//! Query analyzer: projection AST to schema tree.
//!
//! Visits projection items left to right and emits one schema-tree child per
//! item, resolving every field's type through a [`SchemaResolver`]. A field
//! that does not resolve is an error naming its path; it is never coerced
//! to a generic type.

use crate::error::{AnalyzeError, TransformError};
use crate::ir::{AggregateCall, ColumnRef, ProjectionItem, SelectQuery};
use crate::resolver::{EntityDescribe, SchemaResolver};
use crate::schema::{FieldDef, FieldDefTree, SemanticType};
use crate::transform::{QueryTransform, ValidateTransform};
use crate::tree::TreeNode;
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds [`FieldDefTree`]s for parsed queries.
pub struct Analyzer<'a, R: SchemaResolver + ?Sized> {
    resolver: &'a R,
    validate: ValidateTransform,
}

impl<'a, R: SchemaResolver + ?Sized> Analyzer<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            validate: ValidateTransform::default(),
        }
    }

    /// Allow correlated sub-selects to nest up to `depth` levels
    pub fn with_max_subquery_depth(mut self, depth: usize) -> Self {
        self.validate = ValidateTransform::new(depth);
        self
    }

    /// Validate `query` and build its schema tree
    pub fn analyze(&self, query: &SelectQuery) -> Result<FieldDefTree, AnalyzeError> {
        let query = self.validate.transform(query.clone())?;
        trace!(transform = self.validate.name(), "Projection passed validation");
        let root = self.resolver.resolve(&query.from)?;
        let schema = self.analyze_items(&query.items, &root)?;

        debug!(
            entity = %root.name,
            columns = schema.leaf_count(),
            nested = schema.has_nested(),
            "Analyzed projection"
        );
        Ok(schema)
    }

    fn analyze_items(
        &self,
        items: &[ProjectionItem],
        entity: &EntityDescribe,
    ) -> Result<FieldDefTree, AnalyzeError> {
        if items.is_empty() {
            return Err(TransformError::EmptyProjection {
                entity: entity.name.clone(),
            }
            .into());
        }

        let mut tree = FieldDefTree::structural();
        for item in items {
            tree.push_child(self.visit(item, entity)?);
        }
        Ok(tree)
    }

    fn visit(
        &self,
        item: &ProjectionItem,
        entity: &EntityDescribe,
    ) -> Result<FieldDefTree, AnalyzeError> {
        match item {
            ProjectionItem::Column(column) => {
                Ok(TreeNode::leaf(self.column_def(column, entity)?))
            }
            ProjectionItem::Aggregate(call) => {
                Ok(TreeNode::leaf(self.aggregate_def(call, entity)?))
            }
            ProjectionItem::SubQuery(sub) => {
                let relationship = entity.child_relationship(&sub.from).ok_or_else(|| {
                    AnalyzeError::UnknownChildRelationship {
                        entity: entity.name.clone(),
                        relationship: sub.from.clone(),
                    }
                })?;
                trace!(
                    relationship = %relationship.relationship_name,
                    child = %relationship.child_entity,
                    "Analyzing sub-select"
                );
                let child = self.resolver.resolve(&relationship.child_entity)?;
                self.analyze_items(&sub.items, &child)
            }
        }
    }

    fn column_def(
        &self,
        column: &ColumnRef,
        entity: &EntityDescribe,
    ) -> Result<FieldDef, AnalyzeError> {
        let semantic_type = self.resolve_type(column, entity)?;
        let full_name = column.full_path();
        let alias = column.alias.clone().unwrap_or_else(|| full_name.clone());

        Ok(FieldDef {
            name: column.field().to_string(),
            full_name,
            alias,
            semantic_type,
        })
    }

    fn aggregate_def(
        &self,
        call: &AggregateCall,
        entity: &EntityDescribe,
    ) -> Result<FieldDef, AnalyzeError> {
        let alias = call.alias.clone().unwrap_or_else(|| call.function.clone());

        let Some(first) = call.args.first() else {
            return Ok(FieldDef {
                name: call.function.clone(),
                full_name: call.to_string(),
                alias,
                semantic_type: SemanticType::Int,
            });
        };

        if first.path.is_empty() {
            return Err(AnalyzeError::InvalidAggregate {
                function: call.function.clone(),
                message: "empty field path".to_string(),
            });
        }

        // Every argument must resolve even though only the first types the result
        let mut arg_types = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            arg_types.push(self.resolve_type(arg, entity)?);
        }

        let semantic_type = if call.is_count() {
            SemanticType::Int
        } else {
            arg_types[0]
        };

        Ok(FieldDef {
            name: call
                .alias
                .clone()
                .unwrap_or_else(|| first.field().to_string()),
            full_name: call.to_string(),
            alias,
            semantic_type,
        })
    }

    /// Follow the column's qualifiers from `entity` and type its last segment
    fn resolve_type(
        &self,
        column: &ColumnRef,
        entity: &EntityDescribe,
    ) -> Result<SemanticType, AnalyzeError> {
        let path = column.full_path();
        let mut hop: Option<Arc<EntityDescribe>> = None;

        for qualifier in column.qualifiers() {
            let from = hop.as_deref().unwrap_or(entity);
            // Polymorphic references follow their first target
            let target = from
                .reference(qualifier)
                .and_then(|field| field.reference_to.first())
                .ok_or_else(|| AnalyzeError::UnknownRelationship {
                    entity: from.name.clone(),
                    relationship: qualifier.clone(),
                    path: path.clone(),
                })?;
            let next = self.resolver.resolve(target)?;
            hop = Some(next);
        }

        let target = hop.as_deref().unwrap_or(entity);
        target
            .field(column.field())
            .map(|field| field.field_type)
            .ok_or_else(|| AnalyzeError::UnknownField {
                entity: target.name.clone(),
                path,
            })
    }
}
