//! Schema resolution.
//!
//! The analyzer asks a [`SchemaResolver`] for an entity's fields and child
//! relationships. Answers are treated as synchronous and authoritative;
//! any caching lives behind the trait, never in the analyzer.

use crate::error::ResolveError;
use crate::schema::SemanticType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Describes entity types by name.
pub trait SchemaResolver: Send + Sync {
    /// Look up an entity by name (case-insensitive)
    fn resolve(&self, entity: &str) -> Result<Arc<EntityDescribe>, ResolveError>;
}

impl<R: SchemaResolver + ?Sized> SchemaResolver for Arc<R> {
    fn resolve(&self, entity: &str) -> Result<Arc<EntityDescribe>, ResolveError> {
        (**self).resolve(entity)
    }
}

impl<R: SchemaResolver + ?Sized> SchemaResolver for &R {
    fn resolve(&self, entity: &str) -> Result<Arc<EntityDescribe>, ResolveError> {
        (**self).resolve(entity)
    }
}

/// Field and relationship metadata for one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescribe {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescribe>,
    #[serde(default)]
    pub child_relationships: Vec<ChildRelationship>,
}

/// One field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescribe {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: SemanticType,
    #[serde(default = "default_nillable")]
    pub nillable: bool,
    /// Entity types a reference field points at
    #[serde(default)]
    pub reference_to: Vec<String>,
    /// Qualifier used to traverse the reference (`Account` for `AccountId`)
    #[serde(default)]
    pub relationship_name: Option<String>,
}

fn default_nillable() -> bool {
    true
}

/// A one-to-many relationship from an entity to its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRelationship {
    pub relationship_name: String,
    pub child_entity: String,
}

impl EntityDescribe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            child_relationships: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescribe) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_child(
        mut self,
        relationship: impl Into<String>,
        child_entity: impl Into<String>,
    ) -> Self {
        self.child_relationships.push(ChildRelationship {
            relationship_name: relationship.into(),
            child_entity: child_entity.into(),
        });
        self
    }

    /// Field by name (case-insensitive)
    pub fn field(&self, name: &str) -> Option<&FieldDescribe> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Reference field reached through `qualifier`.
    ///
    /// Matches the field's relationship name first, then a reference field
    /// whose own name equals the qualifier.
    pub fn reference(&self, qualifier: &str) -> Option<&FieldDescribe> {
        self.fields
            .iter()
            .find(|f| {
                f.relationship_name
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case(qualifier))
            })
            .or_else(|| {
                self.fields.iter().find(|f| {
                    f.name.eq_ignore_ascii_case(qualifier) && !f.reference_to.is_empty()
                })
            })
    }

    /// Child relationship by name (case-insensitive)
    pub fn child_relationship(&self, name: &str) -> Option<&ChildRelationship> {
        self.child_relationships
            .iter()
            .find(|c| c.relationship_name.eq_ignore_ascii_case(name))
    }
}

impl FieldDescribe {
    pub fn new(name: impl Into<String>, field_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nillable: true,
            reference_to: Vec::new(),
            relationship_name: None,
        }
    }

    /// A reference field traversed as `relationship`, pointing at `target`
    pub fn reference(
        name: impl Into<String>,
        relationship: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: SemanticType::Reference,
            nillable: true,
            reference_to: vec![target.into()],
            relationship_name: Some(relationship.into()),
        }
    }

    pub fn required(mut self) -> Self {
        self.nillable = false;
        self
    }
}

/// Resolver over a fixed set of describes held in memory.
///
/// Useful as a stub in tests and for offline tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    entities: HashMap<String, Arc<EntityDescribe>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from describes
    pub fn from_describes(describes: impl IntoIterator<Item = EntityDescribe>) -> Self {
        let mut resolver = Self::new();
        for describe in describes {
            resolver.insert(describe);
        }
        resolver
    }

    /// Build from a JSON array of describes
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let describes: Vec<EntityDescribe> = serde_json::from_str(json)?;
        Ok(Self::from_describes(describes))
    }

    pub fn with_entity(mut self, describe: EntityDescribe) -> Self {
        self.insert(describe);
        self
    }

    /// Add or replace a describe
    pub fn insert(&mut self, describe: EntityDescribe) {
        self.entities
            .insert(describe.name.to_lowercase(), Arc::new(describe));
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SchemaResolver for InMemoryResolver {
    fn resolve(&self, entity: &str) -> Result<Arc<EntityDescribe>, ResolveError> {
        self.entities
            .get(&entity.to_lowercase())
            .cloned()
            .ok_or_else(|| ResolveError::UnknownEntity {
                entity: entity.to_string(),
            })
    }
}
