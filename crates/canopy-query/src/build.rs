//! Result tree builder: raw record to [`ResultTree`].
//!
//! Rules, applied to every record node (top level, embedded, or inside a
//! sub-collection):
//!
//! 1. Children named in the bookkeeping set are dropped (exact,
//!    case-sensitive match).
//! 2. The first remaining child is dropped (skip-first). The remote protocol
//!    prepends a duplicate identity field to every record. This assumes
//!    exactly one such field always precedes real data; entities with a
//!    composite or absent identity are not special-cased. Disable with
//!    [`EngineConfig::skip_leading_identity`] for payloads that do not carry
//!    the duplicate.
//! 3. Embedded related records are inlined: their fields are spliced into the
//!    parent at that position, names prefixed with the relationship path.
//! 4. Sub-collections become a branch with one child subtree per record, in
//!    returned order. An empty collection is a branch with no children.
//! 5. Everything else becomes a leaf [`ResultField`].

use crate::config::EngineConfig;
use crate::error::ReshapeError;
use crate::raw::{NodeKind, RawNode};
use crate::tree::TreeNode;
use serde::Serialize;
use std::collections::HashSet;
use tracing::trace;

/// One value returned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResultField {
    /// Entity type tag; not populated by the builder
    pub entity_type: Option<String>,
    /// Remote type tag of the value
    pub field_type: Option<String>,
    /// Dotted path including relationship qualifiers
    pub full_name: String,
    pub value: Option<String>,
}

impl ResultField {
    pub fn new(full_name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            entity_type: None,
            field_type: None,
            full_name: full_name.into(),
            value: value.map(str::to_string),
        }
    }
}

/// Per-record tree of values, shape-aligned to the schema tree
pub type ResultTree = TreeNode<ResultField>;

/// Builds [`ResultTree`]s from raw records.
#[derive(Debug, Clone)]
pub struct ResultTreeBuilder {
    bookkeeping: HashSet<String>,
    skip_leading_identity: bool,
}

impl Default for ResultTreeBuilder {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ResultTreeBuilder {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            bookkeeping: config.bookkeeping_fields.iter().cloned().collect(),
            skip_leading_identity: config.skip_leading_identity,
        }
    }

    /// Whether `name` is protocol bookkeeping. Matching is exact, so data
    /// fields like `Type` or `Size` never collide with the protocol's `type`
    /// and `size` tags.
    pub fn is_bookkeeping(&self, name: &str) -> bool {
        self.bookkeeping.contains(name)
    }

    /// Build the result tree for one top-level record of `root_entity`
    pub fn build(&self, record: &RawNode, root_entity: &str) -> Result<ResultTree, ReshapeError> {
        if record.kind != NodeKind::Record {
            return Err(ReshapeError::NotARecord {
                name: record.name.clone(),
            });
        }

        let mut tree = ResultTree::structural();
        self.append_fields(record, "", &mut tree);

        trace!(
            entity = root_entity,
            columns = tree.child_count(),
            "Built result tree"
        );
        Ok(tree)
    }

    /// Build trees for every record of a page, in order
    pub fn build_all(
        &self,
        records: &[RawNode],
        root_entity: &str,
    ) -> Result<Vec<ResultTree>, ReshapeError> {
        records
            .iter()
            .map(|record| self.build(record, root_entity))
            .collect()
    }

    /// Data children of a record: bookkeeping stripped, leading identity skipped
    fn data_children<'a, 'r: 'a>(&'a self, record: &'r RawNode) -> impl Iterator<Item = &'r RawNode> + 'a {
        let skip = usize::from(self.skip_leading_identity);
        record
            .children
            .iter()
            .filter(move |child| !self.is_bookkeeping(&child.name))
            .skip(skip)
    }

    fn append_fields(&self, record: &RawNode, prefix: &str, out: &mut ResultTree) {
        for child in self.data_children(record) {
            match child.kind {
                NodeKind::Scalar => out.push_child(TreeNode::leaf(ResultField {
                    entity_type: None,
                    field_type: child.field_type.clone(),
                    full_name: format!("{}{}", prefix, child.name),
                    value: child.value.clone(),
                })),
                NodeKind::Record => {
                    let nested_prefix = format!("{}{}.", prefix, child.name);
                    self.append_fields(child, &nested_prefix, out);
                }
                NodeKind::Collection => {
                    let mut branch = ResultTree::structural();
                    for nested in child
                        .children
                        .iter()
                        .filter(|n| n.is_record() && !self.is_bookkeeping(&n.name))
                    {
                        let mut subtree = ResultTree::structural();
                        self.append_fields(nested, "", &mut subtree);
                        branch.push_child(subtree);
                    }
                    out.push_child(branch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(tree: &ResultTree) -> Vec<Option<String>> {
        tree.flatten()
            .into_iter()
            .map(|field| field.and_then(|f| f.value))
            .collect()
    }

    fn full_names(tree: &ResultTree) -> Vec<String> {
        tree.flatten()
            .into_iter()
            .flatten()
            .map(|f| f.full_name)
            .collect()
    }

    fn contact(last_name: &str, email: &str) -> RawNode {
        RawNode::record(
            "records",
            vec![
                RawNode::scalar("type", Some("Contact")),
                RawNode::scalar("Id", Some("003")),
                RawNode::scalar("LastName", Some(last_name)),
                RawNode::scalar("Email", Some(email)),
            ],
        )
    }

    #[test]
    fn test_skip_first_drops_identity() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("Id", Some("001")),
                RawNode::scalar("Name", Some("Acme")),
                RawNode::scalar("Email", Some("a@acme.test")),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();

        assert_eq!(full_names(&tree), vec!["Name", "Email"]);
        assert_eq!(
            values(&tree),
            vec![Some("Acme".to_string()), Some("a@acme.test".to_string())]
        );
    }

    #[test]
    fn test_bookkeeping_stripped_before_skip_first() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("type", Some("Account")),
                RawNode::scalar("Id", Some("001")),
                RawNode::scalar("Id", Some("001")),
                RawNode::scalar("Name", Some("Acme")),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();

        // Explicitly requested Id survives; only the protocol duplicate is dropped
        assert_eq!(full_names(&tree), vec!["Id", "Name"]);
    }

    #[test]
    fn test_data_fields_differing_only_in_case_survive() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("type", Some("Account")),
                RawNode::scalar("Id", Some("001")),
                RawNode::scalar("Name", Some("Acme")),
                RawNode::scalar("Type", Some("Customer")),
                RawNode::scalar("Size", Some("Large")),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();

        assert_eq!(full_names(&tree), vec!["Name", "Type", "Size"]);
        assert_eq!(
            values(&tree),
            vec![
                Some("Acme".to_string()),
                Some("Customer".to_string()),
                Some("Large".to_string())
            ]
        );
    }

    #[test]
    fn test_is_bookkeeping_is_case_sensitive() {
        let builder = ResultTreeBuilder::default();
        assert!(builder.is_bookkeeping("type"));
        assert!(builder.is_bookkeeping("queryLocator"));
        assert!(!builder.is_bookkeeping("Type"));
        assert!(!builder.is_bookkeeping("Done"));
        assert!(!builder.is_bookkeeping("querylocator"));
    }

    #[test]
    fn test_skip_first_can_be_disabled() {
        let config = EngineConfig {
            skip_leading_identity: false,
            ..EngineConfig::default()
        };
        let record = RawNode::record("records", vec![RawNode::scalar("Name", Some("Acme"))]);

        let tree = ResultTreeBuilder::from_config(&config)
            .build(&record, "Account")
            .unwrap();
        assert_eq!(full_names(&tree), vec!["Name"]);
    }

    #[test]
    fn test_embedded_record_is_inlined_with_prefix() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("Id", None),
                RawNode::scalar("LastName", Some("Ng")),
                RawNode::record(
                    "Account",
                    vec![
                        RawNode::scalar("type", Some("Account")),
                        RawNode::scalar("Id", None),
                        RawNode::scalar("Name", Some("Acme")),
                        RawNode::record(
                            "Owner",
                            vec![
                                RawNode::scalar("Id", None),
                                RawNode::scalar("Name", Some("Ada")),
                            ],
                        ),
                    ],
                ),
                RawNode::scalar("Email", None),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Contact").unwrap();

        assert_eq!(tree.child_count(), 4);
        assert!(tree.children().iter().all(TreeNode::is_leaf));
        assert_eq!(
            full_names(&tree),
            vec!["LastName", "Account.Name", "Account.Owner.Name", "Email"]
        );
    }

    #[test]
    fn test_collection_becomes_branch() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("Id", None),
                RawNode::scalar("Name", Some("Acme")),
                RawNode::collection(
                    "Contacts",
                    vec![
                        RawNode::scalar("done", Some("true")),
                        RawNode::scalar("queryLocator", None),
                        contact("Ng", "ng@acme.test"),
                        contact("Li", "li@acme.test"),
                        RawNode::scalar("size", Some("2")),
                    ],
                ),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();

        assert_eq!(tree.child_count(), 2);
        let branch = tree.child(1).unwrap();
        assert!(branch.payload().is_none());
        assert_eq!(branch.child_count(), 2);
        assert_eq!(full_names(branch.child(0).unwrap()), vec!["LastName", "Email"]);
        assert_eq!(
            values(branch.child(1).unwrap()),
            vec![Some("Li".to_string()), Some("li@acme.test".to_string())]
        );
    }

    #[test]
    fn test_empty_collection_has_no_children() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("Id", None),
                RawNode::collection(
                    "Contacts",
                    vec![
                        RawNode::scalar("done", Some("true")),
                        RawNode::scalar("size", Some("0")),
                    ],
                ),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();
        let branch = tree.child(0).unwrap();

        assert_eq!(branch.child_count(), 0);
        assert!(branch.payload().is_none());
    }

    #[test]
    fn test_null_scalar_keeps_its_slot() {
        let record = RawNode::record(
            "records",
            vec![RawNode::scalar("Id", None), RawNode::scalar("Phone", None)],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();

        let field = tree.child(0).and_then(TreeNode::payload).unwrap();
        assert_eq!(field.full_name, "Phone");
        assert_eq!(field.value, None);
        assert_eq!(field.entity_type, None);
    }

    #[test]
    fn test_field_type_carried() {
        let record = RawNode::record(
            "records",
            vec![
                RawNode::scalar("Id", None),
                RawNode::scalar("NumberOfEmployees", Some("12")).with_type("xsd:int"),
            ],
        );

        let tree = ResultTreeBuilder::default().build(&record, "Account").unwrap();
        let field = tree.child(0).and_then(TreeNode::payload).unwrap();
        assert_eq!(field.field_type.as_deref(), Some("xsd:int"));
    }

    #[test]
    fn test_rejects_non_record() {
        let result = ResultTreeBuilder::default().build(&RawNode::scalar("Name", None), "Account");
        assert!(matches!(result, Err(ReshapeError::NotARecord { .. })));
    }
}
