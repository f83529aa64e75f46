//! Raw response records as delivered by the remote protocol.
//!
//! A record is a named node whose children are its fields in wire order.
//! Each child is tagged as a scalar, an embedded related record, or a paged
//! sub-collection. Protocol bookkeeping (type tags, page cursors, status
//! flags) appears as ordinary named children and is stripped later by the
//! [`ResultTreeBuilder`](crate::build::ResultTreeBuilder).

use crate::error::ReshapeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a raw node holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A single value
    Scalar,
    /// A record: either a top-level result or an embedded related record
    Record,
    /// A paged sub-collection of records
    Collection,
}

/// One node of a raw response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    pub name: String,
    pub kind: NodeKind,
    /// Remote type tag for scalars (`xsd:string`, `int`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Scalar text; `None` is a null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
}

/// Node name of the synthesized identity field in JSON-derived records
const IDENTITY_FIELD: &str = "Id";

impl RawNode {
    /// A scalar field
    pub fn scalar(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Scalar,
            field_type: None,
            value: value.map(str::to_string),
            children: Vec::new(),
        }
    }

    /// A record with `children` as its fields
    pub fn record(name: impl Into<String>, children: Vec<RawNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Record,
            field_type: None,
            value: None,
            children,
        }
    }

    /// A sub-collection; `children` hold bookkeeping nodes and records
    pub fn collection(name: impl Into<String>, children: Vec<RawNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Collection,
            field_type: None,
            value: None,
            children,
        }
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn is_record(&self) -> bool {
        self.kind == NodeKind::Record
    }

    /// Convert one JSON REST record into a raw record node.
    ///
    /// The result has the same shape as a SOAP record: an `attributes.type`
    /// becomes a `type` bookkeeping scalar, and an identity field (taken
    /// from the last segment of `attributes.url`, null when absent) is
    /// prepended so the builder's skip-first rule applies uniformly.
    pub fn from_json(name: &str, value: &Value) -> Result<Self, ReshapeError> {
        let Value::Object(object) = value else {
            return Err(ReshapeError::InvalidPayload {
                message: format!("record '{}' is not a JSON object", name),
            });
        };
        Ok(json_record(name, object))
    }
}

/// Convert a JSON query-result page (`{"totalSize", "done", "records": [...]}`)
/// or a bare array of records into raw record nodes.
pub fn page_from_json(entity: &str, page: &Value) -> Result<Vec<RawNode>, ReshapeError> {
    let records = match page {
        Value::Array(records) => records,
        Value::Object(object) => match object.get("records") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(ReshapeError::InvalidPayload {
                    message: "query result has no 'records' array".to_string(),
                })
            }
        },
        _ => {
            return Err(ReshapeError::InvalidPayload {
                message: "expected a query result object or an array of records".to_string(),
            })
        }
    };

    records
        .iter()
        .map(|record| RawNode::from_json(entity, record))
        .collect()
}

fn json_record(name: &str, object: &Map<String, Value>) -> RawNode {
    let mut children = Vec::with_capacity(object.len() + 1);

    let attributes = object.get("attributes").and_then(Value::as_object);
    if let Some(entity_type) = attributes
        .and_then(|a| a.get("type"))
        .and_then(Value::as_str)
    {
        children.push(RawNode::scalar("type", Some(entity_type)));
    }
    let identity = attributes
        .and_then(|a| a.get("url"))
        .and_then(Value::as_str)
        .and_then(|url| url.rsplit('/').next())
        .filter(|id| !id.is_empty());
    children.push(RawNode::scalar(IDENTITY_FIELD, identity).with_type("id"));

    for (key, value) in object {
        if key == "attributes" {
            continue;
        }
        children.push(json_node(key, value));
    }

    RawNode::record(name, children)
}

fn json_node(name: &str, value: &Value) -> RawNode {
    match value {
        Value::Null => RawNode::scalar(name, None),
        Value::Bool(b) => RawNode::scalar(name, Some(b.to_string().as_str())).with_type("boolean"),
        Value::Number(n) => {
            let field_type = if n.is_f64() { "double" } else { "int" };
            RawNode::scalar(name, Some(n.to_string().as_str())).with_type(field_type)
        }
        Value::String(s) => RawNode::scalar(name, Some(s.as_str())).with_type("string"),
        Value::Object(object) => match object.get("records") {
            Some(Value::Array(records)) => {
                let mut children = Vec::with_capacity(object.len() + records.len());
                for (key, inner) in object {
                    match (key.as_str(), inner) {
                        ("records", _) => {}
                        (_, Value::Array(_) | Value::Object(_)) => {}
                        _ => children.push(json_node(key, inner)),
                    }
                }
                for record in records {
                    if let Value::Object(record) = record {
                        children.push(json_record("records", record));
                    }
                }
                RawNode::collection(name, children)
            }
            _ => json_record(name, object),
        },
        // Arrays only appear inside collections; anything else is kept as text
        Value::Array(_) => RawNode::scalar(name, Some(value.to_string().as_str())),
    }
}
