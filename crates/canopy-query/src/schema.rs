//! Schema tree: which columns were requested, in what order, at what nesting.
//!
//! Built once per compiled query by the [`Analyzer`](crate::analyze::Analyzer)
//! and shared read-only by the renderer and every row expansion.

use crate::tree::TreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic type of a field as reported by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SemanticType {
    String,
    Id,
    Reference,
    Int,
    Long,
    Double,
    Decimal,
    Currency,
    Percent,
    Boolean,
    Date,
    DateTime,
    Time,
    Picklist,
    MultiPicklist,
    TextArea,
    Email,
    Phone,
    Url,
    Base64,
    Address,
    Location,
    /// Remote type not known to this crate
    Any,
}

impl SemanticType {
    /// Remote type name, as it appears in describe payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Id => "id",
            Self::Reference => "reference",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Currency => "currency",
            Self::Percent => "percent",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Picklist => "picklist",
            Self::MultiPicklist => "multipicklist",
            Self::TextArea => "textarea",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Url => "url",
            Self::Base64 => "base64",
            Self::Address => "address",
            Self::Location => "location",
            Self::Any => "anyType",
        }
    }

    /// Parse a remote type name, mapping unrecognised names to [`SemanticType::Any`].
    ///
    /// Only meant for describe payloads; analyzer resolution failures are
    /// errors, not `Any`.
    pub fn from_remote(name: &str) -> Self {
        name.parse().unwrap_or(Self::Any)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Long | Self::Double | Self::Decimal | Self::Currency | Self::Percent
        )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised remote type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field type '{}'", self.0)
    }
}

impl std::error::Error for UnknownType {}

impl FromStr for SemanticType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // SOAP payloads prefix scalar types with their XML namespace
        let name = s.rsplit(':').next().unwrap_or(s).to_ascii_lowercase();
        let ty = match name.as_str() {
            "string" => Self::String,
            "id" => Self::Id,
            "reference" => Self::Reference,
            "int" | "integer" => Self::Int,
            "long" => Self::Long,
            "double" => Self::Double,
            "decimal" => Self::Decimal,
            "currency" => Self::Currency,
            "percent" => Self::Percent,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "time" => Self::Time,
            "picklist" | "combobox" => Self::Picklist,
            "multipicklist" => Self::MultiPicklist,
            "textarea" => Self::TextArea,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "url" => Self::Url,
            "base64" => Self::Base64,
            "address" => Self::Address,
            "location" => Self::Location,
            "anytype" => Self::Any,
            _ => return Err(UnknownType(s.to_string())),
        };
        Ok(ty)
    }
}

impl From<String> for SemanticType {
    fn from(name: String) -> Self {
        Self::from_remote(&name)
    }
}

impl From<SemanticType> for String {
    fn from(ty: SemanticType) -> Self {
        ty.as_str().to_string()
    }
}

/// One requested output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    /// Bare field name. Not unique: `Owner.Name` and `Account.Name` both
    /// have name `Name`
    pub name: String,
    /// Dotted path through any relationship qualifiers
    pub full_name: String,
    /// Output label
    pub alias: String,
    pub semantic_type: SemanticType,
}

impl FieldDef {
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        alias: impl Into<String>,
        semantic_type: SemanticType,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            alias: alias.into(),
            semantic_type,
        }
    }
}

/// Schema tree.
///
/// Top-level children are, in requested order, either leaf [`FieldDef`]s or
/// payload-less branches holding the nested schema of a correlated
/// sub-select.
pub type FieldDefTree = TreeNode<FieldDef>;

/// Column metadata handed to the relational result-set layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub label: String,
    pub name: String,
    pub full_name: String,
    pub semantic_type: SemanticType,
}

impl TreeNode<FieldDef> {
    /// Column metadata for every leaf, in output order
    pub fn columns(&self) -> Vec<ColumnMeta> {
        self.leaves()
            .filter_map(|leaf| leaf.payload())
            .map(|def| ColumnMeta {
                label: def.alias.clone(),
                name: def.name.clone(),
                full_name: def.full_name.clone(),
                semantic_type: def.semantic_type,
            })
            .collect()
    }

    /// Whether the schema requests any correlated sub-select
    pub fn has_nested(&self) -> bool {
        self.children().iter().any(|child| !child.is_leaf())
    }
}
