//! Normalized metadata model.
//!
//! These types describe entities, attributes, option sets and actions
//! independently of the platform's wire format. They are produced by a
//! [`MetadataAdapter`](crate::codegen::metadata::MetadataAdapter) and are
//! read-only for the rest of a generation run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Whether an option set is shared across entities or owned by one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionSetScope {
    /// Platform-wide definition referenced by identity from many entities
    Global,
    /// Owned by exactly one entity attribute
    #[default]
    Local,
}

impl fmt::Display for OptionSetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSetScope::Global => write!(f, "Global"),
            OptionSetScope::Local => write!(f, "Local"),
        }
    }
}

/// A single (label, value) pair of an option set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionValue {
    pub label: String,
    /// Numeric value as stored by the platform; this is the wire contract
    pub value: i32,
    pub description: Option<String>,
}

/// An option set (choice) definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetDefinition {
    /// Logical name, also the identity key (e.g. `socialprofile_community`)
    pub name: String,
    /// Platform casing used for the generated type (e.g. `SocialProfile_Community`)
    pub schema_name: Option<String>,
    pub scope: OptionSetScope,
    pub options: Vec<OptionValue>,
    pub description: Option<String>,
}

impl OptionSetDefinition {
    /// Identity key used for deduplication across a run
    pub fn identity(&self) -> &str {
        &self.name
    }

    pub fn is_global(&self) -> bool {
        self.scope == OptionSetScope::Global
    }
}

/// Attribute data type, resolved once at the adapter boundary
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Memo,
    Integer,
    BigInt,
    Decimal,
    Double,
    Money,
    Boolean,
    DateTime,
    UniqueIdentifier,
    /// Reference to a record of one of the target entities
    Lookup { targets: Vec<String> },
    OptionSet(Arc<OptionSetDefinition>),
    MultiSelectOptionSet(Arc<OptionSetDefinition>),
    /// Any platform type the generator has no dedicated mapping for
    Other(String),
}

impl AttributeType {
    /// Parse a platform type name, attaching the option set for choice types
    ///
    /// Returns `None` when a choice type is named but no option set is given.
    pub fn from_platform(
        type_name: &str,
        option_set: Option<Arc<OptionSetDefinition>>,
        targets: Vec<String>,
    ) -> Option<Self> {
        let normalized = type_name.to_lowercase().replace(['_', '-', ' '], "");
        let attribute_type = match normalized.as_str() {
            "string" | "entityname" => AttributeType::String,
            "memo" => AttributeType::Memo,
            "integer" | "int" => AttributeType::Integer,
            "bigint" => AttributeType::BigInt,
            "decimal" => AttributeType::Decimal,
            "double" | "float" => AttributeType::Double,
            "money" => AttributeType::Money,
            "boolean" | "bool" => AttributeType::Boolean,
            "datetime" => AttributeType::DateTime,
            "uniqueidentifier" | "guid" => AttributeType::UniqueIdentifier,
            "lookup" | "customer" | "owner" | "entityreference" => AttributeType::Lookup { targets },
            "picklist" | "optionset" | "choice" | "state" | "status" => {
                AttributeType::OptionSet(option_set?)
            }
            "multiselectpicklist" | "multiselectoptionset" | "multiselect" | "choices" => {
                AttributeType::MultiSelectOptionSet(option_set?)
            }
            _ => AttributeType::Other(type_name.to_string()),
        };
        Some(attribute_type)
    }

    /// The option set this attribute is typed by, if any
    pub fn option_set(&self) -> Option<&Arc<OptionSetDefinition>> {
        match self {
            AttributeType::OptionSet(def) | AttributeType::MultiSelectOptionSet(def) => Some(def),
            _ => None,
        }
    }
}

/// A typed field on an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub logical_name: String,
    pub schema_name: Option<String>,
    pub attribute_type: AttributeType,
    pub nullable: bool,
    pub description: Option<String>,
}

/// A platform record type
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique lowercase logical name
    pub logical_name: String,
    pub schema_name: Option<String>,
    pub type_code: Option<i32>,
    pub attributes: Vec<Attribute>,
    /// Logical names of the actions bound to this entity
    pub actions: Vec<String>,
    pub description: Option<String>,
}

impl Entity {
    /// Option sets referenced by this entity's attributes, in attribute order
    pub fn option_sets(&self) -> impl Iterator<Item = &Arc<OptionSetDefinition>> {
        self.attributes
            .iter()
            .filter_map(|attribute| attribute.attribute_type.option_set())
    }
}

/// Direction of an action parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterDirection {
    #[default]
    In,
    Out,
}

/// A typed parameter of an action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionParameter {
    pub name: String,
    pub parameter_type: AttributeType,
    pub direction: ParameterDirection,
    pub required: bool,
}

/// A platform callable operation
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub logical_name: String,
    pub schema_name: Option<String>,
    /// Entity this action is bound to, `None` for global actions
    pub bound_entity: Option<String>,
    pub parameters: Vec<ActionParameter>,
    pub description: Option<String>,
}

impl Action {
    pub fn inputs(&self) -> impl Iterator<Item = &ActionParameter> {
        self.parameters
            .iter()
            .filter(|p| p.direction == ParameterDirection::In)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ActionParameter> {
        self.parameters
            .iter()
            .filter(|p| p.direction == ParameterDirection::Out)
    }
}
