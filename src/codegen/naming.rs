//! Logical name to generated identifier resolution.
//!
//! Type names come from the platform schema name when there is one, and
//! otherwise from the logical name: split on `_`, capitalize each segment and
//! concatenate (option sets keep the `_` between segments so the owning
//! entity prefix stays visible). All generated types of a run share one
//! namespace; two distinct identities resolving to the same type name is a
//! [`GenerationError::NameCollision`], never a silent rename.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::codegen::error::{GenerationError, Result};
use crate::codegen::types::{Action, Entity, OptionSetDefinition, OptionValue};
use crate::codegen::utils::{capitalize, sanitize_identifier, words_to_pascal_case};

/// Members every generated entity class declares itself
pub const RESERVED_ENTITY_MEMBERS: &[&str] = &["EntityLogicalName", "EntityTypeCode", "EntityFields"];

/// Apply the fixed logical-name rule (`new_project` -> `NewProject`)
pub fn logical_to_identifier(logical_name: &str, separator: &str) -> String {
    let joined = logical_name
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(separator);
    sanitize_identifier(&joined)
}

fn preferred_name(schema_name: Option<&str>, logical_name: &str, separator: &str) -> String {
    match schema_name {
        Some(schema) if !schema.trim().is_empty() => sanitize_identifier(schema),
        _ => logical_to_identifier(logical_name, separator),
    }
}

/// What a generated type name stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameIdentity {
    Entity(String),
    OptionSet(String),
    ActionRequest(String),
    ActionResponse(String),
}

impl fmt::Display for NameIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameIdentity::Entity(name) => write!(f, "entity '{}'", name),
            NameIdentity::OptionSet(name) => write!(f, "option set '{}'", name),
            NameIdentity::ActionRequest(name) => write!(f, "action '{}'", name),
            NameIdentity::ActionResponse(name) => write!(f, "action response '{}'", name),
        }
    }
}

/// Type names generated for an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNames {
    pub request: String,
    /// Only present when the action has output parameters
    pub response: Option<String>,
}

/// Run-wide type name table
#[derive(Debug, Default)]
pub struct TypeNameResolver {
    claimed: HashMap<String, NameIdentity>,
    resolved: HashMap<NameIdentity, String>,
}

impl TypeNameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, name: String, identity: NameIdentity) -> Result<String> {
        if let Some(existing) = self.resolved.get(&identity) {
            return Ok(existing.clone());
        }

        if let Some(owner) = self.claimed.get(&name) {
            return Err(GenerationError::NameCollision {
                name,
                existing: owner.to_string(),
                incoming: identity.to_string(),
            });
        }

        self.claimed.insert(name.clone(), identity.clone());
        self.resolved.insert(identity, name.clone());
        Ok(name)
    }

    pub fn resolve_entity(&mut self, entity: &Entity) -> Result<String> {
        let name = preferred_name(entity.schema_name.as_deref(), &entity.logical_name, "");
        self.claim(name, NameIdentity::Entity(entity.logical_name.clone()))
    }

    pub fn resolve_option_set(&mut self, definition: &OptionSetDefinition) -> Result<String> {
        let name = preferred_name(definition.schema_name.as_deref(), &definition.name, "_");
        self.claim(name, NameIdentity::OptionSet(definition.identity().to_string()))
    }

    pub fn resolve_action(&mut self, action: &Action) -> Result<ActionNames> {
        let base = preferred_name(action.schema_name.as_deref(), &action.logical_name, "");
        let request = self.claim(
            format!("{}Request", base),
            NameIdentity::ActionRequest(action.logical_name.clone()),
        )?;
        let response = if action.outputs().next().is_some() {
            Some(self.claim(
                format!("{}Response", base),
                NameIdentity::ActionResponse(action.logical_name.clone()),
            )?)
        } else {
            None
        };
        Ok(ActionNames { request, response })
    }

    /// Name already resolved for an identity, if any
    pub fn lookup(&self, identity: &NameIdentity) -> Option<&str> {
        self.resolved.get(identity).map(String::as_str)
    }
}

/// Property names for an entity's attributes, in attribute order
pub fn entity_member_names(entity: &Entity, type_name: &str) -> Result<Vec<String>> {
    let mut seen: HashMap<String, String> = RESERVED_ENTITY_MEMBERS
        .iter()
        .map(|member| (member.to_string(), format!("generated member '{}'", member)))
        .collect();
    seen.insert(type_name.to_string(), format!("type '{}'", type_name));

    let mut members = Vec::with_capacity(entity.attributes.len());
    for attribute in &entity.attributes {
        let name = preferred_name(attribute.schema_name.as_deref(), &attribute.logical_name, "");
        let identity = format!("attribute '{}.{}'", entity.logical_name, attribute.logical_name);
        if let Some(existing) = seen.get(&name) {
            return Err(GenerationError::NameCollision {
                name,
                existing: existing.clone(),
                incoming: identity,
            });
        }
        seen.insert(name.clone(), identity);
        members.push(name);
    }
    Ok(members)
}

/// Property names for an action's parameters, in parameter order
pub fn parameter_member_names(action: &Action) -> Result<Vec<String>> {
    let mut seen: HashMap<String, String> = ["ActionLogicalName", "BoundEntityLogicalName"]
        .iter()
        .map(|member| (member.to_string(), format!("generated member '{}'", member)))
        .collect();

    let mut members = Vec::with_capacity(action.parameters.len());
    for parameter in &action.parameters {
        let name = sanitize_identifier(&capitalize(&parameter.name));
        let identity = format!("parameter '{}.{}'", action.logical_name, parameter.name);
        if let Some(existing) = seen.get(&name) {
            return Err(GenerationError::NameCollision {
                name,
                existing: existing.clone(),
                incoming: identity,
            });
        }
        seen.insert(name.clone(), identity);
        members.push(name);
    }
    Ok(members)
}

fn value_suffix(value: i32) -> String {
    if value < 0 {
        format!("N{}", value.unsigned_abs())
    } else {
        value.to_string()
    }
}

/// Enum member names for option values, in option order
///
/// Labels become PascalCase identifiers. A label with no usable characters
/// becomes `Value_{n}`, and a label repeated within the set gets `_{value}`
/// appended so every member stays addressable.
pub fn option_member_names(options: &[OptionValue]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut members = Vec::with_capacity(options.len());

    for option in options {
        let label = words_to_pascal_case(&option.label);
        let mut name = if label.is_empty() {
            format!("Value_{}", value_suffix(option.value))
        } else {
            sanitize_identifier(&label)
        };
        while taken.contains(&name) {
            name = format!("{}_{}", name, value_suffix(option.value));
        }
        taken.insert(name.clone());
        members.push(name);
    }
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::types::{Attribute, AttributeType, OptionSetScope};

    fn entity(logical_name: &str, schema_name: Option<&str>) -> Entity {
        Entity {
            logical_name: logical_name.to_string(),
            schema_name: schema_name.map(str::to_string),
            type_code: None,
            attributes: vec![],
            actions: vec![],
            description: None,
        }
    }

    fn attribute(logical_name: &str, schema_name: Option<&str>) -> Attribute {
        Attribute {
            logical_name: logical_name.to_string(),
            schema_name: schema_name.map(str::to_string),
            attribute_type: AttributeType::String,
            nullable: true,
            description: None,
        }
    }

    fn option_set(name: &str, schema_name: Option<&str>) -> OptionSetDefinition {
        OptionSetDefinition {
            name: name.to_string(),
            schema_name: schema_name.map(str::to_string),
            scope: OptionSetScope::Global,
            options: vec![],
            description: None,
        }
    }

    fn option(label: &str, value: i32) -> OptionValue {
        OptionValue {
            label: label.to_string(),
            value,
            description: None,
        }
    }

    #[test]
    fn test_logical_name_rule() {
        assert_eq!(logical_to_identifier("new_project", ""), "NewProject");
        assert_eq!(
            logical_to_identifier("socialactivity_prioritycode", "_"),
            "Socialactivity_Prioritycode"
        );
        assert_eq!(logical_to_identifier("account", ""), "Account");
    }

    #[test]
    fn test_schema_name_preferred() {
        let mut resolver = TypeNameResolver::new();
        assert_eq!(
            resolver
                .resolve_entity(&entity("socialprofile", Some("SocialProfile")))
                .unwrap(),
            "SocialProfile"
        );
        assert_eq!(
            resolver
                .resolve_option_set(&option_set(
                    "socialprofile_community",
                    Some("SocialProfile_Community")
                ))
                .unwrap(),
            "SocialProfile_Community"
        );
    }

    #[test]
    fn test_same_identity_resolves_consistently() {
        let mut resolver = TypeNameResolver::new();
        let account = entity("account", Some("Account"));
        let first = resolver.resolve_entity(&account).unwrap();
        let second = resolver.resolve_entity(&account).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            resolver.lookup(&NameIdentity::Entity("account".to_string())),
            Some("Account")
        );
    }

    #[test]
    fn test_collision_between_identities_is_fatal() {
        let mut resolver = TypeNameResolver::new();
        resolver
            .resolve_entity(&entity("new_project", None))
            .unwrap();

        let err = resolver
            .resolve_entity(&entity("newproject", Some("NewProject")))
            .unwrap_err();
        match err {
            GenerationError::NameCollision { name, existing, incoming } => {
                assert_eq!(name, "NewProject");
                assert!(existing.contains("new_project"));
                assert!(incoming.contains("newproject"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_collision_across_kinds() {
        let mut resolver = TypeNameResolver::new();
        resolver
            .resolve_option_set(&option_set("account_status", Some("Status")))
            .unwrap();
        assert!(resolver.resolve_entity(&entity("status", None)).is_err());
    }

    #[test]
    fn test_member_collisions() {
        let mut account = entity("account", Some("Account"));
        account.attributes = vec![attribute("name", None), attribute("fullname", Some("Name"))];
        assert!(entity_member_names(&account, "Account").is_err());

        account.attributes = vec![attribute("entitylogicalname", Some("EntityLogicalName"))];
        assert!(entity_member_names(&account, "Account").is_err());

        account.attributes = vec![attribute("account", None)];
        assert!(entity_member_names(&account, "Account").is_err());

        account.attributes = vec![attribute("name", None), attribute("accountnumber", Some("AccountNumber"))];
        assert_eq!(
            entity_member_names(&account, "Account").unwrap(),
            vec!["Name", "AccountNumber"]
        );
    }

    #[test]
    fn test_option_member_names() {
        let names = option_member_names(&[
            option("Facebook", 1),
            option("very high", 2),
            option("Facebook", 3),
            option("", -1),
            option("2nd line", 5),
        ]);
        assert_eq!(
            names,
            vec!["Facebook", "VeryHigh", "Facebook_3", "Value_N1", "_2ndLine"]
        );
    }
}
