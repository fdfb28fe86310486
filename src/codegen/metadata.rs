//! Metadata adapter boundary.
//!
//! The generator never talks to the platform directly. It asks a
//! [`MetadataAdapter`] for fully resolved entities, and the adapter hides how
//! the metadata was obtained. [`SnapshotAdapter`] serves an already-fetched
//! [`MetadataSnapshot`] document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::codegen::error::{GenerationError, Result};
use crate::codegen::types::{
    Action, ActionParameter, Attribute, AttributeType, Entity, OptionSetDefinition,
    OptionSetScope, OptionValue, ParameterDirection,
};

/// Source of resolved platform metadata.
///
/// Implementations own transport concerns (authentication, retries, paging).
/// Every method either returns a fully resolved value or fails with
/// [`GenerationError::MetadataFetch`].
pub trait MetadataAdapter {
    /// Fetch an entity with all attributes resolved, plus the actions bound to it
    fn fetch(&self, entity: &str) -> Result<(Entity, Vec<Action>)>;

    /// Fetch an action selected by name
    fn fetch_action(&self, action: &str) -> Result<Action> {
        Err(GenerationError::fetch(
            action,
            "this metadata source does not serve actions by name",
        ))
    }

    /// Every global option set known to the platform
    fn global_option_sets(&self) -> Result<Vec<Arc<OptionSetDefinition>>> {
        Ok(Vec::new())
    }
}

fn default_nullable() -> bool {
    true
}

/// Metadata snapshot document (YAML or JSON)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataSnapshot {
    #[serde(default)]
    pub entities: Vec<EntityMetadata>,
    #[serde(default)]
    pub option_sets: Vec<OptionSetMetadata>,
    #[serde(default)]
    pub actions: Vec<ActionMetadata>,
}

/// Entity as described in a snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntityMetadata {
    pub logical_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub object_type_code: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeMetadata>,
    /// Names of actions bound to this entity
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Attribute as described in a snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeMetadata {
    pub logical_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    /// Platform type name (e.g. "String", "Picklist", "Lookup")
    #[serde(rename = "type")]
    pub attribute_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Name of the option set for choice attributes
    #[serde(default)]
    pub option_set: Option<String>,
    /// Target entities for lookups
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Option set as described in a snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptionSetMetadata {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub scope: OptionSetScope,
    #[serde(default)]
    pub options: Vec<OptionMetadata>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptionMetadata {
    pub label: String,
    pub value: i32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Action as described in a snapshot
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActionMetadata {
    pub logical_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub bound_entity: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterMetadata>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: String,
    #[serde(default)]
    pub direction: ParameterDirection,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub option_set: Option<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Adapter serving an in-memory metadata snapshot.
///
/// All references are checked and resolved when the adapter is built, so
/// `fetch` only ever fails for names the snapshot does not contain.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAdapter {
    entities: IndexMap<String, Entity>,
    option_sets: IndexMap<String, Arc<OptionSetDefinition>>,
    actions: IndexMap<String, Action>,
}

impl SnapshotAdapter {
    pub fn new(snapshot: MetadataSnapshot) -> Result<Self> {
        let schema_names = derive_option_set_schema_names(&snapshot);

        let mut option_sets = IndexMap::new();
        for raw in &snapshot.option_sets {
            let key = raw.name.to_lowercase();
            let schema_name = raw
                .schema_name
                .clone()
                .or_else(|| schema_names.get(&key).cloned());
            let definition = OptionSetDefinition {
                name: key.clone(),
                schema_name,
                scope: raw.scope,
                options: raw
                    .options
                    .iter()
                    .map(|option| OptionValue {
                        label: option.label.clone(),
                        value: option.value,
                        description: option.description.clone(),
                    })
                    .collect(),
                description: raw.description.clone(),
            };
            if option_sets.insert(key, Arc::new(definition)).is_some() {
                return Err(GenerationError::fetch(
                    &raw.name,
                    "option set is defined more than once in the snapshot",
                ));
            }
        }

        let mut actions = IndexMap::new();
        for raw in &snapshot.actions {
            let action = resolve_action(raw, &option_sets)?;
            if actions.insert(raw.logical_name.to_lowercase(), action).is_some() {
                return Err(GenerationError::fetch(
                    &raw.logical_name,
                    "action is defined more than once in the snapshot",
                ));
            }
        }

        let mut entities = IndexMap::new();
        for raw in &snapshot.entities {
            let entity = resolve_entity(raw, &option_sets, &actions)?;
            if entities.insert(raw.logical_name.to_lowercase(), entity).is_some() {
                return Err(GenerationError::fetch(
                    &raw.logical_name,
                    "entity is defined more than once in the snapshot",
                ));
            }
        }

        Ok(Self {
            entities,
            option_sets,
            actions,
        })
    }

    /// Logical names of all entities in snapshot order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.values().map(|e| e.logical_name.as_str())
    }
}

impl MetadataAdapter for SnapshotAdapter {
    fn fetch(&self, entity: &str) -> Result<(Entity, Vec<Action>)> {
        let resolved = self
            .entities
            .get(&entity.to_lowercase())
            .ok_or_else(|| {
                GenerationError::fetch(entity, "entity is not defined in the metadata snapshot")
            })?;

        let actions = resolved
            .actions
            .iter()
            .filter_map(|name| self.actions.get(&name.to_lowercase()).cloned())
            .collect();

        Ok((resolved.clone(), actions))
    }

    fn fetch_action(&self, action: &str) -> Result<Action> {
        self.actions
            .get(&action.to_lowercase())
            .cloned()
            .ok_or_else(|| {
                GenerationError::fetch(action, "action is not defined in the metadata snapshot")
            })
    }

    fn global_option_sets(&self) -> Result<Vec<Arc<OptionSetDefinition>>> {
        Ok(self
            .option_sets
            .values()
            .filter(|definition| definition.is_global())
            .cloned()
            .collect())
    }
}

/// Name option sets without a schema name after their first referencing attribute
///
/// `socialprofile.community` (schema `SocialProfile.Community`) names the
/// `socialprofile_community` set `SocialProfile_Community`. Only snapshot
/// document order is consulted.
fn derive_option_set_schema_names(snapshot: &MetadataSnapshot) -> IndexMap<String, String> {
    let mut names = IndexMap::new();
    for entity in &snapshot.entities {
        let Some(entity_schema) = &entity.schema_name else {
            continue;
        };
        for attribute in &entity.attributes {
            if let (Some(option_set), Some(attribute_schema)) =
                (&attribute.option_set, &attribute.schema_name)
            {
                names
                    .entry(option_set.to_lowercase())
                    .or_insert_with(|| format!("{}_{}", entity_schema, attribute_schema));
            }
        }
    }
    names
}

fn resolve_type(
    owner: &str,
    member: &str,
    type_name: &str,
    option_set: Option<&String>,
    targets: &[String],
    option_sets: &IndexMap<String, Arc<OptionSetDefinition>>,
) -> Result<AttributeType> {
    let definition = match option_set {
        Some(name) => Some(option_sets.get(&name.to_lowercase()).cloned().ok_or_else(|| {
            GenerationError::fetch(
                owner,
                format!("'{}' references unknown option set '{}'", member, name),
            )
        })?),
        None => None,
    };

    let references_option_set = definition.is_some();
    let attribute_type =
        AttributeType::from_platform(type_name, definition, targets.to_vec()).ok_or_else(|| {
            GenerationError::fetch(
                owner,
                format!("'{}' is of choice type {} but names no option set", member, type_name),
            )
        })?;

    if references_option_set && attribute_type.option_set().is_none() {
        return Err(GenerationError::fetch(
            owner,
            format!("'{}' is of non-choice type {} but names an option set", member, type_name),
        ));
    }
    Ok(attribute_type)
}

fn resolve_entity(
    raw: &EntityMetadata,
    option_sets: &IndexMap<String, Arc<OptionSetDefinition>>,
    actions: &IndexMap<String, Action>,
) -> Result<Entity> {
    let mut attributes = Vec::with_capacity(raw.attributes.len());
    for attribute in &raw.attributes {
        let attribute_type = resolve_type(
            &raw.logical_name,
            &attribute.logical_name,
            &attribute.attribute_type,
            attribute.option_set.as_ref(),
            &attribute.targets,
            option_sets,
        )?;
        attributes.push(Attribute {
            logical_name: attribute.logical_name.to_lowercase(),
            schema_name: attribute.schema_name.clone(),
            attribute_type,
            nullable: attribute.nullable,
            description: attribute.description.clone(),
        });
    }

    let logical_name = raw.logical_name.to_lowercase();

    // Explicitly listed actions first, then actions declaring this entity as their binding
    let mut bound: Vec<String> = Vec::new();
    for name in &raw.actions {
        let key = name.to_lowercase();
        if !actions.contains_key(&key) {
            return Err(GenerationError::fetch(
                &raw.logical_name,
                format!("references unknown action '{}'", name),
            ));
        }
        if !bound.contains(&key) {
            bound.push(key);
        }
    }
    for (key, action) in actions {
        let binds_here = action
            .bound_entity
            .as_deref()
            .is_some_and(|entity| entity.eq_ignore_ascii_case(&logical_name));
        if binds_here && !bound.contains(key) {
            bound.push(key.clone());
        }
    }

    Ok(Entity {
        logical_name,
        schema_name: raw.schema_name.clone(),
        type_code: raw.object_type_code,
        attributes,
        actions: bound,
        description: raw.description.clone(),
    })
}

fn resolve_action(
    raw: &ActionMetadata,
    option_sets: &IndexMap<String, Arc<OptionSetDefinition>>,
) -> Result<Action> {
    let mut parameters = Vec::with_capacity(raw.parameters.len());
    for parameter in &raw.parameters {
        parameters.push(ActionParameter {
            name: parameter.name.clone(),
            parameter_type: resolve_type(
                &raw.logical_name,
                &parameter.name,
                &parameter.parameter_type,
                parameter.option_set.as_ref(),
                &parameter.targets,
                option_sets,
            )?,
            direction: parameter.direction,
            required: parameter.required,
        });
    }

    Ok(Action {
        logical_name: raw.logical_name.to_lowercase(),
        schema_name: raw.schema_name.clone(),
        bound_entity: raw.bound_entity.as_ref().map(|e| e.to_lowercase()),
        parameters,
        description: raw.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
entities:
  - logical_name: socialprofile
    schema_name: SocialProfile
    attributes:
      - logical_name: community
        schema_name: Community
        type: Picklist
        option_set: socialprofile_community
      - logical_name: profilename
        type: String
        nullable: false
  - logical_name: socialactivity
    schema_name: SocialActivity
    attributes:
      - logical_name: community
        schema_name: Community
        type: Picklist
        option_set: socialprofile_community
option_sets:
  - name: socialprofile_community
    scope: global
    options:
      - { label: Facebook, value: 1 }
      - { label: Twitter, value: 2 }
actions:
  - logical_name: new_refreshprofile
    bound_entity: socialprofile
"#;

    fn adapter() -> SnapshotAdapter {
        let snapshot: MetadataSnapshot = serde_yaml::from_str(SNAPSHOT).unwrap();
        SnapshotAdapter::new(snapshot).unwrap()
    }

    #[test]
    fn test_fetch_resolves_option_sets() {
        let (entity, actions) = adapter().fetch("SocialProfile").unwrap();

        assert_eq!(entity.logical_name, "socialprofile");
        let community = entity.attributes[0].attribute_type.option_set().unwrap();
        assert_eq!(community.scope, OptionSetScope::Global);
        assert_eq!(community.options.len(), 2);
        assert!(!entity.attributes[1].nullable);

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].logical_name, "new_refreshprofile");
    }

    #[test]
    fn test_schema_name_derived_from_first_reference() {
        let (entity, _) = adapter().fetch("socialactivity").unwrap();
        let community = entity.attributes[0].attribute_type.option_set().unwrap();
        assert_eq!(community.schema_name.as_deref(), Some("SocialProfile_Community"));
    }

    #[test]
    fn test_unknown_entity_is_fetch_error() {
        let err = adapter().fetch("contact").unwrap_err();
        assert!(matches!(err, GenerationError::MetadataFetch { ref selector, .. } if selector == "contact"));
    }

    #[test]
    fn test_dangling_option_set_reference_rejected() {
        let snapshot: MetadataSnapshot = serde_yaml::from_str(
            r#"
entities:
  - logical_name: account
    attributes:
      - logical_name: industrycode
        type: Picklist
        option_set: account_industrycode
"#,
        )
        .unwrap();

        let err = SnapshotAdapter::new(snapshot).unwrap_err();
        assert!(err.to_string().contains("account_industrycode"));
    }

    #[test]
    fn test_option_set_reference_on_non_choice_rejected() {
        let snapshot: MetadataSnapshot = serde_yaml::from_str(
            r#"
entities:
  - logical_name: account
    attributes:
      - logical_name: name
        type: String
        option_set: account_industrycode
option_sets:
  - name: account_industrycode
    scope: local
"#,
        )
        .unwrap();

        let err = SnapshotAdapter::new(snapshot).unwrap_err();
        assert!(matches!(err, GenerationError::MetadataFetch { ref selector, .. } if selector == "account"));
        assert!(err.to_string().contains("non-choice type String"));
    }

    #[test]
    fn test_option_set_names_are_lowercased() {
        let snapshot: MetadataSnapshot = serde_yaml::from_str(
            r#"
entities:
  - logical_name: Account
    schema_name: Account
    attributes:
      - { logical_name: Region, schema_name: Region, type: Picklist, option_set: New_Region }
option_sets:
  - name: New_Region
    scope: global
    options:
      - { label: EMEA, value: 1 }
"#,
        )
        .unwrap();

        let adapter = SnapshotAdapter::new(snapshot).unwrap();
        let (entity, _) = adapter.fetch("account").unwrap();
        let region = entity.attributes[0].attribute_type.option_set().unwrap();
        assert_eq!(region.identity(), "new_region");
        assert_eq!(adapter.global_option_sets().unwrap()[0].identity(), "new_region");
    }

    #[test]
    fn test_global_option_sets_listed() {
        let globals = adapter().global_option_sets().unwrap();
        assert_eq!(globals.len(), 1);
        assert_eq!(globals[0].identity(), "socialprofile_community");
    }
}
