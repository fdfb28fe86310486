//! Run-wide option set registry.
//!
//! The registry is the single owner of "has this option set been emitted"
//! state. Every option set sighted during a run is registered here, and the
//! emitter only ever renders what [`OptionSetRegistry::pending_global_emissions`]
//! or [`OptionSetRegistry::local_emissions_for`] hand out. Both mark what they
//! return as rendered, so a definition is emitted at most once per run no
//! matter how many entities, groups or output files reference it.
//!
//! Identity-key equality is treated as definition equality; contents of a
//! repeat sighting are never compared.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::codegen::error::{GenerationError, Result};
use crate::codegen::types::{OptionSetDefinition, OptionSetScope};

/// Where an option set was seen and whether that group wants it emitted
#[derive(Debug, Clone, Copy)]
pub struct Sighting<'a> {
    /// Referencing entity, `None` for group-wide requests of all global sets
    pub entity: Option<&'a str>,
    /// Index of the configured group the sighting belongs to
    pub group: usize,
    pub emit_requested: bool,
}

impl<'a> Sighting<'a> {
    pub fn entity(entity: &'a str, group: usize, emit_requested: bool) -> Self {
        Self {
            entity: Some(entity),
            group,
            emit_requested,
        }
    }

    pub fn group_wide(group: usize) -> Self {
        Self {
            entity: None,
            group,
            emit_requested: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    FirstSeen,
    Repeat,
}

/// A global option set ready to be rendered
#[derive(Debug, Clone)]
pub struct GlobalEmission {
    pub definition: Arc<OptionSetDefinition>,
    /// First group that requested emission; its layout places the artifact
    pub group: usize,
}

#[derive(Debug)]
struct RegistryEntry {
    definition: Arc<OptionSetDefinition>,
    /// Owning entity of a local set
    owner: Option<String>,
    emit_requested: bool,
    requesting_group: Option<usize>,
    rendered: bool,
}

/// Deduplicating table of every option set seen in one run
#[derive(Debug, Default)]
pub struct OptionSetRegistry {
    entries: IndexMap<String, RegistryEntry>,
}

impl OptionSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting of an option set.
    ///
    /// Fails when the scope disagrees with an earlier sighting, or when a
    /// local set is referenced by a second entity.
    pub fn register(
        &mut self,
        definition: &Arc<OptionSetDefinition>,
        sighting: Sighting<'_>,
    ) -> Result<RegistrationOutcome> {
        let identity = definition.identity();

        if definition.scope == OptionSetScope::Local && sighting.entity.is_none() {
            // Group-wide sightings only ever carry global sets
            return Err(GenerationError::InconsistentOptionSetScope {
                option_set: identity.to_string(),
                registered: OptionSetScope::Global,
                received: OptionSetScope::Local,
            });
        }

        if let Some(entry) = self.entries.get_mut(identity) {
            if entry.definition.scope != definition.scope {
                return Err(GenerationError::InconsistentOptionSetScope {
                    option_set: identity.to_string(),
                    registered: entry.definition.scope,
                    received: definition.scope,
                });
            }

            if definition.scope == OptionSetScope::Local {
                if let (Some(owner), Some(other)) = (&entry.owner, sighting.entity) {
                    if owner != other {
                        return Err(GenerationError::LocalOptionSetShared {
                            option_set: identity.to_string(),
                            owner: owner.clone(),
                            other: other.to_string(),
                        });
                    }
                }
            }

            if sighting.emit_requested {
                entry.emit_requested = true;
                entry.requesting_group.get_or_insert(sighting.group);
            }

            tracing::debug!(
                "Option set '{}' seen again (emit requested: {})",
                identity,
                entry.emit_requested
            );
            return Ok(RegistrationOutcome::Repeat);
        }

        let owner = match definition.scope {
            OptionSetScope::Local => sighting.entity.map(str::to_string),
            OptionSetScope::Global => None,
        };

        tracing::debug!(
            "Registered {} option set '{}' (emit requested: {})",
            definition.scope,
            identity,
            sighting.emit_requested
        );

        self.entries.insert(
            identity.to_string(),
            RegistryEntry {
                definition: Arc::clone(definition),
                owner,
                emit_requested: sighting.emit_requested,
                requesting_group: sighting.emit_requested.then_some(sighting.group),
                rendered: false,
            },
        );

        Ok(RegistrationOutcome::FirstSeen)
    }

    /// Global sets requested for emission and not yet rendered, in first-seen order.
    ///
    /// Every returned definition is marked rendered.
    pub fn pending_global_emissions(&mut self) -> Vec<GlobalEmission> {
        let mut pending = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.definition.scope != OptionSetScope::Global
                || !entry.emit_requested
                || entry.rendered
            {
                continue;
            }
            if let Some(group) = entry.requesting_group {
                entry.rendered = true;
                pending.push(GlobalEmission {
                    definition: Arc::clone(&entry.definition),
                    group,
                });
            }
        }
        pending
    }

    /// Local sets owned by `entity` that were requested and not yet rendered.
    ///
    /// Every returned definition is marked rendered.
    pub fn local_emissions_for(&mut self, entity: &str) -> Vec<Arc<OptionSetDefinition>> {
        let mut emissions = Vec::new();
        for entry in self.entries.values_mut() {
            let owned = entry.definition.scope == OptionSetScope::Local
                && entry.owner.as_deref() == Some(entity);
            if owned && entry.emit_requested && !entry.rendered {
                entry.rendered = true;
                emissions.push(Arc::clone(&entry.definition));
            }
        }
        emissions
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn is_emission_requested(&self, identity: &str) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|entry| entry.emit_requested)
    }

    pub fn is_rendered(&self, identity: &str) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|entry| entry.rendered)
    }

    /// Number of distinct option sets seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str, scope: OptionSetScope) -> Arc<OptionSetDefinition> {
        Arc::new(OptionSetDefinition {
            name: name.to_string(),
            schema_name: None,
            scope,
            options: vec![],
            description: None,
        })
    }

    #[test]
    fn test_global_emitted_once_across_entities() {
        let community = definition("socialprofile_community", OptionSetScope::Global);
        let mut registry = OptionSetRegistry::new();

        let first = registry
            .register(&community, Sighting::entity("socialprofile", 0, true))
            .unwrap();
        let second = registry
            .register(&community, Sighting::entity("socialactivity", 0, true))
            .unwrap();

        assert_eq!(first, RegistrationOutcome::FirstSeen);
        assert_eq!(second, RegistrationOutcome::Repeat);
        assert_eq!(registry.len(), 1);

        let pending = registry.pending_global_emissions();
        assert_eq!(pending.len(), 1);
        assert!(registry.is_rendered("socialprofile_community"));
        assert!(registry.pending_global_emissions().is_empty());
    }

    #[test]
    fn test_emission_request_is_or_across_sightings() {
        let community = definition("socialprofile_community", OptionSetScope::Global);
        let mut registry = OptionSetRegistry::new();

        registry
            .register(&community, Sighting::entity("socialprofile", 0, false))
            .unwrap();
        assert!(!registry.is_emission_requested("socialprofile_community"));

        registry
            .register(&community, Sighting::entity("socialactivity", 1, true))
            .unwrap();
        registry
            .register(&community, Sighting::entity("contact", 2, false))
            .unwrap();

        let pending = registry.pending_global_emissions();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].group, 1);
    }

    #[test]
    fn test_unrequested_global_never_pending() {
        let community = definition("socialprofile_community", OptionSetScope::Global);
        let mut registry = OptionSetRegistry::new();
        registry
            .register(&community, Sighting::entity("socialprofile", 0, false))
            .unwrap();

        assert!(registry.pending_global_emissions().is_empty());
        assert!(registry.contains("socialprofile_community"));
    }

    #[test]
    fn test_scope_mismatch_is_fatal() {
        let mut registry = OptionSetRegistry::new();
        registry
            .register(
                &definition("statuscode", OptionSetScope::Global),
                Sighting::entity("account", 0, true),
            )
            .unwrap();

        let err = registry
            .register(
                &definition("statuscode", OptionSetScope::Local),
                Sighting::entity("contact", 0, true),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::InconsistentOptionSetScope {
                registered: OptionSetScope::Global,
                received: OptionSetScope::Local,
                ..
            }
        ));
    }

    #[test]
    fn test_local_shared_between_entities_is_fatal() {
        let priority = definition("socialactivity_prioritycode", OptionSetScope::Local);
        let mut registry = OptionSetRegistry::new();
        registry
            .register(&priority, Sighting::entity("socialactivity", 0, true))
            .unwrap();

        let err = registry
            .register(&priority, Sighting::entity("socialprofile", 0, true))
            .unwrap_err();
        assert!(matches!(err, GenerationError::LocalOptionSetShared { .. }));
    }

    #[test]
    fn test_local_emissions_filtered_by_owner_and_flag() {
        let priority = definition("socialactivity_prioritycode", OptionSetScope::Local);
        let gender = definition("contact_gendercode", OptionSetScope::Local);
        let mut registry = OptionSetRegistry::new();
        registry
            .register(&priority, Sighting::entity("socialactivity", 0, true))
            .unwrap();
        registry
            .register(&gender, Sighting::entity("contact", 1, false))
            .unwrap();

        assert!(registry.local_emissions_for("contact").is_empty());
        assert!(registry.local_emissions_for("socialprofile").is_empty());

        let emitted = registry.local_emissions_for("socialactivity");
        assert_eq!(emitted.len(), 1);
        assert!(registry.local_emissions_for("socialactivity").is_empty());
    }

    #[test]
    fn test_group_wide_sighting_rejects_local() {
        let mut registry = OptionSetRegistry::new();
        let err = registry
            .register(
                &definition("contact_gendercode", OptionSetScope::Local),
                Sighting::group_wide(0),
            )
            .unwrap_err();
        assert!(matches!(err, GenerationError::InconsistentOptionSetScope { .. }));
    }
}
