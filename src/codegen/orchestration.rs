//! High-level orchestration API for code generation.
//!
//! [`GenerationOrchestrator`] drives one full run: every configured group is
//! fetched, registered, emitted and placed in order, then all requested
//! global option sets are flushed once. The complete [`ArtifactSet`] is
//! built in memory before anything is written, so a failed run leaves
//! storage untouched.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::codegen::csharp_codegen::{
    render_action, render_entity, render_option_set, ActionRenderNames, Artifact, EntityNames,
    OptionSetNames,
};
use crate::codegen::error::Result;
use crate::codegen::fs_utils::ArtifactStore;
use crate::codegen::metadata::MetadataAdapter;
use crate::codegen::naming::{
    entity_member_names, option_member_names, parameter_member_names, TypeNameResolver,
};
use crate::codegen::optionset_registry::{OptionSetRegistry, Sighting};
use crate::codegen::output_planner::{ArtifactSet, OutputPlanner};
use crate::codegen::types::{Action, Entity, OptionSetDefinition};

/// Aggregate entity file name used when a group does not name one
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "entities.cs";

/// Configuration for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Groups in processing order
    pub groups: Vec<EntityGroup>,
}

/// A batch of entity selectors sharing one set of generation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroup {
    /// Entity logical names to generate
    pub entities: Vec<String>,

    /// Actions to generate in addition to those bound to `entities`
    pub actions: Vec<String>,

    /// Emit enums for the option sets these entities reference
    pub emit_option_set_enums: bool,

    /// Emit every global option set the metadata source knows about
    pub generate_global_option_sets: bool,

    /// Write each generated type to its own file
    pub one_type_per_file: bool,

    /// Aggregate entity file name, ignored in one-type-per-file mode
    pub output_file_name: String,

    pub output_directory: PathBuf,

    /// Namespace wrapping the group's generated types
    pub namespace: Option<String>,
}

impl Default for EntityGroup {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            actions: Vec::new(),
            emit_option_set_enums: false,
            generate_global_option_sets: false,
            one_type_per_file: false,
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
            output_directory: PathBuf::from("."),
            namespace: None,
        }
    }
}

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    FetchingGroup(usize),
    Registering(usize),
    Emitting(usize),
    /// Placing the group's artifacts into their files
    Writing(usize),
    FlushGlobalOptionSets,
    Done,
    Failed,
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub entities: usize,
    pub option_sets: usize,
    pub actions: usize,
    /// Selections skipped because an earlier group already generated them
    pub skipped_selections: usize,
    /// Produced files in placement order
    pub files: Vec<PathBuf>,
}

/// Mutable tables of one run, created fresh by every `generate()` call
#[derive(Debug, Default)]
struct RunContext {
    registry: OptionSetRegistry,
    resolver: TypeNameResolver,
    planner: OutputPlanner,
    report: GenerationReport,
    generated_entities: HashSet<String>,
    generated_actions: HashSet<String>,
}

/// Drives a generation run for a config against a metadata source
pub struct GenerationOrchestrator<'a, A: MetadataAdapter + ?Sized> {
    config: &'a GenerationConfig,
    adapter: &'a A,
    state: RunState,
    report: GenerationReport,
}

impl<'a, A: MetadataAdapter + ?Sized> GenerationOrchestrator<'a, A> {
    pub fn new(config: &'a GenerationConfig, adapter: &'a A) -> Self {
        Self {
            config,
            adapter,
            state: RunState::Init,
            report: GenerationReport::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Report of the last successful `generate()` call
    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Build the full artifact set without writing anything
    ///
    /// On success the run rests in `FlushGlobalOptionSets`. Only [`run`](Self::run)
    /// reaches `Done`, once every file is written.
    pub fn generate(&mut self) -> Result<ArtifactSet> {
        self.transition(RunState::Init);

        match self.build() {
            Ok((artifacts, report)) => {
                tracing::info!(
                    "Generated {} entities, {} option sets, {} actions in {} files",
                    report.entities,
                    report.option_sets,
                    report.actions,
                    report.files.len()
                );
                self.report = report;
                Ok(artifacts)
            }
            Err(e) => {
                self.transition(RunState::Failed);
                Err(e)
            }
        }
    }

    /// Build the artifact set and flush it to `store`
    pub fn run<S: ArtifactStore + ?Sized>(&mut self, store: &mut S) -> Result<GenerationReport> {
        let artifacts = self.generate()?;

        if let Err(e) = artifacts.flush(store) {
            self.transition(RunState::Failed);
            return Err(e);
        }

        self.transition(RunState::Done);
        Ok(self.report.clone())
    }

    fn build(&mut self) -> Result<(ArtifactSet, GenerationReport)> {
        let config = self.config;
        let mut ctx = RunContext::default();

        for (index, group) in config.groups.iter().enumerate() {
            self.generate_group(index, group, &mut ctx)?;
        }

        self.transition(RunState::FlushGlobalOptionSets);
        for emission in ctx.registry.pending_global_emissions() {
            let group = &config.groups[emission.group];
            let artifact = option_set_artifact(&emission.definition, &mut ctx.resolver)?;
            ctx.planner.place(group, artifact);
            ctx.report.option_sets += 1;
        }

        let artifacts = ctx.planner.finish();
        ctx.report.files = artifacts.paths().map(|p| p.to_path_buf()).collect();
        Ok((artifacts, ctx.report))
    }

    fn generate_group(&mut self, index: usize, group: &EntityGroup, ctx: &mut RunContext) -> Result<()> {
        tracing::info!(
            "Generating group {} ({} entities, {} actions) into {}",
            index + 1,
            group.entities.len(),
            group.actions.len(),
            group.output_directory.display()
        );

        self.transition(RunState::FetchingGroup(index));
        let mut entities: Vec<Entity> = Vec::new();
        let mut actions: Vec<Action> = Vec::new();

        for selector in &group.entities {
            let (entity, bound_actions) = self.adapter.fetch(selector)?;
            if !ctx.generated_entities.insert(entity.logical_name.to_lowercase()) {
                tracing::warn!(
                    "Entity '{}' is already generated by an earlier group, skipping it in group {}",
                    entity.logical_name,
                    index + 1
                );
                ctx.report.skipped_selections += 1;
                continue;
            }
            entities.push(entity);
            actions.extend(bound_actions);
        }

        for selector in &group.actions {
            actions.push(self.adapter.fetch_action(selector)?);
        }

        self.transition(RunState::Registering(index));
        for entity in &entities {
            for definition in entity.option_sets() {
                ctx.registry.register(
                    definition,
                    Sighting::entity(&entity.logical_name, index, group.emit_option_set_enums),
                )?;
            }
        }

        if group.generate_global_option_sets {
            for definition in self.adapter.global_option_sets()? {
                ctx.registry.register(&definition, Sighting::group_wide(index))?;
            }
        }

        self.transition(RunState::Emitting(index));
        let mut artifacts: Vec<Artifact> = Vec::new();

        for entity in &entities {
            artifacts.push(entity_artifact(entity, group, &mut ctx.resolver)?);
            ctx.report.entities += 1;

            for definition in ctx.registry.local_emissions_for(&entity.logical_name) {
                artifacts.push(option_set_artifact(&definition, &mut ctx.resolver)?);
                ctx.report.option_sets += 1;
            }
        }

        for action in &actions {
            if !ctx.generated_actions.insert(action.logical_name.to_lowercase()) {
                tracing::warn!(
                    "Action '{}' is already generated, skipping it in group {}",
                    action.logical_name,
                    index + 1
                );
                ctx.report.skipped_selections += 1;
                continue;
            }
            artifacts.push(action_artifact(action, &mut ctx.resolver)?);
            ctx.report.actions += 1;
        }

        self.transition(RunState::Writing(index));
        for artifact in artifacts {
            ctx.planner.place(group, artifact);
        }

        Ok(())
    }
}

fn entity_artifact(entity: &Entity, group: &EntityGroup, resolver: &mut TypeNameResolver) -> Result<Artifact> {
    let type_name = resolver.resolve_entity(entity)?;
    let members = entity_member_names(entity, &type_name)?;

    // Enum types are only referenced when this group emits them
    let enum_types = entity
        .attributes
        .iter()
        .map(|attribute| match attribute.attribute_type.option_set() {
            Some(definition) if group.emit_option_set_enums => {
                resolver.resolve_option_set(definition).map(Some)
            }
            _ => Ok(None),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(render_entity(
        entity,
        &EntityNames {
            type_name,
            members,
            enum_types,
        },
    ))
}

fn option_set_artifact(definition: &OptionSetDefinition, resolver: &mut TypeNameResolver) -> Result<Artifact> {
    let names = OptionSetNames {
        type_name: resolver.resolve_option_set(definition)?,
        members: option_member_names(&definition.options),
    };
    Ok(render_option_set(definition, &names))
}

fn action_artifact(action: &Action, resolver: &mut TypeNameResolver) -> Result<Artifact> {
    let names = ActionRenderNames {
        types: resolver.resolve_action(action)?,
        members: parameter_member_names(action)?,
    };
    Ok(render_action(action, &names))
}

/// Generate every artifact for `config` and write it to `store`.
///
/// # Example
///
/// ```rust,no_run
/// use earlybound::codegen::{generate_all_from_config, load_adapter, DiskStore, EntityGroup, GenerationConfig};
///
/// let adapter = load_adapter("metadata.yaml").unwrap();
/// let config = GenerationConfig {
///     groups: vec![EntityGroup {
///         entities: vec!["socialprofile".to_string()],
///         emit_option_set_enums: true,
///         ..EntityGroup::default()
///     }],
/// };
///
/// generate_all_from_config(&config, &adapter, &mut DiskStore).unwrap();
/// ```
pub fn generate_all_from_config<A, S>(
    config: &GenerationConfig,
    adapter: &A,
    store: &mut S,
) -> Result<GenerationReport>
where
    A: MetadataAdapter + ?Sized,
    S: ArtifactStore + ?Sized,
{
    GenerationOrchestrator::new(config, adapter).run(store)
}
