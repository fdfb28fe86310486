//! Code generation framework for early-bound types.
//!
//! This module turns platform metadata (entities, option sets, actions) into
//! C# source, honoring per-group configuration for scope, shape and layout.

pub mod types;
pub mod error;
pub mod metadata;
pub mod yaml_loader;
pub mod utils;
pub mod naming;
pub mod optionset_registry;
pub mod csharp_codegen;
pub mod output_planner;
pub mod fs_utils;
pub mod orchestration;
pub mod project_config;

// Re-export key types
pub use types::{
    Action, ActionParameter, Attribute, AttributeType, Entity, OptionSetDefinition,
    OptionSetScope, OptionValue, ParameterDirection,
};
pub use error::{GenerationError, Result};
pub use metadata::{MetadataAdapter, MetadataSnapshot, SnapshotAdapter};
pub use yaml_loader::{load_adapter, load_snapshot};
pub use naming::TypeNameResolver;
pub use optionset_registry::{OptionSetRegistry, RegistrationOutcome, Sighting};
pub use output_planner::{ArtifactSet, OutputPlanner};
pub use fs_utils::{ArtifactStore, DiskStore, MemoryStore};
pub use orchestration::{
    generate_all_from_config, EntityGroup, GenerationConfig, GenerationOrchestrator,
    GenerationReport, RunState,
};
pub use project_config::ProjectConfig;

/// Generate all code from an earlybound.yaml configuration file
///
/// Group paths are resolved relative to the configuration file's directory.
///
/// # Example
///
/// ```rust,no_run
/// fn main() {
///     earlybound::codegen::generate_from_yaml("earlybound.yaml", "metadata.yaml")
///         .expect("Code generation failed");
/// }
/// ```
pub fn generate_from_yaml(
    config_path: impl AsRef<std::path::Path>,
    metadata_path: impl AsRef<std::path::Path>,
) -> Result<GenerationReport> {
    let config_path = config_path.as_ref();
    tracing::info!("Loading configuration from {}", config_path.display());

    let project = ProjectConfig::from_file(config_path)?;
    project.validate()?;

    let generation_config = project.to_generation_config(config_path.parent(), None)?;
    let adapter = load_adapter(metadata_path)?;

    generate_all_from_config(&generation_config, &adapter, &mut DiskStore)
}
