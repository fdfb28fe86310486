//! # Earlybound: early-bound type generation from platform metadata
//!
//! Earlybound turns a snapshot of a data platform's schema (entities,
//! attributes, option sets and actions) into strongly typed C# declarations,
//! so application code can reference entities and choice values as native
//! types instead of strings and integers.
//!
//! ## Features
//!
//! - **Global option set deduplication**: a shared option set is emitted once per run, however many entities reference it
//! - **Per-group configuration**: entity selection, enum emission and file layout are set per `earlyboundtypes` entry
//! - **Two layouts**: one aggregate file per group, or one file per generated type
//! - **Deterministic output**: the same snapshot and config always produce byte-identical files
//!
//! ## Example: earlybound.yaml
//!
//! ```yaml
//! earlyboundtypes:
//!   - entities: socialprofile,socialactivity
//!     generate_optionset_enums: true
//!     filename: entities.cs
//! ```
//!
//! ## Example: metadata snapshot
//!
//! ```yaml
//! entities:
//!   - logical_name: socialprofile
//!     schema_name: SocialProfile
//!     attributes:
//!       - logical_name: community
//!         schema_name: Community
//!         type: Picklist
//!         option_set: socialprofile_community
//! option_sets:
//!   - name: socialprofile_community
//!     scope: global
//!     options:
//!       - { label: Facebook, value: 1 }
//!       - { label: Twitter, value: 2 }
//! ```

// Code generation framework
pub mod codegen;

// Re-export key types
pub use codegen::{
    generate_all_from_config, generate_from_yaml, ArtifactSet, ArtifactStore, DiskStore,
    EntityGroup, GenerationConfig, GenerationError, GenerationOrchestrator, GenerationReport,
    MemoryStore, MetadataAdapter, ProjectConfig, SnapshotAdapter,
};
