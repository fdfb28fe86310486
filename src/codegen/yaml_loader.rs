//! Metadata snapshot loader.
//!
//! Loads a [`MetadataSnapshot`] from disk. Files ending in `.json` are parsed
//! as JSON; everything else is treated as YAML.

use std::fs;
use std::path::Path;

use crate::codegen::error::{GenerationError, Result};
use crate::codegen::metadata::{MetadataSnapshot, SnapshotAdapter};

/// Load a metadata snapshot from a YAML or JSON file
///
/// # Example
///
/// ```ignore
/// use earlybound::codegen::load_snapshot;
///
/// let snapshot = load_snapshot("config/examples/social/metadata.yaml").unwrap();
/// ```
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<MetadataSnapshot> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path).map_err(|e| GenerationError::Snapshot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&contents).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| GenerationError::Snapshot {
        path: path.to_path_buf(),
        reason,
    })
}

/// Load a snapshot and build an adapter over it
pub fn load_adapter<P: AsRef<Path>>(path: P) -> Result<SnapshotAdapter> {
    let snapshot = load_snapshot(path.as_ref())?;
    tracing::debug!(
        "Loaded {} entities, {} option sets, {} actions from {}",
        snapshot.entities.len(),
        snapshot.option_sets.len(),
        snapshot.actions.len(),
        path.as_ref().display()
    );
    SnapshotAdapter::new(snapshot)
}
