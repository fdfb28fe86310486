//! Artifact placement and the in-memory artifact set.
//!
//! The planner decides which file every rendered [`Artifact`] lands in and
//! assembles finished file contents. Nothing touches storage until
//! [`ArtifactSet::flush`] is called.
//!
//! Layouts per group:
//!
//! | Artifact           | Aggregate                  | One type per file             |
//! |--------------------|----------------------------|-------------------------------|
//! | Entity             | `{dir}/{output_file_name}` | `{dir}/Entities/{Type}.cs`    |
//! | Local option set   | `{dir}/{output_file_name}` | `{dir}/OptionSets/{name}.cs`  |
//! | Global option set  | `{dir}/optionsets.cs`      | `{dir}/OptionSets/{name}.cs`  |
//! | Action             | `{dir}/actions.cs`         | `{dir}/Actions/{Type}.cs`     |

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::codegen::csharp_codegen::{render_file, Artifact, ArtifactKind};
use crate::codegen::error::{GenerationError, Result};
use crate::codegen::fs_utils::ArtifactStore;
use crate::codegen::orchestration::EntityGroup;

/// Aggregate file holding global option sets
pub const OPTION_SETS_FILE: &str = "optionsets.cs";
/// Aggregate file holding actions
pub const ACTIONS_FILE: &str = "actions.cs";

pub const ENTITIES_DIR: &str = "Entities";
pub const OPTION_SETS_DIR: &str = "OptionSets";
pub const ACTIONS_DIR: &str = "Actions";

const SOURCE_EXTENSION: &str = "cs";

type Sections = IndexMap<Option<String>, Vec<String>>;

fn type_file_name(type_name: &str) -> String {
    // Verbatim identifiers (`@class`) keep the `@` out of file names
    format!("{}.{}", type_name.trim_start_matches('@'), SOURCE_EXTENSION)
}

/// Collects placed artifacts per file and namespace
#[derive(Debug, Default)]
pub struct OutputPlanner {
    files: IndexMap<PathBuf, Sections>,
}

impl OutputPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// File an artifact belongs in under the group's layout
    pub fn artifact_path(group: &EntityGroup, artifact: &Artifact) -> PathBuf {
        let dir = &group.output_directory;

        if group.one_type_per_file {
            match artifact.kind {
                ArtifactKind::Entity => dir.join(ENTITIES_DIR).join(type_file_name(&artifact.type_name)),
                ArtifactKind::LocalOptionSet | ArtifactKind::GlobalOptionSet => dir
                    .join(OPTION_SETS_DIR)
                    .join(format!("{}.{}", artifact.logical_name, SOURCE_EXTENSION)),
                ArtifactKind::Action => dir.join(ACTIONS_DIR).join(type_file_name(&artifact.type_name)),
            }
        } else {
            match artifact.kind {
                ArtifactKind::Entity | ArtifactKind::LocalOptionSet => {
                    dir.join(&group.output_file_name)
                }
                ArtifactKind::GlobalOptionSet => dir.join(OPTION_SETS_FILE),
                ArtifactKind::Action => dir.join(ACTIONS_FILE),
            }
        }
    }

    /// Place an artifact and return the file it was placed in
    pub fn place(&mut self, group: &EntityGroup, artifact: Artifact) -> PathBuf {
        let path = Self::artifact_path(group, &artifact);
        tracing::debug!(
            "Placing {:?} '{}' in {}",
            artifact.kind,
            artifact.type_name,
            path.display()
        );

        self.files
            .entry(path.clone())
            .or_default()
            .entry(group.namespace.clone())
            .or_default()
            .push(artifact.body);
        path
    }

    /// Render every planned file
    pub fn finish(self) -> ArtifactSet {
        let files = self
            .files
            .into_iter()
            .map(|(path, sections)| {
                let contents = render_file(sections.iter().map(|(namespace, bodies)| {
                    (namespace.as_deref(), bodies.iter().map(String::as_str))
                }));
                (path, contents)
            })
            .collect();

        ArtifactSet { files }
    }
}

/// Finished file contents of one run, in placement order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    files: IndexMap<PathBuf, String>,
}

impl ArtifactSet {
    pub fn files(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .map(|(path, contents)| (path.as_path(), contents.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file to `store`, stopping at the first failure
    pub fn flush<S: ArtifactStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        for (path, contents) in &self.files {
            store
                .write(path, contents)
                .map_err(|source| GenerationError::OutputWrite {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!("Wrote {}", path.display());
        }
        Ok(())
    }

    /// How often each generated type is declared across all files
    ///
    /// Counts top-level `public partial class X` and `public enum X` lines.
    pub fn declaration_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for contents in self.files.values() {
            for name in contents.lines().filter_map(declared_type) {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Type names declared more than once
    pub fn duplicate_declarations(&self) -> Vec<String> {
        self.declaration_counts()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect()
    }
}

fn declared_type(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let rest = line
        .strip_prefix("public partial class ")
        .or_else(|| line.strip_prefix("public enum "))?;
    rest.split(|c: char| c.is_whitespace() || c == '{' || c == ':')
        .next()
        .filter(|name| !name.is_empty())
}
