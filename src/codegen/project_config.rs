//! Project configuration loaded from `earlybound.yaml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::error::{GenerationError, Result};
use crate::codegen::orchestration::{EntityGroup, GenerationConfig, DEFAULT_OUTPUT_FILE_NAME};
use crate::codegen::output_planner::{ACTIONS_FILE, OPTION_SETS_FILE};

/// Top-level `earlybound.yaml` document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Base directory every group's `path` is relative to
    #[serde(default)]
    pub file_path: Option<String>,

    #[serde(default)]
    pub earlyboundtypes: Vec<EarlyBoundTypeConfig>,
}

/// Names given either as a YAML list or a comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Selector {
    List(Vec<String>),
    Csv(String),
}

impl Default for Selector {
    fn default() -> Self {
        Selector::List(Vec::new())
    }
}

impl Selector {
    /// Selected names, trimmed, blanks dropped
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Selector::List(items) => items.iter().map(String::as_str).collect(),
            Selector::Csv(csv) => csv.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

/// One `earlyboundtypes` entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EarlyBoundTypeConfig {
    #[serde(default)]
    pub entities: Selector,

    #[serde(default)]
    pub actions: Selector,

    #[serde(default)]
    pub generate_optionset_enums: bool,

    #[serde(default)]
    pub generate_global_optionsets: bool,

    #[serde(default)]
    pub one_type_per_file: bool,

    #[serde(default = "default_filename")]
    pub filename: String,

    #[serde(default)]
    pub class_namespace: Option<String>,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub profile: Option<String>,
}

fn default_filename() -> String {
    DEFAULT_OUTPUT_FILE_NAME.to_string()
}

fn default_path() -> String {
    ".".to_string()
}

impl ProjectConfig {
    /// Load project configuration from earlybound.yaml
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GenerationError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;

        Self::from_yaml(&contents).map_err(|e| match e {
            GenerationError::Config(reason) => {
                GenerationError::Config(format!("{}: {}", path.as_ref().display(), reason))
            }
            other => other,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| GenerationError::Config(format!("Failed to parse earlybound.yaml: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.earlyboundtypes.is_empty() {
            return Err(GenerationError::Config(
                "earlyboundtypes must contain at least one entry".to_string(),
            ));
        }

        for (index, entry) in self.earlyboundtypes.iter().enumerate() {
            let position = index + 1;

            if entry.entities.is_empty() && entry.actions.is_empty() {
                return Err(GenerationError::Config(format!(
                    "earlyboundtypes entry {} selects no entities or actions",
                    position
                )));
            }

            if entry.filename.trim().is_empty() {
                return Err(GenerationError::Config(format!(
                    "earlyboundtypes entry {} has an empty filename",
                    position
                )));
            }

            if entry.filename.contains(['/', '\\']) {
                return Err(GenerationError::Config(format!(
                    "earlyboundtypes entry {}: filename '{}' must not contain path separators, use path instead",
                    position, entry.filename
                )));
            }

            let reserved = [OPTION_SETS_FILE, ACTIONS_FILE]
                .iter()
                .find(|name| entry.filename.trim().eq_ignore_ascii_case(name));
            if let Some(name) = reserved {
                return Err(GenerationError::Config(format!(
                    "earlyboundtypes entry {}: filename '{}' is reserved for the shared {} file",
                    position, entry.filename, name
                )));
            }

            if let Some(namespace) = &entry.class_namespace {
                let valid = namespace.split('.').all(|part| {
                    part.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
                        && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                });
                if !valid {
                    return Err(GenerationError::Config(format!(
                        "earlyboundtypes entry {}: '{}' is not a valid namespace",
                        position, namespace
                    )));
                }
            }
        }

        Ok(())
    }

    /// Convert to GenerationConfig for code generation
    ///
    /// Group directories resolve as `base_dir / file_path / path`. With a
    /// profile, only entries tagged with that profile are kept.
    pub fn to_generation_config(
        &self,
        base_dir: Option<&Path>,
        profile: Option<&str>,
    ) -> Result<GenerationConfig> {
        let mut root = base_dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        if let Some(file_path) = &self.file_path {
            root = root.join(file_path);
        }

        let groups: Vec<EntityGroup> = self
            .earlyboundtypes
            .iter()
            .filter(|entry| match profile {
                Some(wanted) => entry
                    .profile
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .map(|entry| EntityGroup {
                entities: entry.entities.names(),
                actions: entry.actions.names(),
                emit_option_set_enums: entry.generate_optionset_enums,
                generate_global_option_sets: entry.generate_global_optionsets,
                one_type_per_file: entry.one_type_per_file,
                output_file_name: entry.filename.clone(),
                output_directory: root.join(&entry.path),
                namespace: entry.class_namespace.clone(),
            })
            .collect();

        if groups.is_empty() {
            if let Some(wanted) = profile {
                return Err(GenerationError::Config(format!(
                    "No earlyboundtypes entry uses profile '{}'",
                    wanted
                )));
            }
        }

        Ok(GenerationConfig { groups })
    }
}
