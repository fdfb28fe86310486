//! Error taxonomy for a generation run.
//!
//! Every variant is fatal: the orchestrator aborts the whole run on the first
//! error and produces no artifacts.

use std::path::PathBuf;

use thiserror::Error;

use crate::codegen::types::OptionSetScope;

/// Errors that can occur while generating early-bound types
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The metadata source could not resolve a selector
    #[error("Failed to fetch metadata for '{selector}': {reason}")]
    MetadataFetch { selector: String, reason: String },

    /// The same option set identity arrived with two different scopes
    #[error(
        "Option set '{option_set}' was registered as {registered} but later seen as {received}"
    )]
    InconsistentOptionSetScope {
        option_set: String,
        registered: OptionSetScope,
        received: OptionSetScope,
    },

    /// A local option set was referenced by more than one entity
    #[error("Local option set '{option_set}' is owned by '{owner}' but was also referenced by '{other}'")]
    LocalOptionSetShared {
        option_set: String,
        owner: String,
        other: String,
    },

    /// Two distinct identities resolved to the same generated name
    #[error("Generated name '{name}' is claimed by both {existing} and {incoming}")]
    NameCollision {
        name: String,
        existing: String,
        incoming: String,
    },

    /// Writing an artifact to storage failed
    #[error("Failed to write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generation config file is missing, malformed or invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The metadata snapshot file could not be read or parsed
    #[error("Failed to load metadata snapshot {}: {reason}", .path.display())]
    Snapshot { path: PathBuf, reason: String },
}

impl GenerationError {
    pub(crate) fn fetch(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        GenerationError::MetadataFetch {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the generator
pub type Result<T> = std::result::Result<T, GenerationError>;
