use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning contracts into generated artifacts.
///
/// Every variant is fatal to the contract being processed and stops the
/// remaining workers of a build.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("contract `{contract}`: {reason}")]
    ContractType { contract: String, reason: String },

    #[error("`{contract}::{method}` is marked {capability} and must take {expected} parameter(s), found {found}")]
    MethodArity {
        contract: String,
        method: String,
        capability: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{contract}::{method}` carries more than one operation marker: {markers}")]
    ConflictingCapability {
        contract: String,
        method: String,
        markers: String,
    },

    #[error("`{contract}::{method}` repeats the {capability} configuration of `{previous}`")]
    DuplicateCapability {
        contract: String,
        method: String,
        previous: String,
        capability: &'static str,
    },

    #[error("column `{column}` in `{method}` has no matching field on entity `{entity}`")]
    SchemaMismatch {
        entity: String,
        method: String,
        column: String,
    },

    #[error("entity `{entity}` has no #[table(..)] marker")]
    MissingTableMarker { entity: String },

    #[error("`{method}`: invalid {key} entry `{entry}` ({reason})")]
    InvalidConfig {
        method: String,
        key: &'static str,
        entry: String,
        reason: &'static str,
    },

    #[error("generated {type_name} does not compile: {message}")]
    Compile { type_name: String, message: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    #[error("invalid module path `{0}`")]
    InvalidPath(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
