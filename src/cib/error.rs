//! Error kinds raised while obtaining a CIB or querying the decoded model.
//!
//! Malformed sub-elements inside an otherwise readable document are not
//! errors; the decoder skips them.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CibError {
    /// The CIB file could not be read or is not well-formed XML.
    #[error("could not read CIB from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The query command failed to run, exited non-zero or printed nothing.
    #[error("could not get CIB using {command}: {stderr}")]
    ExternalCommand { command: String, stderr: String },

    /// The obtained bytes held no parseable element.
    #[error("CIB from {origin} is empty or unparseable")]
    EmptyDocument { origin: String },

    #[error("node \"{node}\" was not found")]
    NodeNotFound { node: String },

    #[error("resource \"{resource}\" was not found on node \"{node}\"")]
    ResourceNotFound { node: String, resource: String },
}

impl CibError {
    /// True for query-time lookup misses, false for load failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CibError::NodeNotFound { .. } | CibError::ResourceNotFound { .. }
        )
    }
}
