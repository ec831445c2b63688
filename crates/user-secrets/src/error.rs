//! Errors raised while resolving a project's secrets store

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Everything that can abort a resolve
#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("{}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest XML: {0}")]
    Parse(String),

    #[error("{0}")]
    Structure(String),

    #[error("Invalid UserSecretsId '{0}': must name a single directory")]
    InvalidId(String),

    #[error("Manifest changed while it was being updated: {}", .0.display())]
    Conflict(PathBuf),

    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("{0}")]
    ManifestDiscovery(String),

    #[error("Failed to launch editor '{editor}'")]
    Editor {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{editor}' exited with {status}")]
    EditorStatus { editor: String, status: ExitStatus },
}

impl SecretsError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SecretsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SecretsError>;
