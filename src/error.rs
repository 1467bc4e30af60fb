use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unified error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Cannot read manifest {}: {message}", .path.display())]
    ManifestRead { path: PathBuf, message: String },

    #[error("Cannot write manifest {}: {message}", .path.display())]
    ManifestWrite { path: PathBuf, message: String },

    #[error("Manifest {} has no '{field}' field", .path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("Version parsing error: {0}")]
    VersionFormat(String),

    #[error("No commit message contains '{marker}'")]
    NoMatchingCommit { marker: String },

    #[error("`{command}` failed with exit code {}: {stderr}", exit_code(.code))]
    ExternalTool {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Cannot update changelog {}: {source}", .path.display())]
    Changelog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Convenience type alias for Results in git-release-flow
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version format error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::VersionFormat(msg.into())
    }

    pub fn manifest_read(path: &Path, msg: impl ToString) -> Self {
        ReleaseError::ManifestRead {
            path: path.to_path_buf(),
            message: msg.to_string(),
        }
    }

    pub fn manifest_write(path: &Path, msg: impl ToString) -> Self {
        ReleaseError::ManifestWrite {
            path: path.to_path_buf(),
            message: msg.to_string(),
        }
    }

    pub fn missing_field(path: &Path, field: impl Into<String>) -> Self {
        ReleaseError::MissingField {
            path: path.to_path_buf(),
            field: field.into(),
        }
    }
}
