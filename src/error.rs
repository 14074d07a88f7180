//! Top-level error: every way a command can fail, by kind.

use std::io;

use crate::{
    config::ConfigError,
    publish::PublishError,
    remote::RemoteError,
    tools::{ToolError, ValidationError},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting or credential is missing or unreadable.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The status page lost one of its anchors.
    #[error("{0}")]
    ArtifactFormat(PublishError),

    /// A git step failed mid-publish.
    #[error("{0}")]
    RepositoryState(PublishError),

    /// The remote dispatch endpoint refused or could not be reached.
    #[error("{0}")]
    RemoteCall(RemoteError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::Artifact { .. } => Self::ArtifactFormat(e),
            PublishError::Repository { .. } => Self::RepositoryState(e),
        }
    }
}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Config(e) => Self::Configuration(e),
            other => Self::RemoteCall(other),
        }
    }
}

impl From<ToolError> for Error {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::Validation(e) => Self::Validation(e),
            ToolError::Remote(e) => e.into(),
        }
    }
}
