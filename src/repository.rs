//! The narrow slice of version control the publish workflow needs.
//!
//! [`RepositoryClient`] is the seam between the workflow and git. The
//! production implementation, [`GitCli`], shells out to the `git` binary in a
//! working directory; tests use an in-memory fake.

mod git;
#[cfg(test)]
pub mod memory;

use std::{fmt, io, path::PathBuf};

pub use git::GitCli;

/// Errors from a single repository operation.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] io::Error),

    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("branch '{0}' already exists")]
    BranchExists(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = core::result::Result<T, GitError>;

/// A committer identity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Name,
    Email,
}

impl IdentityKey {
    /// The git config key.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Name => "user.name",
            Self::Email => "user.email",
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// What a commit attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { sha: String },

    /// The staged artifact matched `HEAD`; no commit was made.
    NothingToCommit,
}

/// Version-control operations over one working tree.
///
/// Paths are relative to the working tree root. The caller is assumed to
/// own the working tree exclusively for as long as it holds the client.
pub trait RepositoryClient {
    /// The configured value for `key`, or `None` when it is unset.
    ///
    /// A lookup that fails for any other reason is an error, not `None`.
    fn identity(&mut self, key: IdentityKey) -> Result<Option<String>>;

    fn set_identity(&mut self, key: IdentityKey, value: &str) -> Result<()>;

    /// Fetch `remote/base`, check out `base`, and hard-reset it to the remote.
    fn sync(&mut self, remote: &str, base: &str) -> Result<()>;

    /// Create `name` from the current `HEAD` and switch to it.
    ///
    /// Fails with [`GitError::BranchExists`] rather than reusing a branch.
    fn create_branch(&mut self, name: &str) -> Result<()>;

    fn read_artifact(&mut self, path: &str) -> Result<String>;

    fn write_artifact(&mut self, path: &str, contents: &str) -> Result<()>;

    /// Stage only `path` and commit it.
    fn commit(&mut self, path: &str, message: &str) -> Result<CommitOutcome>;

    /// Switch back to `base` and delete the local branch `name`.
    fn discard_branch(&mut self, base: &str, name: &str) -> Result<()>;

    /// Push `branch` to `remote` with upstream tracking.
    fn push(&mut self, remote: &str, branch: &str) -> Result<()>;
}
