//! In-memory [`RepositoryClient`] for workflow tests.
//!
//! Models just enough of git to exercise the publish workflow: a set of
//! local branches, one artifact file per path, a commit log, and pushed
//! branches. Any operation can be told to fail.

use std::collections::{BTreeSet, HashMap};

use super::{CommitOutcome, GitError, IdentityKey, RepositoryClient, Result};

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Identity,
    SetIdentity,
    Sync,
    CreateBranch,
    ReadArtifact,
    WriteArtifact,
    Commit,
    DiscardBranch,
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub branch: String,
    pub message: String,
    pub contents: String,
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    pub identity: HashMap<IdentityKey, String>,
    pub branches: BTreeSet<String>,
    pub current: String,
    /// Working-tree contents by path.
    pub files: HashMap<String, String>,
    /// Contents at `HEAD` by path.
    pub head: HashMap<String, String>,
    pub commits: Vec<Commit>,
    pub pushed: Vec<String>,
    /// Every operation attempted, in order.
    pub calls: Vec<Op>,
    failures: HashMap<Op, String>,
}

impl MemoryRepository {
    /// A repository on `main` holding `artifact` at `path`, committed.
    pub fn with_artifact(path: &str, artifact: &str) -> Self {
        Self {
            branches: BTreeSet::from(["main".to_string()]),
            current: "main".to_string(),
            files: HashMap::from([(path.to_string(), artifact.to_string())]),
            head: HashMap::from([(path.to_string(), artifact.to_string())]),
            ..Self::default()
        }
    }

    /// Make `op` fail with `stderr` from now on.
    pub fn fail(mut self, op: Op, stderr: &str) -> Self {
        self.failures.insert(op, stderr.to_string());
        self
    }

    fn attempt(&mut self, op: Op) -> Result<()> {
        self.calls.push(op);
        match self.failures.get(&op) {
            Some(stderr) => Err(GitError::Command {
                command: format!("{op:?}").to_lowercase(),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl RepositoryClient for MemoryRepository {
    fn identity(&mut self, key: IdentityKey) -> Result<Option<String>> {
        self.attempt(Op::Identity)?;
        Ok(self.identity.get(&key).cloned())
    }

    fn set_identity(&mut self, key: IdentityKey, value: &str) -> Result<()> {
        self.attempt(Op::SetIdentity)?;
        self.identity.insert(key, value.to_string());
        Ok(())
    }

    fn sync(&mut self, _remote: &str, base: &str) -> Result<()> {
        self.attempt(Op::Sync)?;
        self.current = base.to_string();
        self.files.clone_from(&self.head);
        Ok(())
    }

    fn create_branch(&mut self, name: &str) -> Result<()> {
        self.attempt(Op::CreateBranch)?;
        if !self.branches.insert(name.to_string()) {
            return Err(GitError::BranchExists(name.to_string()));
        }
        self.current = name.to_string();
        Ok(())
    }

    fn read_artifact(&mut self, path: &str) -> Result<String> {
        self.attempt(Op::ReadArtifact)?;
        self.files.get(path).cloned().ok_or_else(|| GitError::Io {
            path: path.into(),
            source: std::io::ErrorKind::NotFound.into(),
        })
    }

    fn write_artifact(&mut self, path: &str, contents: &str) -> Result<()> {
        self.attempt(Op::WriteArtifact)?;
        self.files.insert(path.to_string(), contents.to_string());
        Ok(())
    }

    fn commit(&mut self, path: &str, message: &str) -> Result<CommitOutcome> {
        self.attempt(Op::Commit)?;
        let contents = self.files.get(path).cloned().unwrap_or_default();
        if self.head.get(path) == Some(&contents) {
            return Ok(CommitOutcome::NothingToCommit);
        }
        self.head.insert(path.to_string(), contents.clone());
        self.commits.push(Commit {
            branch: self.current.clone(),
            message: message.to_string(),
            contents,
        });
        Ok(CommitOutcome::Committed {
            sha: format!("{:040x}", self.commits.len()),
        })
    }

    fn discard_branch(&mut self, base: &str, name: &str) -> Result<()> {
        self.attempt(Op::DiscardBranch)?;
        self.current = base.to_string();
        self.branches.remove(name);
        Ok(())
    }

    fn push(&mut self, _remote: &str, branch: &str) -> Result<()> {
        self.attempt(Op::Push)?;
        self.pushed.push(branch.to_string());
        Ok(())
    }
}
