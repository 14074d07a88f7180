//! [`RepositoryClient`] backed by the `git` binary.

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use super::{CommitOutcome, GitError, IdentityKey, RepositoryClient, Result};

/// Runs `git` inside a fixed working directory.
pub struct GitCli {
    workdir: PathBuf,
    /// Extra environment for every git invocation.
    envs: Vec<(&'static str, &'static str)>,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            envs: Vec::new(),
        }
    }

    /// Ignore global and system git config, so only the repository's own
    /// settings are visible.
    #[cfg(test)]
    fn isolated(mut self) -> Self {
        self.envs.push(("GIT_CONFIG_GLOBAL", "/dev/null"));
        self.envs.push(("GIT_CONFIG_NOSYSTEM", "1"));
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run git and hand back the raw output, whatever the exit status.
    fn run(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(command = %args.join(" "), "git");
        Command::new("git")
            .args(args)
            .envs(self.envs.iter().copied())
            .current_dir(&self.workdir)
            .output()
            .map_err(GitError::Spawn)
    }

    /// Run git and return its stdout, failing on a non-zero exit.
    fn git(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(command_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn artifact_path(&self, path: &str) -> PathBuf {
        self.workdir.join(path)
    }
}

impl RepositoryClient for GitCli {
    fn identity(&mut self, key: IdentityKey) -> Result<Option<String>> {
        let args = ["config", "--get", key.config_key()];
        let output = self.run(&args)?;

        // `git config --get` exits 1 when the key is unset; anything else
        // non-zero is a real failure.
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(value).filter(|v| !v.is_empty()))
            }
            Some(1) => Ok(None),
            _ => Err(command_failed(&args, &output)),
        }
    }

    fn set_identity(&mut self, key: IdentityKey, value: &str) -> Result<()> {
        self.git(&["config", key.config_key(), value])?;
        Ok(())
    }

    fn sync(&mut self, remote: &str, base: &str) -> Result<()> {
        let upstream = format!("{remote}/{base}");
        self.git(&["fetch", remote, base])?;
        self.git(&["checkout", base])?;
        self.git(&["reset", "--hard", &upstream])?;
        Ok(())
    }

    fn create_branch(&mut self, name: &str) -> Result<()> {
        let local_ref = format!("refs/heads/{name}");
        let probe = self.run(&["rev-parse", "--verify", "--quiet", &local_ref])?;
        if probe.status.success() {
            return Err(GitError::BranchExists(name.to_string()));
        }

        self.git(&["checkout", "-b", name])?;
        Ok(())
    }

    fn read_artifact(&mut self, path: &str) -> Result<String> {
        let path = self.artifact_path(path);
        fs::read_to_string(&path).map_err(|source| GitError::Io { path, source })
    }

    fn write_artifact(&mut self, path: &str, contents: &str) -> Result<()> {
        let path = self.artifact_path(path);
        fs::write(&path, contents).map_err(|source| GitError::Io { path, source })
    }

    fn commit(&mut self, path: &str, message: &str) -> Result<CommitOutcome> {
        self.git(&["add", "--", path])?;

        // Exit 0 means the staged file matches HEAD.
        let args = ["diff", "--cached", "--quiet", "--", path];
        let diff = self.run(&args)?;
        match diff.status.code() {
            Some(0) => return Ok(CommitOutcome::NothingToCommit),
            Some(1) => {}
            _ => return Err(command_failed(&args, &diff)),
        }

        self.git(&["commit", "-m", message])?;
        let sha = self.git(&["rev-parse", "HEAD"])?;

        Ok(CommitOutcome::Committed {
            sha: sha.trim().to_string(),
        })
    }

    fn discard_branch(&mut self, base: &str, name: &str) -> Result<()> {
        self.git(&["checkout", base])?;
        self.git(&["branch", "-D", name])?;
        Ok(())
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["push", "-u", remote, branch])?;
        Ok(())
    }
}

fn command_failed(args: &[&str], output: &Output) -> GitError {
    GitError::Command {
        command: args.join(" "),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
