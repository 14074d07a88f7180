//! The publish workflow: one run lands one week's status on a fresh branch.
//!
//! A run walks these stages strictly in order:
//!
//! ```text
//! Init → Synced → Branched → Mutated → Committed → Pushed → Done
//! ```
//!
//! Any failure aborts the run where it stands. Nothing is retried and
//! nothing is rolled back: the error names the failing step, the last stage
//! reached, the branch (once there is one), and what is left in the working
//! tree, so a human can pick it up from there.
//!
//! Merging the pushed branch is left to whoever consumes it.

use std::fmt;

use jiff::civil::Date;
use serde::Serialize;

use crate::{
    artifact::{self, ArtifactError, ArtifactUpdate},
    config::PublishConfig,
    repository::{CommitOutcome, GitError, IdentityKey, RepositoryClient},
    schedule,
};

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Synced,
    Branched,
    Mutated,
    Committed,
    Pushed,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The operation that was running when a run aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Identity,
    Sync,
    CreateBranch,
    ReadArtifact,
    WriteArtifact,
    Commit,
    DiscardBranch,
    Push,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identity => "identity setup",
            Self::Sync => "sync",
            Self::CreateBranch => "branch creation",
            Self::ReadArtifact => "artifact read",
            Self::WriteArtifact => "artifact write",
            Self::Commit => "commit",
            Self::DiscardBranch => "branch cleanup",
            Self::Push => "push",
        })
    }
}

/// A run that stopped short of `Done`.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("artifact on branch '{branch}' could not be updated: {source}")]
    Artifact {
        branch: String,
        #[source]
        source: ArtifactError,
    },

    #[error("{step} failed after reaching {reached} ({}): {source}", .reached.leftover(.branch.as_deref()))]
    Repository {
        step: Step,
        reached: Stage,
        branch: Option<String>,
        #[source]
        source: GitError,
    },
}

impl PublishError {
    /// The last stage the run completed.
    pub fn reached(&self) -> Stage {
        match self {
            Self::Artifact { .. } => Stage::Branched,
            Self::Repository { reached, .. } => *reached,
        }
    }

    /// The branch the run created, if it got that far.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Artifact { branch, .. } => Some(branch),
            Self::Repository { branch, .. } => branch.as_deref(),
        }
    }

    /// What the aborted run left behind locally.
    pub fn leftover(&self) -> String {
        self.reached().leftover(self.branch())
    }
}

impl Stage {
    /// The local state a run aborted after this stage leaves behind.
    fn leftover(self, branch: Option<&str>) -> String {
        let branch = branch.unwrap_or("<none>");
        match self {
            Self::Init => "no branch created; working tree may be mid-sync".to_string(),
            Self::Synced => "no branch created".to_string(),
            Self::Branched => {
                format!("branch '{branch}' created locally, artifact not committed")
            }
            Self::Mutated => {
                format!("branch '{branch}' created locally with uncommitted artifact changes")
            }
            Self::Committed => format!("branch '{branch}' committed locally but not pushed"),
            Self::Pushed | Self::Done => format!("branch '{branch}' pushed"),
        }
    }
}

/// Everything a run derives from its inputs before touching the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRecord {
    pub status: bool,
    pub target_date: Date,
    pub branch: String,
    pub commit_message: String,
}

impl PublishRecord {
    /// The record for publishing `status` for the week following `today`.
    #[must_use]
    pub fn for_week(status: bool, today: Date) -> Self {
        let target_date = schedule::next_occurrence(today, schedule::TARGET_WEEKDAY);
        Self {
            status,
            target_date,
            branch: schedule::branch_name(target_date),
            commit_message: format!(
                "Update coffee status for {}",
                schedule::long_form(target_date)
            ),
        }
    }
}

/// How a run that did not abort ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The branch was pushed.
    Published { record: PublishRecord, sha: String },

    /// The page already said this; the empty branch was discarded.
    Unchanged { record: PublishRecord },
}

impl PublishOutcome {
    pub fn record(&self) -> &PublishRecord {
        match self {
            Self::Published { record, .. } | Self::Unchanged { record } => record,
        }
    }

    /// The terminal stage: `Done`, or `Mutated` when there was nothing to push.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Published { .. } => Stage::Done,
            Self::Unchanged { .. } => Stage::Mutated,
        }
    }
}

/// Runs publishes against one repository.
pub struct Publisher<'a, R> {
    config: &'a PublishConfig,
    repo: R,
}

impl<'a, R: RepositoryClient> Publisher<'a, R> {
    pub fn new(config: &'a PublishConfig, repo: R) -> Self {
        Self { config, repo }
    }

    #[cfg(test)]
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Publish `status` for the week following `today`.
    pub fn run(&mut self, status: bool, today: Date) -> Result<PublishOutcome, PublishError> {
        let record = PublishRecord::for_week(status, today);
        tracing::info!(
            status,
            target = %schedule::long_form(record.target_date),
            branch = %record.branch,
            "publishing coffee status"
        );

        // Init → Synced
        self.ensure_identity()
            .map_err(|e| repository_error(Step::Identity, Stage::Init, None, e))?;
        self.repo
            .sync(&self.config.remote, &self.config.base_branch)
            .map_err(|e| repository_error(Step::Sync, Stage::Init, None, e))?;
        tracing::info!(stage = %Stage::Synced, base = %self.config.base_branch, "synced");

        // Synced → Branched
        self.repo
            .create_branch(&record.branch)
            .map_err(|e| repository_error(Step::CreateBranch, Stage::Synced, None, e))?;
        tracing::info!(stage = %Stage::Branched, branch = %record.branch, "branch created");

        // Branched → Mutated
        let branch = Some(record.branch.as_str());
        let current = self
            .repo
            .read_artifact(&self.config.artifact)
            .map_err(|e| repository_error(Step::ReadArtifact, Stage::Branched, branch, e))?;
        let update = ArtifactUpdate {
            status,
            target_date: record.target_date,
            updated_date: today,
        };
        let updated =
            artifact::apply(&current, &update).map_err(|source| PublishError::Artifact {
                branch: record.branch.clone(),
                source,
            })?;
        self.repo
            .write_artifact(&self.config.artifact, &updated)
            .map_err(|e| repository_error(Step::WriteArtifact, Stage::Branched, branch, e))?;
        tracing::info!(stage = %Stage::Mutated, artifact = %self.config.artifact, "artifact updated");

        // Mutated → Committed
        let outcome = self
            .repo
            .commit(&self.config.artifact, &record.commit_message)
            .map_err(|e| repository_error(Step::Commit, Stage::Mutated, branch, e))?;
        let sha = match outcome {
            CommitOutcome::Committed { sha } => sha,
            CommitOutcome::NothingToCommit => {
                tracing::info!(branch = %record.branch, "status unchanged, discarding branch");
                self.repo
                    .discard_branch(&self.config.base_branch, &record.branch)
                    .map_err(|e| {
                        repository_error(Step::DiscardBranch, Stage::Mutated, branch, e)
                    })?;
                return Ok(PublishOutcome::Unchanged { record });
            }
        };
        tracing::info!(stage = %Stage::Committed, %sha, "committed");

        // Committed → Pushed
        self.repo
            .push(&self.config.remote, &record.branch)
            .map_err(|e| repository_error(Step::Push, Stage::Committed, branch, e))?;
        tracing::info!(stage = %Stage::Pushed, branch = %record.branch, "pushed");

        Ok(PublishOutcome::Published { record, sha })
    }

    /// Write the bot identity for each key that is unset, and only those.
    fn ensure_identity(&mut self) -> Result<(), GitError> {
        for key in [IdentityKey::Email, IdentityKey::Name] {
            if self.repo.identity(key)?.is_none() {
                let value = self.config.bot_identity(key);
                tracing::info!(%key, value, "committer identity unset, configuring bot");
                self.repo.set_identity(key, value)?;
            }
        }
        Ok(())
    }
}

fn repository_error(
    step: Step,
    reached: Stage,
    branch: Option<&str>,
    source: GitError,
) -> PublishError {
    PublishError::Repository {
        step,
        reached,
        branch: branch.map(str::to_string),
        source,
    }
}
