//! Configuration, built once at startup and passed down by reference.
//!
//! Sources, later wins:
//!
//! 1. Built-in defaults.
//! 2. A TOML file: `--config <path>`, else `~/.sunday-coffee/config.toml`
//!    when it exists.
//! 3. Environment: `GITHUB_OWNER`, `GITHUB_REPO`, `GITHUB_TOKEN`.
//!
//! The access token is only ever taken from the environment.
//!
//! ```toml
//! [publish]
//! artifact = "index.html"
//! base-branch = "main"
//!
//! [remote]
//! owner = "Jherrild"
//! repo = "sunday-coffee"
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::repository::IdentityKey;

/// Errors building or using the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config file found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("GITHUB_TOKEN environment variable is required")]
    MissingToken,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub publish: PublishConfig,
    pub remote: RemoteConfig,
}

/// Settings for the local publish workflow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PublishConfig {
    /// The status page, relative to the working tree root.
    pub artifact: String,
    pub remote: String,
    pub base_branch: String,
    /// Committer identity written only when the repository has none.
    pub bot_name: String,
    pub bot_email: String,
}

impl PublishConfig {
    pub fn bot_identity(&self, key: IdentityKey) -> &str {
        match key {
            IdentityKey::Name => &self.bot_name,
            IdentityKey::Email => &self.bot_email,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            artifact: "index.html".to_string(),
            remote: "origin".to_string(),
            base_branch: "main".to_string(),
            bot_name: "GitHub Actions".to_string(),
            bot_email: "github-actions[bot]@users.noreply.github.com".to_string(),
        }
    }
}

/// Settings for triggering the hosted workflow.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,
    /// Workflow file name under `.github/workflows/`.
    pub workflow: String,
    /// Branch the workflow runs against.
    pub git_ref: String,
    pub api_base: String,
    #[serde(skip)]
    pub token: Option<String>,
}

impl RemoteConfig {
    /// The access token, or [`ConfigError::MissingToken`].
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingToken)
    }

    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.workflow
        )
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: "Jherrild".to_string(),
            repo: "sunday-coffee".to_string(),
            workflow: "update-coffee-status.yml".to_string(),
            git_ref: "main".to_string(),
            api_base: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

impl Config {
    /// Load from file (if any) and the process environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.into())),
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// `~/.sunday-coffee/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sunday-coffee").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.into(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    /// Overlay environment values; empty strings count as unset.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(owner) = get("GITHUB_OWNER") {
            self.remote.owner = owner;
        }
        if let Some(repo) = get("GITHUB_REPO") {
            self.remote.repo = repo;
        }
        self.remote.token = get("GITHUB_TOKEN");
        self
    }
}
