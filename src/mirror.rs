//! Mirror synchronization between a source and a destination remote.
//!
//! One invocation drives one pass of the state machine:
//!
//! ```text
//! START → PROBE → { CLONE → DONE }                          # workspace absent
//!               | { PULL → ENSURE_REMOTE → PUSH → DONE }    # workspace present
//! ```
//!
//! Any step transitions straight to failure; there is no rollback and no
//! retry. All state lives in the filesystem workspace and in git's own remote
//! configuration inside it, so re-running after a failed refresh re-enters at
//! PULL and heals transient faults on its own. Divergent histories are a
//! reported failure, not something this tool merges.
//!
//! Two deliberate asymmetries, both preserved from the tool's contract:
//! the bootstrap pass only clones (the first run against a root never
//! pushes), and the `dest` remote's URL is never reconciled once the binding
//! exists, even if the destination argument changes between runs.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runner::{CommandError, CommandRunner};
use crate::workspace::{self, WorkspaceState};

/// Name of the remote binding pointing at the destination repository.
const DEST_REMOTE: &str = "dest";

/// Errors returned by a sync pass. Each git-step variant wraps the underlying
/// command failure, which carries git's captured output.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Stat of the workspace path failed with something other than absence.
    #[error("failed to check workspace {path}: {source}")]
    WorkspaceProbe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The workspace path is not valid UTF-8 and cannot be passed to git.
    #[error("workspace path is not valid UTF-8: {0}")]
    WorkspacePath(PathBuf),
    /// The bootstrap clone failed.
    #[error("failed to clone {repo}: {cause}")]
    Clone {
        repo: String,
        #[source]
        cause: CommandError,
    },
    /// Pulling the branch from origin failed.
    #[error("failed to pull branch {branch} from origin: {cause}")]
    Pull {
        branch: String,
        #[source]
        cause: CommandError,
    },
    /// The remote-existence probe could not run at all. A probe that runs and
    /// exits nonzero means "unbound" and is not an error.
    #[error("failed to probe for the dest remote: {cause}")]
    RemoteProbe {
        #[source]
        cause: CommandError,
    },
    /// Registering the destination remote failed.
    #[error("failed to add the dest remote: {cause}")]
    RemoteAdd {
        #[source]
        cause: CommandError,
    },
    /// Pushing the branch to the destination failed.
    #[error("failed to push branch {branch} to {dest}: {cause}")]
    Push {
        dest: String,
        branch: String,
        #[source]
        cause: CommandError,
    },
}

/// Everything one sync pass needs, constructed once at startup and passed in.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Source repository reference, pulled from as `origin`.
    pub source: String,
    /// Destination repository reference, pushed to as the `dest` remote.
    pub dest: String,
    /// Branch name, used verbatim against both remotes.
    pub branch: String,
    /// Directory holding one workspace per source repository.
    pub root: PathBuf,
}

/// Whether the workspace already carries the destination remote binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteBinding {
    Bound,
    Unbound,
}

/// Drives sync passes through an injected command runner.
pub struct Mirror<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Mirror<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs one pass of the state machine: clone if the workspace is absent,
    /// otherwise pull, ensure the destination remote, and push.
    pub fn sync(&self, config: &MirrorConfig) -> Result<(), MirrorError> {
        let workspace = workspace::workspace_dir(&config.root, &config.source);

        let state = workspace::probe(&workspace).map_err(|source| MirrorError::WorkspaceProbe {
            path: workspace.clone(),
            source,
        })?;

        match state {
            WorkspaceState::Absent => self.clone_repo(config, &workspace),
            WorkspaceState::Present => {
                self.pull(config, &workspace)?;
                self.ensure_dest_remote(config, &workspace)?;
                self.push(config, &workspace)
            }
        }
    }

    /// Bootstrap: clone the source branch into the workspace. The pass ends
    /// here; no pull or push happens on a first run.
    fn clone_repo(&self, config: &MirrorConfig, workspace: &Path) -> Result<(), MirrorError> {
        let target = workspace
            .to_str()
            .ok_or_else(|| MirrorError::WorkspacePath(workspace.to_path_buf()))?;

        self.runner
            .run(
                None,
                "git",
                &["clone", "-b", &config.branch, &config.source, target],
            )
            .map_err(|cause| MirrorError::Clone {
                repo: config.source.clone(),
                cause,
            })?;

        log::info!("cloned {} into {}", config.source, workspace.display());
        Ok(())
    }

    fn pull(&self, config: &MirrorConfig, workspace: &Path) -> Result<(), MirrorError> {
        self.runner
            .run(Some(workspace), "git", &["pull", "origin", &config.branch])
            .map_err(|cause| MirrorError::Pull {
                branch: config.branch.clone(),
                cause,
            })?;

        log::info!(
            "pulled branch {} from {} into {}",
            config.branch,
            config.source,
            workspace.display()
        );
        Ok(())
    }

    /// Registers the destination remote if the workspace does not carry it
    /// yet. Idempotent: an existing binding is left untouched, and its URL is
    /// not reconciled against `config.dest`.
    fn ensure_dest_remote(&self, config: &MirrorConfig, workspace: &Path) -> Result<(), MirrorError> {
        match self.probe_dest_remote(workspace)? {
            RemoteBinding::Bound => Ok(()),
            RemoteBinding::Unbound => {
                self.runner
                    .run(
                        Some(workspace),
                        "git",
                        &["remote", "add", DEST_REMOTE, &config.dest],
                    )
                    .map_err(|cause| MirrorError::RemoteAdd { cause })?;

                log::info!("added {} remote pointing at {}", DEST_REMOTE, config.dest);
                Ok(())
            }
        }
    }

    /// Existence probe for the destination remote. `git remote show` exiting
    /// nonzero means the binding is absent; a probe that never ran is a real
    /// error, not an absent binding.
    fn probe_dest_remote(&self, workspace: &Path) -> Result<RemoteBinding, MirrorError> {
        match self
            .runner
            .run(Some(workspace), "git", &["remote", "show", DEST_REMOTE])
        {
            Ok(_) => Ok(RemoteBinding::Bound),
            Err(CommandError::Failed { .. }) => Ok(RemoteBinding::Unbound),
            Err(cause @ CommandError::Launch { .. }) => Err(MirrorError::RemoteProbe { cause }),
        }
    }

    fn push(&self, config: &MirrorConfig, workspace: &Path) -> Result<(), MirrorError> {
        self.runner
            .run(Some(workspace), "git", &["push", DEST_REMOTE, &config.branch])
            .map_err(|cause| MirrorError::Push {
                dest: config.dest.clone(),
                branch: config.branch.clone(),
                cause,
            })?;

        log::info!(
            "pushed branch {} from {} to {}",
            config.branch,
            workspace.display(),
            config.dest
        );
        Ok(())
    }
}
