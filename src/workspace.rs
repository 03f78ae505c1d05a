//! Local workspace naming and probing.
//!
//! Each source repository gets one working copy under the configured root:
//!
//! ```text
//! <root>/
//! └── <name>/          # `git clone` target, mutated in place by refreshes
//! ```
//!
//! where `<name>` is the substring of the source reference after its last
//! `/`. The workspace is created by the bootstrap clone and never deleted by
//! this tool.

use std::io;
use std::path::{Path, PathBuf};

/// What the filesystem says about a workspace path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceState {
    /// Nothing exists at the path; a bootstrap clone is needed.
    Absent,
    /// Something exists at the path; treated as a working copy to refresh.
    Present,
}

/// Derives the workspace directory name from a repository reference.
///
/// Takes everything after the last `/`; a reference with no `/` maps to
/// itself. No other URL parsing happens anywhere in this tool.
pub fn repo_name(source: &str) -> &str {
    match source.rfind('/') {
        Some(idx) => &source[idx + 1..],
        None => source,
    }
}

/// Returns the workspace directory for a source reference: `{root}/{name}`.
pub fn workspace_dir(root: &Path, source: &str) -> PathBuf {
    root.join(repo_name(source))
}

/// Stats the workspace path.
///
/// Only `NotFound` means absent. Any other stat failure (permissions, a
/// regular file in the way of a path component) is returned to the caller,
/// who must abort before running any git command.
pub fn probe(path: &Path) -> io::Result<WorkspaceState> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(WorkspaceState::Present),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(WorkspaceState::Absent),
        Err(err) => Err(err),
    }
}
