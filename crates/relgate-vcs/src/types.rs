use relgate_core::{ChangedPathSet, CommitRef, ParentSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("cannot resolve reference '{0}' to a commit")]
    UnknownRef(String),

    #[error("unknown commit {0}")]
    UnknownCommit(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {program} {args:?}\nstderr:{stderr}")]
    Command {
        program: String,
        args: Vec<String>,
        stderr: String,
    },

    #[error("unexpected output from {what}: {detail}")]
    Malformed { what: String, detail: String },
}

/// Read-only view of repository history needed to verify a release branch.
///
/// Implementations never mutate the repository.
pub trait RepoQuery {
    /// Resolves a symbolic or abbreviated revision to a full commit id.
    fn resolve_ref(&self, reference: &str) -> Result<CommitRef, VcsError>;

    /// Commits reachable from `head` but not from `base`, ancestors first.
    fn commit_range(&self, base: &str, head: &str) -> Result<Vec<CommitRef>, VcsError>;

    fn parents(&self, commit: &CommitRef) -> Result<ParentSet, VcsError>;

    /// Paths changed relative to the first parent (all tracked paths for a root commit).
    fn changed_paths(&self, commit: &CommitRef) -> Result<ChangedPathSet, VcsError>;

    /// One-line description used for trace output only.
    fn subject(&self, _commit: &CommitRef) -> Result<Option<String>, VcsError> {
        Ok(None)
    }
}
