use relgate_core::CommitRange;
use relgate_vcs::{RepoQuery, VcsError};

use crate::error::VerifyError;

/// Commits on `head` that are not reachable from `base`, oldest first.
///
/// An empty range is reported as [`VerifyError::EmptyRange`] so callers can
/// turn it into a commit-count violation.
pub fn resolve_range(repo: &dyn RepoQuery, base: &str, head: &str) -> Result<CommitRange, VerifyError> {
    let commits = repo.commit_range(base, head).map_err(|e| match e {
        VcsError::UnknownRef(reference) => VerifyError::RefResolution { reference },
        other => VerifyError::Repository(other),
    })?;
    tracing::debug!(base, head, commits = commits.len(), "resolved range");

    let range = CommitRange::new(commits);
    if range.is_empty() {
        return Err(VerifyError::EmptyRange { base: base.to_string(), head: head.to_string() });
    }
    Ok(range)
}
