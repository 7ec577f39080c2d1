use anyhow::{anyhow, Context, Result};

use relgate_core::CommitRef;
use relgate_vcs::RepoQuery;
use relgate_vcs_git::GitRepo;

#[derive(Debug)]
pub struct DoctorReport {
    pub git_version: String,
    pub base: CommitRef,
    pub head: CommitRef,
}

pub fn doctor(git: &GitRepo, base: &str, head: &str) -> Result<DoctorReport> {
    let git_version = git
        .version()
        .with_context(|| format!("'{}' is not runnable; install git or set git.program", git.program))?;

    if !git.is_work_tree() {
        return Err(anyhow!("{} is not inside a git work tree", git.repo_root().display()));
    }

    let base_id = git.resolve_ref(base).with_context(|| format!("base '{base}'"))?;
    let head_id = git.resolve_ref(head).with_context(|| format!("head '{head}'"))?;

    Ok(DoctorReport { git_version, base: base_id, head: head_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgate_vcs::contract::{build_release_branch, standard_release_steps};
    use tempfile::tempdir;

    #[test]
    fn healthy_repo_passes() {
        let dir = tempdir().unwrap();
        let fixture = build_release_branch(dir.path(), &standard_release_steps()).unwrap();
        let git = GitRepo::new(dir.path());
        let report = doctor(&git, "main", "release").unwrap();
        assert_eq!(report.head, fixture.commits[2]);
        assert!(report.git_version.starts_with("git version"));
        assert!(format!("{report:?}").contains(fixture.commits[2].as_str()));
    }

    #[test]
    fn not_a_repo_fails() {
        let dir = tempdir().unwrap();
        let git = GitRepo::new(dir.path());
        let err = doctor(&git, "main", "HEAD").unwrap_err();
        assert!(err.to_string().contains("not inside a git work tree"));
    }

    #[test]
    fn missing_base_fails() {
        let dir = tempdir().unwrap();
        build_release_branch(dir.path(), &[]).unwrap();
        let git = GitRepo::new(dir.path());
        let err = doctor(&git, "origin/main", "HEAD").unwrap_err();
        assert!(format!("{err:#}").contains("origin/main"));
    }
}
