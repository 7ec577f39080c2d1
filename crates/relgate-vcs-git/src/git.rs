use std::path::{Path, PathBuf};
use std::process::Command;

use relgate_core::{ChangedPathSet, CommitRef, ParentSet};
use relgate_vcs::{RepoQuery, VcsError};

/// [`RepoQuery`] backed by the `git` binary. Only plumbing commands are
/// used, so user-level diff settings (renames, quoting) do not leak in.
#[derive(Clone, Debug)]
pub struct GitRepo {
    pub repo_root: PathBuf,
    pub program: String,
}

impl GitRepo {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self { repo_root: repo_root.into(), program: "git".to_string() }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn run(&self, args: &[&str]) -> Result<String, VcsError> {
        tracing::debug!(program = %self.program, ?args, "git");
        let out = Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|source| VcsError::Spawn { program: self.program.clone(), source })?;
        if !out.status.success() {
            return Err(VcsError::Command {
                program: self.program.clone(),
                args: args.iter().map(|a| a.to_string()).collect(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    /// `git --version`, e.g. "git version 2.43.0".
    pub fn version(&self) -> Result<String, VcsError> {
        Ok(self.run(&["--version"])?.trim().to_string())
    }

    /// Top of the work tree containing `repo_root`.
    pub fn toplevel(&self) -> Result<PathBuf, VcsError> {
        let out = self.run(&["rev-parse", "--show-toplevel"])?;
        let top = out.trim_end_matches(['\n', '\r']);
        if top.is_empty() {
            return Err(VcsError::Malformed {
                what: "git rev-parse --show-toplevel".to_string(),
                detail: "empty output".to_string(),
            });
        }
        Ok(PathBuf::from(top))
    }

    pub fn is_work_tree(&self) -> bool {
        matches!(
            self.run(&["rev-parse", "--is-inside-work-tree"]),
            Ok(out) if out.trim() == "true"
        )
    }
}

impl RepoQuery for GitRepo {
    fn resolve_ref(&self, reference: &str) -> Result<CommitRef, VcsError> {
        // A leading dash would be parsed as an option.
        if reference.is_empty() || reference.starts_with('-') {
            return Err(VcsError::UnknownRef(reference.to_string()));
        }
        let spec = format!("{reference}^{{commit}}");
        match self.run(&["rev-parse", "--verify", "--quiet", &spec]) {
            Ok(out) => {
                let sha = out.trim();
                if sha.is_empty() {
                    return Err(VcsError::UnknownRef(reference.to_string()));
                }
                Ok(CommitRef::from_str(sha))
            }
            // --quiet keeps stderr empty for unknown names; anything else is a real failure.
            Err(VcsError::Command { stderr, .. }) if stderr.is_empty() => {
                Err(VcsError::UnknownRef(reference.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn commit_range(&self, base: &str, head: &str) -> Result<Vec<CommitRef>, VcsError> {
        let base = self.resolve_ref(base)?;
        let head = self.resolve_ref(head)?;
        let spec = format!("{base}..{head}");
        let out = self.run(&["rev-list", "--topo-order", "--reverse", &spec])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(CommitRef::from_str)
            .collect())
    }

    fn parents(&self, commit: &CommitRef) -> Result<ParentSet, VcsError> {
        let out = self.run(&["rev-list", "--parents", "-n", "1", commit.as_str()])?;
        let mut ids = out.split_whitespace();
        match ids.next() {
            Some(first) if first == commit.as_str() => {}
            _ => {
                return Err(VcsError::Malformed {
                    what: "git rev-list --parents".to_string(),
                    detail: format!("expected line starting with {commit}, got {:?}", out.trim()),
                })
            }
        }
        Ok(ParentSet(ids.map(CommitRef::from_str).collect()))
    }

    fn changed_paths(&self, commit: &CommitRef) -> Result<ChangedPathSet, VcsError> {
        let parents = self.parents(commit)?;
        let out = match parents.first() {
            Some(first) => self.run(&[
                "diff-tree",
                "-r",
                "--name-only",
                "--no-renames",
                "-z",
                first.as_str(),
                commit.as_str(),
            ])?,
            None => self.run(&[
                "diff-tree",
                "--root",
                "--no-commit-id",
                "-r",
                "--name-only",
                "--no-renames",
                "-z",
                commit.as_str(),
            ])?,
        };
        Ok(parse_nul_separated(&out))
    }

    fn subject(&self, commit: &CommitRef) -> Result<Option<String>, VcsError> {
        let out = self.run(&["cat-file", "commit", commit.as_str()])?;
        Ok(parse_subject(&out))
    }
}

/// Subject of a raw commit object: the first paragraph of the message,
/// folded onto one line. Headers end at the first blank line; continuation
/// lines of multi-line headers (signatures) start with a space and are
/// never blank.
fn parse_subject(raw: &str) -> Option<String> {
    let (_, message) = raw.split_once("\n\n")?;
    let subject = message
        .lines()
        .map(str::trim)
        .take_while(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!subject.is_empty()).then_some(subject)
}

fn parse_nul_separated(out: &str) -> ChangedPathSet {
    ChangedPathSet::from_paths(out.split('\0').filter(|p| !p.is_empty()))
}
