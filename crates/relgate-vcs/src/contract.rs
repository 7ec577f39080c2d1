use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use relgate_core::{ChangedPathSet, CommitRef};

use crate::types::{RepoQuery, VcsError};

pub const BASE_REF: &str = "main";
pub const HEAD_REF: &str = "release";
pub const INDEX_HTML: &str = "frontend/index.html";
pub const CHECKSUMS: &str = "CHECKSUMS.json";
pub const APP_SOURCE: &str = "src/app.js";

/// One commit added to the release branch by a fixture builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchStep {
    /// Advance `main` by one upstream commit touching `src/app.js`, then
    /// merge it into the release branch with `--no-ff`.
    MergeBase,
    /// Rewrite each listed path with fresh content.
    Touch(Vec<String>),
    /// Commit with no changes.
    Empty,
}

impl BranchStep {
    pub fn touch(paths: &[&str]) -> Self {
        BranchStep::Touch(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Merge, index.html regeneration, checksum regeneration.
pub fn standard_release_steps() -> Vec<BranchStep> {
    vec![
        BranchStep::MergeBase,
        BranchStep::touch(&[INDEX_HTML]),
        BranchStep::touch(&[CHECKSUMS]),
    ]
}

/// Ids produced by a fixture builder.
///
/// Both `main` and `release` start at `root`; `main` only moves when a
/// [`BranchStep::MergeBase`] step runs.
#[derive(Clone, Debug)]
pub struct ReleaseFixture {
    pub base_ref: String,
    pub head_ref: String,
    pub root: CommitRef,
    /// Upstream commits created on `main`, one per merge step.
    pub upstream: Vec<CommitRef>,
    /// Release branch commits, one per step, oldest first.
    pub commits: Vec<CommitRef>,
}

/// Shared adapter contract suite. Expects a fixture built from
/// [`standard_release_steps`] and runs against any [`RepoQuery`].
pub fn run_query_contract_suite(query: &dyn RepoQuery, fixture: &ReleaseFixture) -> Result<()> {
    if fixture.commits.len() != 3 || fixture.upstream.len() != 1 {
        return Err(anyhow!("contract suite needs the standard release fixture"));
    }
    let merge = &fixture.commits[0];
    let index = &fixture.commits[1];
    let checksums = &fixture.commits[2];

    let head = query.resolve_ref(&fixture.head_ref)?;
    if &head != checksums {
        return Err(anyhow!("head resolved to {head}, expected {checksums}"));
    }

    let range = query.commit_range(&fixture.base_ref, &fixture.head_ref)?;
    if range != fixture.commits {
        return Err(anyhow!("range mismatch: got {:?}, expected {:?}", range, fixture.commits));
    }

    // From the root the merged-in upstream commit shows up too, before the merge.
    let from_root = query.commit_range(fixture.root.as_str(), &fixture.head_ref)?;
    let mut expected = fixture.upstream.clone();
    expected.extend(fixture.commits.iter().cloned());
    if from_root != expected {
        return Err(anyhow!("range from root mismatch: got {:?}, expected {:?}", from_root, expected));
    }

    // Everything on base is already merged into head.
    let reverse = query.commit_range(&fixture.head_ref, &fixture.base_ref)?;
    if !reverse.is_empty() {
        return Err(anyhow!("expected empty reverse range, got {:?}", reverse));
    }

    let empty = query.commit_range(&fixture.head_ref, &fixture.head_ref)?;
    if !empty.is_empty() {
        return Err(anyhow!("expected empty range for head..head, got {:?}", empty));
    }

    let parents = query.parents(merge)?;
    if parents.len() != 2 || parents.first() != Some(&fixture.root) {
        return Err(anyhow!("merge parents mismatch: {:?}", parents));
    }
    if query.parents(index)?.0 != vec![merge.clone()] {
        return Err(anyhow!("index commit should have the merge as its only parent"));
    }
    if !query.parents(&fixture.root)?.is_root() {
        return Err(anyhow!("root commit should have no parents"));
    }

    expect_paths(query, merge, &[APP_SOURCE])?;
    expect_paths(query, index, &[INDEX_HTML])?;
    expect_paths(query, checksums, &[CHECKSUMS])?;
    expect_paths(query, &fixture.root, &[APP_SOURCE, CHECKSUMS, INDEX_HTML])?;

    match query.commit_range("no-such-ref", &fixture.head_ref) {
        Err(VcsError::UnknownRef(r)) if r == "no-such-ref" => {}
        other => return Err(anyhow!("expected UnknownRef, got {:?}", other)),
    }

    Ok(())
}

fn expect_paths(query: &dyn RepoQuery, commit: &CommitRef, expected: &[&str]) -> Result<()> {
    let got = query.changed_paths(commit)?;
    let want = ChangedPathSet::from_paths(expected.iter().copied());
    if got != want {
        return Err(anyhow!("changed paths of {commit}: got [{got}], expected [{want}]"));
    }
    Ok(())
}

/// Initialize a git repo on branch `main` with one commit holding the
/// three tracked fixture files.
pub fn init_git_repo(dir: &Path) -> Result<CommitRef> {
    git(dir, &["init", "-q"])?;
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(dir, &["config", "user.email", "relgate@example.com"])?;
    git(dir, &["config", "user.name", "relgate"])?;
    git(dir, &["config", "commit.gpgsign", "false"])?;
    for path in [INDEX_HTML, CHECKSUMS, APP_SOURCE] {
        write_file(dir, path, &format!("{path} initial\n"))?;
    }
    git(dir, &["add", "-A"])?;
    git(dir, &["commit", "-q", "-m", "initial import"])?;
    Ok(CommitRef::from_str(git(dir, &["rev-parse", "HEAD"])?))
}

/// Build `main` and `release` in a fresh repo at `dir`, then apply `steps`
/// to `release`. Leaves `release` checked out.
pub fn build_release_branch(dir: &Path, steps: &[BranchStep]) -> Result<ReleaseFixture> {
    let root = init_git_repo(dir)?;
    git(dir, &["branch", HEAD_REF])?;
    git(dir, &["checkout", "-q", HEAD_REF])?;

    let mut upstream = Vec::new();
    let mut commits = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        let n = i + 1;
        match step {
            BranchStep::MergeBase => {
                git(dir, &["checkout", "-q", BASE_REF])?;
                write_file(dir, APP_SOURCE, &format!("{APP_SOURCE} upstream {n}\n"))?;
                git(dir, &["commit", "-q", "-am", &format!("upstream change {n}")])?;
                upstream.push(CommitRef::from_str(git(dir, &["rev-parse", "HEAD"])?));
                git(dir, &["checkout", "-q", HEAD_REF])?;
                git(dir, &["merge", "-q", "--no-ff", "--no-edit", "-m", "Merge main into release", BASE_REF])?;
            }
            BranchStep::Touch(paths) => {
                for path in paths {
                    write_file(dir, path, &format!("{path} step {n}\n"))?;
                }
                git(dir, &["add", "-A"])?;
                git(dir, &["commit", "-q", "-m", &format!("touch {}", paths.join(" "))])?;
            }
            BranchStep::Empty => {
                git(dir, &["commit", "-q", "--allow-empty", "-m", "empty"])?;
            }
        }
        commits.push(CommitRef::from_str(git(dir, &["rev-parse", "HEAD"])?));
    }

    Ok(ReleaseFixture {
        base_ref: BASE_REF.to_string(),
        head_ref: HEAD_REF.to_string(),
        root,
        upstream,
        commits,
    })
}

fn write_file(dir: &Path, rel: &str, contents: &str) -> Result<()> {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Run git in `dir` and return trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("run git {:?}", args))?;
    if !out.status.success() {
        return Err(anyhow!(
            "command failed: git {:?}\nstdout:{}\nstderr:{}",
            args,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}
