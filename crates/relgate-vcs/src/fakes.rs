//! In-memory [`RepoQuery`] with a query log, for tests that need to assert
//! which commits were (or were not) inspected.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use relgate_core::{ChangedPathSet, CommitRef, ParentSet};

use crate::contract::{BranchStep, ReleaseFixture, APP_SOURCE, BASE_REF, CHECKSUMS, HEAD_REF, INDEX_HTML};
use crate::types::{RepoQuery, VcsError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    ResolveRef(String),
    Range { base: String, head: String },
    Parents(CommitRef),
    ChangedPaths(CommitRef),
    Subject(CommitRef),
}

#[derive(Clone, Debug)]
struct FakeCommit {
    parents: Vec<CommitRef>,
    changed: ChangedPathSet,
    subject: String,
}

/// Commits must be added parents-first; insertion order doubles as the
/// topological order reported by [`RepoQuery::commit_range`].
#[derive(Debug, Default)]
pub struct FakeRepo {
    commits: BTreeMap<CommitRef, FakeCommit>,
    order: Vec<CommitRef>,
    refs: BTreeMap<String, CommitRef>,
    log: RefCell<Vec<Query>>,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, id: &str, parents: &[&str], changed: &[&str]) -> CommitRef {
        self.commit_with_subject(id, parents, changed, id)
    }

    pub fn commit_with_subject(&mut self, id: &str, parents: &[&str], changed: &[&str], subject: &str) -> CommitRef {
        let commit = CommitRef::from_str(id);
        let entry = FakeCommit {
            parents: parents.iter().map(|p| CommitRef::from_str(*p)).collect(),
            changed: ChangedPathSet::from_paths(changed.iter().copied()),
            subject: subject.to_string(),
        };
        if self.commits.insert(commit.clone(), entry).is_none() {
            self.order.push(commit.clone());
        }
        commit
    }

    pub fn set_ref(&mut self, name: &str, id: &str) {
        self.refs.insert(name.to_string(), CommitRef::from_str(id));
    }

    /// In-memory twin of [`crate::contract::build_release_branch`].
    pub fn with_branch(steps: &[BranchStep]) -> (Self, ReleaseFixture) {
        let mut repo = Self::new();
        let root = repo.commit_with_subject("root", &[], &[INDEX_HTML, CHECKSUMS, APP_SOURCE], "initial import");
        let mut main_tip = root.clone();
        let mut tip = root.clone();
        let mut upstream = Vec::new();
        let mut commits = Vec::new();

        for (i, step) in steps.iter().enumerate() {
            let n = i + 1;
            let id = format!("step-{n}");
            let commit = match step {
                BranchStep::MergeBase => {
                    let up = repo.commit_with_subject(
                        &format!("upstream-{n}"),
                        &[main_tip.as_str()],
                        &[APP_SOURCE],
                        &format!("upstream change {n}"),
                    );
                    main_tip = up.clone();
                    upstream.push(up);
                    repo.commit_with_subject(
                        &id,
                        &[tip.as_str(), main_tip.as_str()],
                        &[APP_SOURCE],
                        "Merge main into release",
                    )
                }
                BranchStep::Touch(paths) => {
                    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
                    let subject = format!("touch {}", paths.join(" "));
                    repo.commit_with_subject(&id, &[tip.as_str()], &paths, &subject)
                }
                BranchStep::Empty => repo.commit_with_subject(&id, &[tip.as_str()], &[], "empty"),
            };
            tip = commit.clone();
            commits.push(commit);
        }

        repo.set_ref(BASE_REF, main_tip.as_str());
        repo.set_ref(HEAD_REF, tip.as_str());
        repo.set_ref("HEAD", tip.as_str());

        let fixture = ReleaseFixture {
            base_ref: BASE_REF.to_string(),
            head_ref: HEAD_REF.to_string(),
            root,
            upstream,
            commits,
        };
        (repo, fixture)
    }

    pub fn queries(&self) -> Vec<Query> {
        self.log.borrow().clone()
    }

    pub fn clear_queries(&self) {
        self.log.borrow_mut().clear();
    }

    /// True if parents, paths or subject of `commit` were asked for.
    pub fn was_inspected(&self, commit: &CommitRef) -> bool {
        self.log.borrow().iter().any(|q| match q {
            Query::Parents(c) | Query::ChangedPaths(c) | Query::Subject(c) => c == commit,
            _ => false,
        })
    }

    fn record(&self, q: Query) {
        self.log.borrow_mut().push(q);
    }

    fn lookup(&self, reference: &str) -> Result<CommitRef, VcsError> {
        if let Some(c) = self.refs.get(reference) {
            return Ok(c.clone());
        }
        let direct = CommitRef::from_str(reference);
        if self.commits.contains_key(&direct) {
            return Ok(direct);
        }
        Err(VcsError::UnknownRef(reference.to_string()))
    }

    fn entry(&self, commit: &CommitRef) -> Result<&FakeCommit, VcsError> {
        self.commits
            .get(commit)
            .ok_or_else(|| VcsError::UnknownCommit(commit.to_string()))
    }

    fn ancestors(&self, start: &CommitRef) -> BTreeSet<CommitRef> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![start.clone()];
        while let Some(c) = stack.pop() {
            if !seen.insert(c.clone()) {
                continue;
            }
            if let Some(entry) = self.commits.get(&c) {
                stack.extend(entry.parents.iter().cloned());
            }
        }
        seen
    }
}

impl RepoQuery for FakeRepo {
    fn resolve_ref(&self, reference: &str) -> Result<CommitRef, VcsError> {
        self.record(Query::ResolveRef(reference.to_string()));
        self.lookup(reference)
    }

    fn commit_range(&self, base: &str, head: &str) -> Result<Vec<CommitRef>, VcsError> {
        self.record(Query::Range { base: base.to_string(), head: head.to_string() });
        let base = self.lookup(base)?;
        let head = self.lookup(head)?;
        let excluded = self.ancestors(&base);
        let included = self.ancestors(&head);
        Ok(self
            .order
            .iter()
            .filter(|c| included.contains(*c) && !excluded.contains(*c))
            .cloned()
            .collect())
    }

    fn parents(&self, commit: &CommitRef) -> Result<ParentSet, VcsError> {
        self.record(Query::Parents(commit.clone()));
        Ok(ParentSet(self.entry(commit)?.parents.clone()))
    }

    fn changed_paths(&self, commit: &CommitRef) -> Result<ChangedPathSet, VcsError> {
        self.record(Query::ChangedPaths(commit.clone()));
        Ok(self.entry(commit)?.changed.clone())
    }

    fn subject(&self, commit: &CommitRef) -> Result<Option<String>, VcsError> {
        self.record(Query::Subject(commit.clone()));
        Ok(Some(self.entry(commit)?.subject.clone()))
    }
}
