use std::collections::BTreeSet;
use std::ops::Index;

use crate::ids::CommitRef;

/// Commits reachable from head but not from base, oldest first.
///
/// Positional by construction: slot rules index into it, so it stays a
/// sequence and is never collapsed into a set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitRange {
    commits: Vec<CommitRef>,
}

impl CommitRange {
    /// Builds a range from an oldest-first list, dropping repeated entries
    /// while keeping the first occurrence's position.
    pub fn new(commits: Vec<CommitRef>) -> Self {
        let mut seen = BTreeSet::new();
        let commits = commits.into_iter().filter(|c| seen.insert(c.clone())).collect();
        Self { commits }
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommitRef> {
        self.commits.iter()
    }

    pub fn as_slice(&self) -> &[CommitRef] {
        &self.commits
    }
}

impl Index<usize> for CommitRange {
    type Output = CommitRef;

    fn index(&self, index: usize) -> &CommitRef {
        &self.commits[index]
    }
}

impl<'a> IntoIterator for &'a CommitRange {
    type Item = &'a CommitRef;
    type IntoIter = std::slice::Iter<'a, CommitRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.iter()
    }
}

/// Immediate parents of a commit, first parent first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParentSet(pub Vec<CommitRef>);

impl ParentSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&CommitRef> {
        self.0.first()
    }

    pub fn is_merge(&self) -> bool {
        self.0.len() >= 2
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// Paths that differ between a commit and its first parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangedPathSet(pub BTreeSet<String>);

impl ChangedPathSet {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the set holds `path` and nothing else.
    pub fn is_exactly(&self, path: &str) -> bool {
        self.0.len() == 1 && self.0.contains(path)
    }
}

impl std::fmt::Display for ChangedPathSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(no files)");
        }
        let joined = self.0.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> CommitRef {
        CommitRef::from_str(s)
    }

    #[test]
    fn range_dedups_and_keeps_order() {
        let range = CommitRange::new(vec![c("a"), c("b"), c("a"), c("c")]);
        assert_eq!(range.as_slice(), &[c("a"), c("b"), c("c")]);
        assert_eq!(range[1], c("b"));
    }

    #[test]
    fn exact_path_match() {
        let only = ChangedPathSet::from_paths(["frontend/index.html"]);
        assert!(only.is_exactly("frontend/index.html"));

        let extra = ChangedPathSet::from_paths(["frontend/index.html", "other.txt"]);
        assert!(!extra.is_exactly("frontend/index.html"));

        assert!(!ChangedPathSet::default().is_exactly("frontend/index.html"));
    }

    #[test]
    fn parent_set_shapes() {
        assert!(ParentSet(vec![c("a"), c("b")]).is_merge());
        assert!(!ParentSet(vec![c("a")]).is_merge());
        assert!(ParentSet::default().is_root());
    }

    #[test]
    fn changed_paths_display() {
        assert_eq!(ChangedPathSet::default().to_string(), "(no files)");
        let set = ChangedPathSet::from_paths(["b.txt", "a.txt"]);
        assert_eq!(set.to_string(), "a.txt, b.txt");
    }
}
