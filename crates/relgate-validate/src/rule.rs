use relgate_core::{CommitRef, Evidence};
use relgate_vcs::{RepoQuery, VcsError};
use serde::{Deserialize, Serialize};

pub const INDEX_HTML: &str = "frontend/index.html";
pub const CHECKSUMS: &str = "CHECKSUMS.json";

pub enum RuleOutcome {
    Pass { summary: String },
    Fail { reason: String, remedy: String, evidence: Evidence },
}

/// Positional contract for one commit of the release branch.
pub trait SlotRule {
    fn id(&self) -> &str;

    fn eval(&self, repo: &dyn RepoQuery, commit: &CommitRef) -> Result<RuleOutcome, VcsError>;
}

/// Passes on any commit with two or more parents. Which branches were
/// merged is not checked.
pub struct MergeCommitRule;

impl SlotRule for MergeCommitRule {
    fn id(&self) -> &str {
        "merge_commit"
    }

    fn eval(&self, repo: &dyn RepoQuery, commit: &CommitRef) -> Result<RuleOutcome, VcsError> {
        let parents = repo.parents(commit)?;
        if parents.is_merge() {
            return Ok(RuleOutcome::Pass {
                summary: format!("merge commit ({} parents)", parents.len()),
            });
        }
        Ok(RuleOutcome::Fail {
            reason: "first commit is not a merge".to_string(),
            remedy: "merge the base-of-truth branch into the release branch as the first commit.".to_string(),
            evidence: Evidence::Parents { count: parents.len() },
        })
    }
}

/// Passes when the first-parent diff touches `path` and nothing else.
pub struct ExactPathRule {
    pub id: String,
    pub path: String,
    pub reason: String,
    pub remedy: String,
}

impl SlotRule for ExactPathRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn eval(&self, repo: &dyn RepoQuery, commit: &CommitRef) -> Result<RuleOutcome, VcsError> {
        let changed = repo.changed_paths(commit)?;
        if changed.is_exactly(&self.path) {
            return Ok(RuleOutcome::Pass {
                summary: format!("touches only {}", self.path),
            });
        }
        Ok(RuleOutcome::Fail {
            reason: self.reason.clone(),
            remedy: self.remedy.clone(),
            evidence: Evidence::ChangedPaths(changed),
        })
    }
}

/// The two designated files of a release branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPaths {
    pub index_html: String,
    pub checksums: String,
}

impl Default for SlotPaths {
    fn default() -> Self {
        Self {
            index_html: INDEX_HTML.to_string(),
            checksums: CHECKSUMS.to_string(),
        }
    }
}

/// Merge, then index.html, then checksums. Order is the slot order.
pub fn release_rules(paths: &SlotPaths) -> Vec<Box<dyn SlotRule>> {
    vec![
        Box::new(MergeCommitRule),
        Box::new(ExactPathRule {
            id: "index_html_only".to_string(),
            path: paths.index_html.clone(),
            reason: "second commit touches wrong files".to_string(),
            remedy: "regenerate the commit-hash-injection commit so it touches only the designated HTML file."
                .to_string(),
        }),
        Box::new(ExactPathRule {
            id: "checksums_only".to_string(),
            path: paths.checksums.clone(),
            reason: "third commit touches wrong files".to_string(),
            remedy: "regenerate the checksum commit so it touches only the checksum manifest.".to_string(),
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgate_core::ChangedPathSet;
    use relgate_vcs::fakes::FakeRepo;

    #[test]
    fn merge_rule_counts_parents_only() {
        let mut repo = FakeRepo::new();
        repo.commit("a", &[], &[]);
        repo.commit("b", &[], &[]);
        let octopus = repo.commit("m", &["a", "b", "a"], &[]);
        let single = repo.commit("s", &["a"], &[]);

        match MergeCommitRule.eval(&repo, &octopus).unwrap() {
            RuleOutcome::Pass { summary } => assert_eq!(summary, "merge commit (3 parents)"),
            RuleOutcome::Fail { .. } => panic!("octopus merge should pass"),
        }
        match MergeCommitRule.eval(&repo, &single).unwrap() {
            RuleOutcome::Fail { evidence, .. } => assert_eq!(evidence, Evidence::Parents { count: 1 }),
            RuleOutcome::Pass { .. } => panic!("single-parent commit should fail"),
        }
    }

    #[test]
    fn exact_path_rule_rejects_superset() {
        let mut repo = FakeRepo::new();
        let c = repo.commit("c", &[], &[INDEX_HTML, "other.txt"]);
        let rules = release_rules(&SlotPaths::default());
        match rules[1].eval(&repo, &c).unwrap() {
            RuleOutcome::Fail { reason, evidence, .. } => {
                assert_eq!(reason, "second commit touches wrong files");
                assert_eq!(
                    evidence,
                    Evidence::ChangedPaths(ChangedPathSet::from_paths([INDEX_HTML, "other.txt"]))
                );
            }
            RuleOutcome::Pass { .. } => panic!("superset should fail"),
        }
    }

    #[test]
    fn custom_paths_flow_into_rules() {
        let mut repo = FakeRepo::new();
        let c = repo.commit("c", &[], &["web/index.html"]);
        let paths = SlotPaths { index_html: "web/index.html".to_string(), checksums: CHECKSUMS.to_string() };
        let rules = release_rules(&paths);
        assert!(matches!(rules[1].eval(&repo, &c).unwrap(), RuleOutcome::Pass { .. }));
        assert_eq!(rules[2].id(), "checksums_only");
    }
}
