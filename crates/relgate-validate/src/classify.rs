use relgate_core::{Check, CommitRange, Evidence, SlotEvent, VerificationResult, Violation};
use relgate_vcs::{RepoQuery, VcsError};

use crate::error::VerifyError;
use crate::resolve::resolve_range;
use crate::rule::{release_rules, RuleOutcome, SlotPaths, SlotRule};

/// Receives each check's outcome as soon as it is known.
pub trait SlotObserver {
    fn on_event(&mut self, event: &SlotEvent);
}

impl SlotObserver for () {
    fn on_event(&mut self, _event: &SlotEvent) {}
}

impl SlotObserver for Vec<SlotEvent> {
    fn on_event(&mut self, event: &SlotEvent) {
        self.push(event.clone());
    }
}

pub fn count_mismatch(found: usize, expected: usize) -> Violation {
    Violation {
        check: Check::CommitCount,
        commit: None,
        reason: "wrong commit count".to_string(),
        remedy: "restructure the branch to exactly three commits: merge, index.html update, checksum update."
            .to_string(),
        evidence: Evidence::CommitCount { found, expected },
    }
}

/// Applies one rule per position and stops at the first failure.
pub struct Classifier {
    rules: Vec<Box<dyn SlotRule>>,
}

impl Classifier {
    pub fn new(rules: Vec<Box<dyn SlotRule>>) -> Self {
        Self { rules }
    }

    pub fn release(paths: &SlotPaths) -> Self {
        Self::new(release_rules(paths))
    }

    pub fn expected_len(&self) -> usize {
        self.rules.len()
    }

    pub fn classify(&self, repo: &dyn RepoQuery, range: &CommitRange) -> Result<VerificationResult, VcsError> {
        self.classify_observed(repo, range, &mut ())
    }

    pub fn classify_observed(
        &self,
        repo: &dyn RepoQuery,
        range: &CommitRange,
        observer: &mut dyn SlotObserver,
    ) -> Result<VerificationResult, VcsError> {
        let expected = self.expected_len();
        if range.len() != expected {
            return Ok(fail(observer, count_mismatch(range.len(), expected)));
        }
        observer.on_event(&SlotEvent::Passed {
            check: Check::CommitCount,
            commit: None,
            subject: None,
            summary: format!("{expected} commits"),
        });

        for (idx, (rule, commit)) in self.rules.iter().zip(range.iter()).enumerate() {
            let slot = idx + 1;
            tracing::debug!(slot, rule = rule.id(), %commit, "evaluating slot");
            match rule.eval(repo, commit)? {
                RuleOutcome::Pass { summary } => {
                    let subject = repo.subject(commit)?;
                    observer.on_event(&SlotEvent::Passed {
                        check: Check::Slot(slot),
                        commit: Some(commit.clone()),
                        subject,
                        summary,
                    });
                }
                RuleOutcome::Fail { reason, remedy, evidence } => {
                    let violation = Violation {
                        check: Check::Slot(slot),
                        commit: Some(commit.clone()),
                        reason,
                        remedy,
                        evidence,
                    };
                    return Ok(fail(observer, violation));
                }
            }
        }

        Ok(VerificationResult::Valid)
    }
}

fn fail(observer: &mut dyn SlotObserver, violation: Violation) -> VerificationResult {
    tracing::debug!(check = %violation.check, reason = %violation.reason, "check failed");
    observer.on_event(&SlotEvent::Failed(violation.clone()));
    VerificationResult::Invalid(violation)
}

/// Resolve `base..head` and classify it. An empty range becomes a
/// commit-count violation; unresolvable refs and repository failures are
/// returned as errors.
pub fn verify(
    repo: &dyn RepoQuery,
    classifier: &Classifier,
    base: &str,
    head: &str,
    observer: &mut dyn SlotObserver,
) -> Result<VerificationResult, VerifyError> {
    let range = match resolve_range(repo, base, head) {
        Ok(range) => range,
        Err(VerifyError::EmptyRange { .. }) => {
            return Ok(fail(observer, count_mismatch(0, classifier.expected_len())));
        }
        Err(e) => return Err(e),
    };
    Ok(classifier.classify_observed(repo, &range, observer)?)
}
