use std::fmt;

use crate::{ids::*, model::*};

/// Which check produced an outcome. Slots are numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Check {
    CommitCount,
    Slot(usize),
}

impl Check {
    pub fn slot(&self) -> Option<usize> {
        match self {
            Check::CommitCount => None,
            Check::Slot(n) => Some(*n),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::CommitCount => f.write_str("commit count"),
            Check::Slot(n) => write!(f, "slot {n}"),
        }
    }
}

/// What was actually observed when a check failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evidence {
    CommitCount { found: usize, expected: usize },
    Parents { count: usize },
    ChangedPaths(ChangedPathSet),
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::CommitCount { found, expected } => {
                write!(f, "found {found} commit(s), expected {expected}")
            }
            Evidence::Parents { count } => write!(f, "commit has {count} parent(s)"),
            Evidence::ChangedPaths(paths) => write!(f, "changed: {paths}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub check: Check,
    /// Offending commit; `None` for whole-range failures.
    pub commit: Option<CommitRef>,
    pub reason: String,
    pub remedy: String,
    pub evidence: Evidence,
}

impl Violation {
    pub fn is_count_mismatch(&self) -> bool {
        self.check == Check::CommitCount
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    Invalid(Violation),
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            VerificationResult::Valid => None,
            VerificationResult::Invalid(v) => Some(v),
        }
    }

    /// Failing slot number, if a per-slot predicate failed.
    pub fn failed_slot(&self) -> Option<usize> {
        self.violation().and_then(|v| v.check.slot())
    }

    pub fn exit_signal(&self) -> ExitSignal {
        if self.is_valid() {
            ExitSignal::Success
        } else {
            ExitSignal::Failure
        }
    }
}

/// Emitted as each check completes, before the next one starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotEvent {
    Passed {
        check: Check,
        commit: Option<CommitRef>,
        /// One-line description of the commit (subject), when known.
        subject: Option<String>,
        summary: String,
    },
    Failed(Violation),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitSignal {
    Success,
    Failure,
}

impl ExitSignal {
    pub fn code(&self) -> u8 {
        match self {
            ExitSignal::Success => 0,
            ExitSignal::Failure => 1,
        }
    }
}
