use std::io::{self, Write};

use relgate_core::{Check, ExitSignal, SlotEvent, VerificationResult, Violation};
use relgate_validate::{SlotObserver, VerifyError};

/// Line-oriented trace writer. Every line is flushed as soon as it is
/// written so progress is visible before a failure.
pub struct Reporter<W: Write> {
    out: W,
    io_error: Option<io::Error>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, io_error: None }
    }

    pub fn header(&mut self, base: &str, head: &str) {
        self.line(&format!("verifying {head} against {base}"));
    }

    /// Final verdict line; returns the exit signal for `result`.
    pub fn finish(&mut self, result: &VerificationResult) -> io::Result<ExitSignal> {
        match result {
            VerificationResult::Valid => self.line("OK: release branch structure is valid"),
            VerificationResult::Invalid(v) => {
                self.line(&format!("FAILED: release branch structure is invalid at {}", v.check))
            }
        }
        self.take_error()?;
        Ok(result.exit_signal())
    }

    pub fn error(&mut self, err: &VerifyError) -> io::Result<()> {
        self.line(&format!("[ERROR] {err}"));
        if let Some(remedy) = err.remedy() {
            self.line(&format!("        remedy: {remedy}"));
        }
        self.take_error()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn passed(&mut self, check: Check, commit: Option<&str>, subject: Option<&str>, summary: &str) {
        let mut line = format!("[PASS] {check}");
        if let Some(c) = commit {
            line.push(' ');
            line.push_str(c);
        }
        if let Some(s) = subject {
            line.push_str(&format!(" \"{s}\""));
        }
        line.push_str(": ");
        line.push_str(summary);
        self.line(&line);
    }

    fn failed(&mut self, v: &Violation) {
        let mut line = format!("[FAIL] {}", v.check);
        if let Some(c) = &v.commit {
            line.push(' ');
            line.push_str(c.short());
        }
        line.push_str(": ");
        line.push_str(&v.reason);
        self.line(&line);
        self.line(&format!("       {}", v.evidence));
        self.line(&format!("       remedy: {}", v.remedy));
    }

    fn line(&mut self, s: &str) {
        if self.io_error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{s}").and_then(|_| self.out.flush()) {
            self.io_error = Some(e);
        }
    }

    fn take_error(&mut self) -> io::Result<()> {
        match self.io_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<W: Write> SlotObserver for Reporter<W> {
    fn on_event(&mut self, event: &SlotEvent) {
        match event {
            SlotEvent::Passed { check, commit, subject, summary } => {
                self.passed(*check, commit.as_ref().map(|c| c.short()), subject.as_deref(), summary)
            }
            SlotEvent::Failed(v) => self.failed(v),
        }
    }
}
