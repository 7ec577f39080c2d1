use relgate_vcs::VcsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("cannot resolve reference '{reference}'")]
    RefResolution { reference: String },

    /// Mapped to a commit-count violation by [`crate::verify`]; never a crash.
    #[error("no commits on {head} on top of {base}")]
    EmptyRange { base: String, head: String },

    #[error(transparent)]
    Repository(#[from] VcsError),
}

impl VerifyError {
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            VerifyError::RefResolution { .. } => Some("supply valid references"),
            VerifyError::EmptyRange { .. } => None,
            VerifyError::Repository(_) => None,
        }
    }
}
