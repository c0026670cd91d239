use thiserror::Error;

/// Failures reported by a [`crate::HostNode`] implementation.
///
/// `AccessDenied` is the expected outcome of touching content the host will
/// not expose (a cross-origin frame, a closed shadow root) and is always
/// recovered by skipping the subtree.  `Failed` means the host itself broke
/// and is propagated to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host refused access: {0}")]
    AccessDenied(String),
    #[error("host failure: {0}")]
    Failed(String),
}

/// Errors surfaced by the public API.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("invalid lexicon: {0}")]
    Lexicon(#[from] serde_json::Error),
    #[error("invalid lexicon pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
