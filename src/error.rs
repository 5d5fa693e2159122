//! Error types for lexnav.

use thiserror::Error;

use crate::volume::VolumeError;

#[derive(Debug, Error)]
pub enum Error {
    /// A redirect pointed at a title the volume does not contain.
    #[error("redirect target not found: {0}")]
    RedirectTargetNotFound(String),

    /// The redirect chain looped or exceeded the configured depth.
    #[error("too many redirects for: {0}")]
    RedirectChainTooLong(String),

    #[error("article not found: {0}")]
    EntryNotFound(String),

    #[error("backend failure: {0}")]
    Backend(#[from] VolumeError),

    /// Contract violation: the history stack has no frame to read or pop.
    #[error("history is empty")]
    EmptyHistory,

    /// Contract violation: the top frame has no candidate left to advance to.
    #[error("no next candidate")]
    NoNextCandidate,

    /// Contract violation: the top frame was pushed before its article resolved.
    #[error("top frame has no resolved article")]
    UnresolvedFrame,
}

pub type Result<T> = std::result::Result<T, Error>;
