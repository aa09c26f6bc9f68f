//! Error taxonomy for the engine.

use thiserror::Error;

/// Errors the engine can surface to an embedder.
///
/// `feed` aborts the call that produced the error only; the screen retains
/// whatever state was built from bytes consumed before the failure, and
/// later `feed` calls may continue normally. Extraction never mutates the
/// screen, so a failed extraction simply yields no document.
#[derive(Debug, Error)]
pub enum Error {
    /// A byte sequence could not be routed to any no-op fallback. In
    /// practice the parser treats unrecognized CSI/OSC/ESC sequences as
    /// no-ops, so this is reserved for structurally malformed input (e.g. a
    /// parameter string the accumulator cannot hold).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No persistent instance is registered under the given id.
    #[error("no instance registered for id {0}")]
    NotFound(u64),

    /// Output formatting required valid UTF-8 text and the screen held a
    /// scalar that could not be produced as one. In practice this should be
    /// unreachable since malformed continuation bytes are replaced with
    /// U+FFFD at parse time rather than stored verbatim.
    #[error("invalid utf-8 in terminal output")]
    InvalidUtf8,

    /// An arena or screen buffer could not grow to hold the requested data.
    /// The instance is left in whatever consistent state it had before the
    /// allocation was attempted.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
