//! Error types.
//!
//! Every failure is terminal for the invocation that hit it: the binaries report
//! the diagnostic on stderr and exit with a failure status.

use std::path::PathBuf;

/// All errors produced while signing or verifying an image.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // ── Input validation ─────────────────────────────────────────────

    #[error("The {what} has not been specified. Use {flag} [path] to specify the path to the {what}")]
    MissingArgument {
        flag: &'static str,
        what: &'static str,
    },

    #[error("{what} does not exist: {}", path.display())]
    PathNotFound { what: &'static str, path: PathBuf },

    #[error("{what} path does not point to a file: {}", path.display())]
    NotARegularFile { what: &'static str, path: PathBuf },

    #[error("Invalid key file {}: {reason}", path.display())]
    InvalidKeyFile { path: PathBuf, reason: String },

    // ── Image parsing ────────────────────────────────────────────────

    #[error("Invalid file format")]
    InvalidFormat,

    #[error("{bits} bit ELF not supported")]
    UnsupportedFormat { bits: u8 },

    #[error("Malformed ELF image: {reason}")]
    Malformed { reason: String },

    // ── Signatures ───────────────────────────────────────────────────

    #[error("Failed to locate {name}")]
    SignatureSectionMissing { name: &'static str },

    #[error("Signature count mismatch: {records} signature records for {segments} loadable segments")]
    SignatureCountMismatch { records: usize, segments: usize },

    #[error("Failed to verify signature for segment {index}")]
    SignatureInvalid { index: usize },

    #[error("Failed to sign file: {step} failed: {reason}")]
    EmbeddingFailed { step: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::Malformed {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
