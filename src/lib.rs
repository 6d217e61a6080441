//! Segment-based ELF signing library.
//!
//! This library provides the core components for the `md-sign` and `md-verify`
//! tools. It is organized into several modules:
//! - `config`: CLI configuration.
//! - `image`: ELF header, program header and section header parsing.
//! - `segment`: Extraction of signable PT_LOAD segment content.
//! - `signature`: The `.note.sig` signature block layout.
//! - `signer` / `verifier`: Per-segment Ed25519 signing and checking.
//! - `embed`: Installing the signature block into the file.
//! - `keys`: Key file loading.

pub mod config;
pub mod embed;
pub mod error;
pub mod image;
pub mod keys;
pub mod segment;
pub mod signature;
pub mod signer;
pub mod utils;
pub mod verifier;

pub use error::{Error, Result};
