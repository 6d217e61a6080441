//! Verification.
//!
//! Locates `.note.sig` through the section header string table, re-derives
//! the signable segments exactly as signing did, and checks segment `i`
//! against record `i`. The first bad record stops verification.

use std::path::Path;

use ed25519_dalek::Verifier as _;

use crate::error::{Error, Result};
use crate::image::{self, ElfImage};
use crate::keys::PublicKey;
use crate::segment::{extract_segments, SegmentContent};
use crate::signature::{SignatureRecords, SIGNATURE_SECTION};

/// Outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    /// Number of segments whose signatures were checked.
    pub segments: usize,
    /// Number of whole records in the signature section.
    pub records: usize,
}

/// Checks `segments` against `records`, index by index.
///
/// Fails with `SignatureCountMismatch` before checking anything if there are
/// fewer records than segments. Records beyond the segment count are ignored.
pub fn verify_segments(
    key: &PublicKey,
    segments: &[SegmentContent],
    records: SignatureRecords<'_>,
) -> Result<Verified> {
    if records.len() < segments.len() {
        return Err(Error::SignatureCountMismatch {
            records: records.len(),
            segments: segments.len(),
        });
    }
    if records.len() > segments.len() {
        tracing::warn!(
            "{} contains {} records for {} segments; ignoring the rest",
            SIGNATURE_SECTION,
            records.len(),
            segments.len()
        );
    }
    if records.trailing_bytes() != 0 {
        tracing::warn!(
            "{} has {} trailing bytes after the last record",
            SIGNATURE_SECTION,
            records.trailing_bytes()
        );
    }

    let verifying_key = key.verifying_key();
    for (index, segment) in segments.iter().enumerate() {
        let signature = records
            .get(index)
            .ok_or(Error::SignatureCountMismatch {
                records: records.len(),
                segments: segments.len(),
            })?;
        if verifying_key.verify(&segment.data, &signature).is_err() {
            tracing::debug!(
                "segment {} (phdr {}, offset 0x{:x}) failed verification",
                index,
                segment.phdr_index,
                segment.offset
            );
            return Err(Error::SignatureInvalid { index });
        }
        tracing::debug!("segment {} verified", index);
    }
    Ok(Verified {
        segments: segments.len(),
        records: records.len(),
    })
}

/// Verifies an in-memory image.
pub fn verify_image(key: &PublicKey, data: &[u8]) -> Result<Verified> {
    let image = ElfImage::parse(data)?;
    let section = image
        .find_section(SIGNATURE_SECTION.as_bytes())?
        .ok_or(Error::SignatureSectionMissing {
            name: SIGNATURE_SECTION,
        })?;
    let records = SignatureRecords::new(section);
    let segments = extract_segments(&image)?;
    tracing::info!(
        "checking {} loadable segments against {} signature records",
        segments.len(),
        records.len()
    );
    verify_segments(key, &segments, records)
}

/// Verifies the file at `path`.
pub fn verify_file(key: &PublicKey, path: &Path) -> Result<Verified> {
    let map = image::map_file(path)?;
    verify_image(key, &map)
}
