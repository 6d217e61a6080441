//! Signing.
//!
//! Produces one Ed25519 signature per signable segment and hands the block
//! to a `SectionEmbedder` for installation under `.note.sig`.

use std::path::Path;

use ed25519_dalek::Signer as _;

use crate::embed::{self, SectionEmbedder};
use crate::error::Result;
use crate::image::{self, ElfImage};
use crate::keys::SecretKey;
use crate::segment::{extract_segments, SegmentContent};
use crate::signature::{SignatureBlock, SIGNATURE_SECTION};

/// Signs each segment in order. Ed25519 signing is deterministic, so the
/// same key and content always give the same block.
pub fn sign_segments(key: &SecretKey, segments: &[SegmentContent]) -> SignatureBlock {
    let signing_key = key.signing_key();
    let mut block = SignatureBlock::with_capacity(segments.len());
    for segment in segments {
        block.push(&signing_key.sign(&segment.data));
    }
    block
}

/// Signs an in-memory image without touching the filesystem.
pub fn sign_image(key: &SecretKey, data: &[u8]) -> Result<SignatureBlock> {
    let image = ElfImage::parse(data)?;
    let segments = extract_segments(&image)?;
    Ok(sign_segments(key, &segments))
}

/// Signs the file at `path` and installs the signature block with `embedder`.
///
/// The file is unmapped and closed before the embedder runs. Returns the
/// installed block.
pub fn sign_file<E: SectionEmbedder + ?Sized>(
    key: &SecretKey,
    path: &Path,
    embedder: &mut E,
) -> Result<SignatureBlock> {
    let segments = {
        let map = image::map_file(path)?;
        let image = ElfImage::parse(&map)?;
        extract_segments(&image)?
    };
    tracing::info!("signing {} loadable segments of {}", segments.len(), path.display());

    let block = sign_segments(key, &segments);
    embed::replace_section(embedder, path, SIGNATURE_SECTION, block.as_bytes())?;
    tracing::info!("installed {} signature bytes in {}", block.as_bytes().len(), SIGNATURE_SECTION);
    Ok(block)
}
