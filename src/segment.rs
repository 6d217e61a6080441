//! Signable segment extraction.
//!
//! The signable content of an image is the file bytes of every `PT_LOAD`
//! program header with a nonzero file size, taken in program header table
//! order. Signer and verifier both derive this sequence from the file
//! independently, so the order here is the signature format: it is never
//! sorted by offset, filtered by address, or deduplicated.

use object::elf::PT_LOAD;

use crate::error::{Error, Result};
use crate::image::ElfImage;

/// One program header table entry, reduced to what extraction needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHeaderEntry {
    /// Segment type (`p_type`).
    pub p_type: u32,
    /// Offset of the segment's bytes in the file (`p_offset`).
    pub offset: u64,
    /// Number of bytes the segment occupies in the file (`p_filesz`).
    pub file_size: u64,
}

impl ProgramHeaderEntry {
    /// Whether this entry contributes a signed segment.
    pub fn is_signable(&self) -> bool {
        self.p_type == PT_LOAD && self.file_size > 0
    }
}

/// The file bytes of one loadable segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentContent {
    /// Index of the originating entry in the program header table.
    pub phdr_index: usize,
    /// File offset the bytes were read from.
    pub offset: u64,
    /// The segment's bytes.
    pub data: Vec<u8>,
}

/// Copies out the content of every signable segment, in table order.
///
/// The returned buffers are owned, so the image (and the mapping behind it)
/// can be released before the content is used.
pub fn extract_segments(image: &ElfImage<'_>) -> Result<Vec<SegmentContent>> {
    let data = image.data();
    let mut segments = Vec::new();
    for (index, entry) in image.program_headers()?.into_iter().enumerate() {
        if !entry.is_signable() {
            continue;
        }
        let bytes = entry
            .offset
            .checked_add(entry.file_size)
            .filter(|&end| end <= data.len() as u64)
            .map(|end| &data[entry.offset as usize..end as usize])
            .ok_or_else(|| {
                Error::malformed(format!(
                    "segment {} (offset 0x{:x}, size 0x{:x}) extends past end of file (0x{:x} bytes)",
                    index,
                    entry.offset,
                    entry.file_size,
                    data.len()
                ))
            })?;
        tracing::debug!(
            "segment {}: phdr {} offset 0x{:x} size 0x{:x}",
            segments.len(),
            index,
            entry.offset,
            entry.file_size
        );
        segments.push(SegmentContent {
            phdr_index: index,
            offset: entry.offset,
            data: bytes.to_vec(),
        });
    }
    Ok(segments)
}
