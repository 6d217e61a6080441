//! Signature block layout.
//!
//! A signature block is the contents of the `.note.sig` section: one 64-byte
//! Ed25519 signature per signable segment, concatenated in program header
//! order, with no header or padding.

use ed25519_dalek::{Signature, SIGNATURE_LENGTH};

/// Name of the section holding the signature block.
pub const SIGNATURE_SECTION: &str = ".note.sig";

/// Size of one signature record.
pub const RECORD_LEN: usize = SIGNATURE_LENGTH;

/// An owned, serialized signature block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureBlock {
    bytes: Vec<u8>,
}

impl SignatureBlock {
    pub fn with_capacity(records: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(records * RECORD_LEN),
        }
    }

    pub fn push(&mut self, signature: &Signature) {
        self.bytes.extend_from_slice(&signature.to_bytes());
    }

    /// Number of records in the block.
    pub fn len(&self) -> usize {
        self.bytes.len() / RECORD_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The serialized block, as it is stored in the section.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A borrowed view over signature records stored in a section.
///
/// A trailing partial record is not part of the view.
#[derive(Debug, Clone, Copy)]
pub struct SignatureRecords<'data> {
    bytes: &'data [u8],
}

impl<'data> SignatureRecords<'data> {
    pub fn new(bytes: &'data [u8]) -> Self {
        Self { bytes }
    }

    /// `section size / 64`, rounded down.
    pub fn len(&self) -> usize {
        self.bytes.len() / RECORD_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes past the last whole record.
    pub fn trailing_bytes(&self) -> usize {
        self.bytes.len() % RECORD_LEN
    }

    /// Record `index`, or `None` if the section is too short to hold it.
    pub fn get(&self, index: usize) -> Option<Signature> {
        let start = index.checked_mul(RECORD_LEN)?;
        let record = self.bytes.get(start..start.checked_add(RECORD_LEN)?)?;
        let record: &[u8; RECORD_LEN] = record.try_into().ok()?;
        Some(Signature::from_bytes(record))
    }
}
