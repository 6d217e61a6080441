//! Section embedding.
//!
//! This module defines the `SectionEmbedder` trait, the boundary between the
//! signing logic and whatever physically rewrites the ELF file. The signer
//! only decides which bytes a section must hold; an embedder puts them there.
//!
//! Replacing a section is two steps, remove then add, and is not atomic: if
//! the process dies between them the file is left without the section.

use std::path::Path;

use crate::error::Result;

pub mod objcopy;

/// Something that can remove and install named sections in an ELF file.
pub trait SectionEmbedder {
    /// Removes the section called `name` from `file`.
    ///
    /// A file with no such section is not an error.
    fn remove_section(&mut self, file: &Path, name: &str) -> Result<()>;

    /// Adds a section called `name` to `file` holding exactly `contents`.
    fn add_section(&mut self, file: &Path, name: &str, contents: &[u8]) -> Result<()>;
}

/// Replaces the section called `name` in `file` with `contents`.
///
/// The add step only runs if the remove step succeeded.
pub fn replace_section<E: SectionEmbedder + ?Sized>(
    embedder: &mut E,
    file: &Path,
    name: &str,
    contents: &[u8],
) -> Result<()> {
    embedder.remove_section(file, name)?;
    embedder.add_section(file, name, contents)
}
