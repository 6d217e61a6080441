//! ELF structural reader.
//!
//! Parses the identification bytes, then reads the 64-bit file header, the
//! program header table and, when asked for a section by name, the section
//! header table and its name string table. All reads are bounds-checked
//! against the mapped file; nothing is interpreted past its end.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use object::elf::{FileHeader64, ELFCLASS32, ELFCLASS64, ELFMAG};
use object::read::elf::{FileHeader, ProgramHeader, SectionHeader};
use object::Endianness;

use crate::error::{Error, Result};
use crate::segment::ProgramHeaderEntry;

/// Length of `e_ident`.
const IDENT_LEN: usize = 16;
/// Offset of the class byte within `e_ident`.
const CLASS_OFFSET: usize = 4;

/// Maps `path` read-only. The file handle is closed before returning; the
/// mapping stays valid until dropped.
pub fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    // The target is not expected to change while we hold the mapping.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// Checks the magic and class bytes.
///
/// 64-bit images pass. 32-bit images are refused as unsupported before any
/// header beyond `e_ident` is looked at.
pub fn identify(data: &[u8]) -> Result<()> {
    if data.len() < IDENT_LEN || data[..ELFMAG.len()] != ELFMAG {
        return Err(Error::InvalidFormat);
    }
    match data[CLASS_OFFSET] {
        ELFCLASS64 => Ok(()),
        ELFCLASS32 => Err(Error::UnsupportedFormat { bits: 32 }),
        _ => Err(Error::InvalidFormat),
    }
}

/// A parsed view over the bytes of a 64-bit ELF image.
pub struct ElfImage<'data> {
    data: &'data [u8],
    header: &'data FileHeader64<Endianness>,
    endian: Endianness,
}

impl<'data> ElfImage<'data> {
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        identify(data)?;
        let header = FileHeader64::<Endianness>::parse(data)
            .map_err(|err| Error::malformed(format!("file header: {err}")))?;
        let endian = header.endian().map_err(|_| Error::InvalidFormat)?;
        Ok(Self {
            data,
            header,
            endian,
        })
    }

    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// The program header table, in table order.
    pub fn program_headers(&self) -> Result<Vec<ProgramHeaderEntry>> {
        let phdrs = self
            .header
            .program_headers(self.endian, self.data)
            .map_err(|err| Error::malformed(format!("program header table: {err}")))?;
        Ok(phdrs
            .iter()
            .map(|phdr| ProgramHeaderEntry {
                p_type: phdr.p_type(self.endian),
                offset: phdr.p_offset(self.endian),
                file_size: phdr.p_filesz(self.endian),
            })
            .collect())
    }

    /// Finds the first section called `name` by resolving each section
    /// header's name through the section header string table.
    ///
    /// Returns the section's file contents, or `None` if no section has that
    /// name.
    pub fn find_section(&self, name: &[u8]) -> Result<Option<&'data [u8]>> {
        let sections = self
            .header
            .sections(self.endian, self.data)
            .map_err(|err| Error::malformed(format!("section header table: {err}")))?;
        for (index, section) in sections.iter().enumerate() {
            let section_name = sections
                .section_name(self.endian, section)
                .map_err(|err| Error::malformed(format!("name of section {index}: {err}")))?;
            if section_name != name {
                continue;
            }
            let contents = section
                .data(self.endian, self.data)
                .map_err(|err| Error::malformed(format!("contents of section {index}: {err}")))?;
            tracing::debug!(
                "found section {} at index {} ({} bytes)",
                String::from_utf8_lossy(name),
                index,
                contents.len()
            );
            return Ok(Some(contents));
        }
        Ok(None)
    }
}
