//! Shared test support: a synthetic ELF image builder and an in-process
//! section embedder that rebuilds the image instead of running objcopy.

#![allow(dead_code)]

use std::ops::Range;
use std::path::Path;

use object::endian::{U16, U32, U64};
use object::pod::bytes_of;
use object::Endianness;

use segsign::embed::SectionEmbedder;
use segsign::keys::{PublicKey, SecretKey};
use segsign::Error;

const PAGE_SIZE: usize = 0x1000;
const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const SHDR_SIZE: usize = 64;

/// A secret/public key pair derived from a fixed seed.
pub fn keys(seed: u8) -> (SecretKey, PublicKey) {
    let bytes = ed25519_dalek::SigningKey::from_bytes(&[seed; 32]).to_keypair_bytes();
    let secret = SecretKey::from_keypair_bytes(&bytes).unwrap();
    let public = secret.public_key();
    (secret, public)
}

/// Raw secret key file contents for `seed`.
pub fn secret_key_bytes(seed: u8) -> [u8; 64] {
    ed25519_dalek::SigningKey::from_bytes(&[seed; 32]).to_keypair_bytes()
}

/// Raw public key file contents for `seed`.
pub fn public_key_bytes(seed: u8) -> [u8; 32] {
    ed25519_dalek::SigningKey::from_bytes(&[seed; 32])
        .verifying_key()
        .to_bytes()
}

/// Content with a recognisable pattern, so segments differ.
pub fn pattern(len: usize, salt: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(salt)).collect()
}

#[derive(Clone, Debug)]
struct Segment {
    p_type: u32,
    data: Vec<u8>,
}

/// Builds 64-bit ELF images with chosen program headers and sections.
///
/// Layout: file header, program headers, then each segment's bytes on its
/// own page, then extra section contents, the name string table, and the
/// section header table last.
#[derive(Clone, Debug)]
pub struct ImageBuilder {
    endian: Endianness,
    segments: Vec<Segment>,
    sections: Vec<(String, Vec<u8>)>,
    reverse_data: bool,
}

/// A built image plus where each program header's bytes ended up.
pub struct Built {
    pub bytes: Vec<u8>,
    pub phdr_ranges: Vec<Range<usize>>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new(Endianness::Little)
    }
}

impl ImageBuilder {
    pub fn new(endian: Endianness) -> Self {
        Self {
            endian,
            segments: Vec::new(),
            sections: Vec::new(),
            reverse_data: false,
        }
    }

    /// Adds a PT_LOAD program header with `data` as its file content.
    pub fn load(self, data: Vec<u8>) -> Self {
        self.segment(object::elf::PT_LOAD, data)
    }

    /// Adds a program header of any type.
    pub fn segment(mut self, p_type: u32, data: Vec<u8>) -> Self {
        self.segments.push(Segment { p_type, data });
        self
    }

    /// Adds a named section holding `data`.
    pub fn section(mut self, name: &str, data: Vec<u8>) -> Self {
        self.sections.push((name.to_string(), data));
        self
    }

    /// Lays segment data out in the reverse of program header order.
    pub fn reverse_data(mut self) -> Self {
        self.reverse_data = true;
        self
    }

    pub fn remove_section(&mut self, name: &str) {
        self.sections.retain(|(n, _)| n != name);
    }

    pub fn build(&self) -> Built {
        let e = self.endian;
        let u16 = |v: u16| U16::new(e, v);
        let u32 = |v: u32| U32::new(e, v);
        let u64 = |v: u64| U64::new(e, v);

        // Segment placement.
        let mut phdr_ranges = vec![0..0; self.segments.len()];
        let mut order: Vec<usize> = (0..self.segments.len()).collect();
        if self.reverse_data {
            order.reverse();
        }
        let mut offset = PAGE_SIZE;
        for &i in &order {
            let len = self.segments[i].data.len();
            phdr_ranges[i] = offset..offset + len;
            offset = align_up(offset + len, PAGE_SIZE);
        }
        let segments_end = offset;

        // Name string table: segment sections, extra sections, .shstrtab.
        let mut shstrtab = vec![0u8];
        let name_offset = |name: &str, table: &mut Vec<u8>| {
            let off = table.len() as u32;
            table.extend_from_slice(name.as_bytes());
            table.push(0);
            off
        };
        let segment_names: Vec<u32> = (0..self.segments.len())
            .map(|i| name_offset(format!(".seg{i}").as_str(), &mut shstrtab))
            .collect();
        let section_names: Vec<u32> = self
            .sections
            .iter()
            .map(|(name, _)| name_offset(name.as_str(), &mut shstrtab))
            .collect();
        let shstrtab_name = name_offset(".shstrtab", &mut shstrtab);

        let mut section_offsets = Vec::new();
        for (_, data) in &self.sections {
            section_offsets.push(offset);
            offset += data.len();
        }
        let shstrtab_offset = offset;
        offset += shstrtab.len();
        let shoff = align_up(offset, 8);
        let shnum = 1 + self.segments.len() + self.sections.len() + 1;

        let mut buffer = Vec::new();
        let file_header = object::elf::FileHeader64::<Endianness> {
            e_ident: object::elf::Ident {
                magic: object::elf::ELFMAG,
                class: object::elf::ELFCLASS64,
                data: if e == Endianness::Little {
                    object::elf::ELFDATA2LSB
                } else {
                    object::elf::ELFDATA2MSB
                },
                version: object::elf::EV_CURRENT,
                os_abi: object::elf::ELFOSABI_SYSV,
                abi_version: 0,
                padding: [0; 7],
            },
            e_type: u16(object::elf::ET_EXEC),
            e_machine: u16(object::elf::EM_X86_64),
            e_version: u32(object::elf::EV_CURRENT as u32),
            e_entry: u64(0x401000),
            e_phoff: u64(if self.segments.is_empty() { 0 } else { EHDR_SIZE as u64 }),
            e_shoff: u64(shoff as u64),
            e_flags: u32(0),
            e_ehsize: u16(EHDR_SIZE as u16),
            e_phentsize: u16(PHDR_SIZE as u16),
            e_phnum: u16(self.segments.len() as u16),
            e_shentsize: u16(SHDR_SIZE as u16),
            e_shnum: u16(shnum as u16),
            e_shstrndx: u16(shnum as u16 - 1),
        };
        buffer.extend_from_slice(bytes_of(&file_header));

        for (segment, range) in self.segments.iter().zip(&phdr_ranges) {
            let vaddr = 0x400000 + range.start as u64;
            let prog_header = object::elf::ProgramHeader64::<Endianness> {
                p_type: u32(segment.p_type),
                p_flags: u32(object::elf::PF_R),
                p_offset: u64(range.start as u64),
                p_vaddr: u64(vaddr),
                p_paddr: u64(vaddr),
                p_filesz: u64(segment.data.len() as u64),
                p_memsz: u64(segment.data.len() as u64),
                p_align: u64(PAGE_SIZE as u64),
            };
            buffer.extend_from_slice(bytes_of(&prog_header));
        }

        buffer.resize(PAGE_SIZE, 0);
        for &i in &order {
            buffer.resize(phdr_ranges[i].start, 0);
            buffer.extend_from_slice(&self.segments[i].data);
        }
        buffer.resize(segments_end, 0);
        for (_, data) in &self.sections {
            buffer.extend_from_slice(data);
        }
        buffer.extend_from_slice(&shstrtab);
        buffer.resize(shoff, 0);

        let section_header = |name: u32, sh_type: u32, offset: usize, size: usize| {
            object::elf::SectionHeader64::<Endianness> {
                sh_name: u32(name),
                sh_type: u32(sh_type),
                sh_flags: u64(0),
                sh_addr: u64(0),
                sh_offset: u64(offset as u64),
                sh_size: u64(size as u64),
                sh_link: u32(0),
                sh_info: u32(0),
                sh_addralign: u64(1),
                sh_entsize: u64(0),
            }
        };
        buffer.extend_from_slice(bytes_of(&section_header(0, object::elf::SHT_NULL, 0, 0)));
        for ((segment, range), name) in self.segments.iter().zip(&phdr_ranges).zip(&segment_names) {
            buffer.extend_from_slice(bytes_of(&section_header(
                *name,
                object::elf::SHT_PROGBITS,
                range.start,
                segment.data.len(),
            )));
        }
        for (((_, data), offset), name) in self.sections.iter().zip(&section_offsets).zip(&section_names) {
            buffer.extend_from_slice(bytes_of(&section_header(
                *name,
                object::elf::SHT_NOTE,
                *offset,
                data.len(),
            )));
        }
        buffer.extend_from_slice(bytes_of(&section_header(
            shstrtab_name,
            object::elf::SHT_STRTAB,
            shstrtab_offset,
            shstrtab.len(),
        )));

        Built {
            bytes: buffer,
            phdr_ranges,
        }
    }
}

/// A minimal 32-bit ELF image with one PT_LOAD segment.
pub fn elf32_image() -> Vec<u8> {
    let e = Endianness::Little;
    let header = object::elf::FileHeader32::<Endianness> {
        e_ident: object::elf::Ident {
            magic: object::elf::ELFMAG,
            class: object::elf::ELFCLASS32,
            data: object::elf::ELFDATA2LSB,
            version: object::elf::EV_CURRENT,
            os_abi: object::elf::ELFOSABI_SYSV,
            abi_version: 0,
            padding: [0; 7],
        },
        e_type: U16::new(e, object::elf::ET_EXEC),
        e_machine: U16::new(e, object::elf::EM_386),
        e_version: U32::new(e, object::elf::EV_CURRENT as u32),
        e_entry: U32::new(e, 0x8049000),
        e_phoff: U32::new(e, 52),
        e_shoff: U32::new(e, 0),
        e_flags: U32::new(e, 0),
        e_ehsize: U16::new(e, 52),
        e_phentsize: U16::new(e, 32),
        e_phnum: U16::new(e, 1),
        e_shentsize: U16::new(e, 40),
        e_shnum: U16::new(e, 0),
        e_shstrndx: U16::new(e, 0),
    };
    let phdr = object::elf::ProgramHeader32::<Endianness> {
        p_type: U32::new(e, object::elf::PT_LOAD),
        p_offset: U32::new(e, 0x100),
        p_vaddr: U32::new(e, 0x8049000),
        p_paddr: U32::new(e, 0x8049000),
        p_filesz: U32::new(e, 16),
        p_memsz: U32::new(e, 16),
        p_flags: U32::new(e, object::elf::PF_R | object::elf::PF_X),
        p_align: U32::new(e, 0x1000),
    };
    let mut bytes = bytes_of(&header).to_vec();
    bytes.extend_from_slice(bytes_of(&phdr));
    bytes.resize(0x100, 0);
    bytes.extend_from_slice(&[0x90; 16]);
    bytes
}

fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// A `SectionEmbedder` that rewrites the file from an `ImageBuilder`.
///
/// Records every call so tests can check the remove/add protocol.
pub struct RebuildingEmbedder {
    pub image: ImageBuilder,
    pub calls: Vec<String>,
    pub installed: Option<Vec<u8>>,
    pub fail_remove: bool,
    pub fail_add: bool,
}

impl RebuildingEmbedder {
    pub fn new(image: ImageBuilder) -> Self {
        Self {
            image,
            calls: Vec::new(),
            installed: None,
            fail_remove: false,
            fail_add: false,
        }
    }
}

impl SectionEmbedder for RebuildingEmbedder {
    fn remove_section(&mut self, file: &Path, name: &str) -> segsign::Result<()> {
        self.calls.push(format!("remove {name}"));
        if self.fail_remove {
            return Err(Error::EmbeddingFailed {
                step: "remove section",
                reason: "simulated failure".to_string(),
            });
        }
        self.image.remove_section(name);
        std::fs::write(file, self.image.build().bytes)?;
        Ok(())
    }

    fn add_section(&mut self, file: &Path, name: &str, contents: &[u8]) -> segsign::Result<()> {
        self.calls.push(format!("add {name}"));
        if self.fail_add {
            return Err(Error::EmbeddingFailed {
                step: "add section",
                reason: "simulated failure".to_string(),
            });
        }
        self.image = self.image.clone().section(name, contents.to_vec());
        self.installed = Some(contents.to_vec());
        std::fs::write(file, self.image.build().bytes)?;
        Ok(())
    }
}
