//! Configuration module.
//!
//! This module defines the command-line interfaces of `md-sign` and
//! `md-verify` using `clap`. The key and file paths are optional at the clap
//! level so that each missing one gets its own diagnostic.

use clap::Parser;
use std::path::PathBuf;

use crate::embed::objcopy::DEFAULT_PROGRAM;
use crate::error::Error;

/// Signs the loadable segments of a 64-bit ELF executable.
///
/// One Ed25519 signature per PT_LOAD segment is stored in the file's
/// `.note.sig` section.
#[derive(Parser, Debug)]
#[command(
    name = "md-sign",
    version,
    long_about = None,
    after_help = "A -k and -f parameter must be passed in order for the program to be able to sign the file\n\nWhen the first loadable segment covers the ELF header, rewriting the\nsection table changes those bytes. Sign a freshly linked file twice before\nverifying it.\n\nExample usage: md-sign -k secret.key -f executable.elf"
)]
pub struct SignConfig {
    /// Path to a file containing the 64-byte secret key
    #[arg(short = 'k', long = "key", value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Path to the ELF file to be signed
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// The objcopy command used to rewrite the signature section
    #[arg(long, alias = "objcpy", default_value = DEFAULT_PROGRAM)]
    pub objcopy: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", help = "Set the logging level")]
    pub log_level: String,
}

/// Verifies the segment signatures embedded in a 64-bit ELF executable.
#[derive(Parser, Debug)]
#[command(
    name = "md-verify",
    version,
    long_about = None,
    after_help = "A -k and -f parameter must be passed in order for the program to be able to verify the signatures\n\nExample usage: md-verify -k public.key -f executable.elf"
)]
pub struct VerifyConfig {
    /// Path to a file containing the 32-byte public key
    #[arg(short = 'k', long = "key", value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Path to the ELF file to be verified
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", help = "Set the logging level")]
    pub log_level: String,
}

/// Key and target paths, both present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub key: PathBuf,
    pub file: PathBuf,
}

/// Checks that both `-k` and `-f` were given, reporting every missing one.
fn require_paths(key: Option<&PathBuf>, file: Option<&PathBuf>) -> Result<Paths, Vec<Error>> {
    match (key, file) {
        (Some(key), Some(file)) => Ok(Paths {
            key: key.clone(),
            file: file.clone(),
        }),
        (key, file) => {
            let mut missing = Vec::new();
            if key.is_none() {
                missing.push(Error::MissingArgument { flag: "-k", what: "key" });
            }
            if file.is_none() {
                missing.push(Error::MissingArgument { flag: "-f", what: "file" });
            }
            Err(missing)
        }
    }
}

impl SignConfig {
    pub fn paths(&self) -> Result<Paths, Vec<Error>> {
        require_paths(self.key.as_ref(), self.file.as_ref())
    }
}

impl VerifyConfig {
    pub fn paths(&self) -> Result<Paths, Vec<Error>> {
        require_paths(self.key.as_ref(), self.file.as_ref())
    }
}
