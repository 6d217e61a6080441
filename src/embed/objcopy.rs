//! `objcopy` backend.
//!
//! Implements `SectionEmbedder` by running an external objcopy-compatible
//! program. There is no timeout: a hung child blocks the caller.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use super::SectionEmbedder;
use crate::error::{Error, Result};

/// Default program name for the section editor.
pub const DEFAULT_PROGRAM: &str = "objcopy";

/// An objcopy-compatible section editor.
#[derive(Debug, Clone)]
pub struct Objcopy {
    program: OsString,
}

impl Objcopy {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, step: &'static str, args: &[OsString]) -> Result<()> {
        tracing::debug!("running {:?} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|err| Error::EmbeddingFailed {
                step,
                reason: format!("failed to run {:?}: {}", self.program, err),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::EmbeddingFailed {
                step,
                reason: format!("{:?} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

impl Default for Objcopy {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl SectionEmbedder for Objcopy {
    fn remove_section(&mut self, file: &Path, name: &str) -> Result<()> {
        self.run(
            "remove section",
            &["--remove-section".into(), name.into(), file.into()],
        )
    }

    fn add_section(&mut self, file: &Path, name: &str, contents: &[u8]) -> Result<()> {
        // Removed when dropped, on every return path below.
        let mut staged = tempfile::Builder::new()
            .prefix("signature")
            .suffix(".tmp")
            .tempfile()?;
        staged.write_all(contents)?;
        staged.flush()?;

        let mut spec = OsString::from(name);
        spec.push("=");
        spec.push(staged.path());
        self.run("add section", &["--add-section".into(), spec, file.into()])
    }
}
