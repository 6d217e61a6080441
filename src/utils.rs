//! Utility functions.

use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Checks that `path` exists and names a regular file.
///
/// `what` names the argument in diagnostics ("Key file", "File").
pub fn require_regular_file(what: &'static str, path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::PathNotFound {
                what,
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    if !metadata.is_file() {
        return Err(Error::NotARegularFile {
            what,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `level` when set. Output goes to stderr so stdout only
/// carries the tool's result line.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
