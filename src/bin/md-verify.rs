//! Entry point for `md-verify`.
//!
//! 1. Parse command-line arguments using `clap`.
//! 2. Validate the key and target paths, then load the public key.
//! 3. Check every loadable segment against the `.note.sig` records.
//!
//! Error handling is done via `anyhow`; any failure exits nonzero.

use anyhow::{bail, Context, Result};
use clap::Parser;

use segsign::config::VerifyConfig;
use segsign::keys::PublicKey;
use segsign::utils::{init_tracing, require_regular_file};
use segsign::verifier::verify_file;

fn main() -> Result<()> {
    let config = VerifyConfig::parse();
    init_tracing(&config.log_level);

    let paths = match config.paths() {
        Ok(paths) => paths,
        Err(missing) => {
            for err in &missing {
                eprintln!("{err}");
            }
            bail!("missing required arguments");
        }
    };
    require_regular_file("Key file", &paths.key)?;
    require_regular_file("File", &paths.file)?;

    let key = PublicKey::load(&paths.key)?;
    let verified = verify_file(&key, &paths.file)
        .with_context(|| format!("failed to verify {}", paths.file.display()))?;

    tracing::info!(
        "{} segments checked against {} records",
        verified.segments,
        verified.records
    );
    println!("Signatures successfully verified");
    Ok(())
}
