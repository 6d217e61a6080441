//! Entry point for `md-sign`.
//!
//! 1. Parse command-line arguments using `clap`.
//! 2. Validate the key and target paths, then load the secret key.
//! 3. Sign every loadable segment and install the block with objcopy.
//!
//! Error handling is done via `anyhow`. The secret key is wiped when it is
//! dropped, on the error paths as well.

use anyhow::{bail, Context, Result};
use clap::Parser;

use segsign::config::SignConfig;
use segsign::embed::objcopy::Objcopy;
use segsign::keys::SecretKey;
use segsign::signer::sign_file;
use segsign::utils::{init_tracing, require_regular_file};

fn main() -> Result<()> {
    let config = SignConfig::parse();
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

    // Key problems are reported before the target is opened.
    let key = SecretKey::load(&paths.key)?;

    let mut objcopy = Objcopy::new(&config.objcopy);
    let block = sign_file(&key, &paths.file, &mut objcopy)
        .with_context(|| format!("failed to sign {}", paths.file.display()))?;
    drop(key);

    println!(
        "Installed {} signature record(s) in {}",
        block.len(),
        paths.file.display()
    );
    Ok(())
}
