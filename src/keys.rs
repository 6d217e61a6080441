//! Key material.
//!
//! Key files are raw bytes with no header: a 32-byte Ed25519 public key, or a
//! 64-byte secret key laid out as the 32-byte seed followed by the 32-byte
//! public key. Buffers holding key bytes are wiped when dropped.

use std::path::Path;

use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Size of a public key file.
pub const PUBLIC_KEY_LEN: usize = 32;
/// Size of a secret key file.
pub const SECRET_KEY_LEN: usize = 64;

/// A secret key loaded from disk. Zeroized on drop.
pub struct SecretKey {
    signing: SigningKey,
}

impl SecretKey {
    /// Reads a secret key file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_key_file::<SECRET_KEY_LEN>(path)?;
        Self::from_keypair_bytes(&bytes).map_err(|reason| Error::InvalidKeyFile {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Builds a key from seed || public key bytes, rejecting pairs whose
    /// public half does not belong to the seed.
    pub fn from_keypair_bytes(bytes: &[u8; SECRET_KEY_LEN]) -> std::result::Result<Self, String> {
        let signing = SigningKey::from_keypair_bytes(bytes)
            .map_err(|_| "public key half does not match the secret seed".to_string())?;
        Ok(Self { signing })
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    /// The public key matching this secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying: self.signing.verifying_key(),
        }
    }
}

/// A public key loaded from disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    verifying: VerifyingKey,
}

impl PublicKey {
    /// Reads a public key file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = read_key_file::<PUBLIC_KEY_LEN>(path)?;
        Self::from_bytes(&bytes).map_err(|reason| Error::InvalidKeyFile {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LEN]) -> std::result::Result<Self, String> {
        let verifying = VerifyingKey::from_bytes(bytes)
            .map_err(|_| "bytes do not encode an Ed25519 public key".to_string())?;
        Ok(Self { verifying })
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.verifying.to_bytes()
    }
}

/// Reads the leading `N` bytes of a key file into a wiped-on-drop buffer.
fn read_key_file<const N: usize>(path: &Path) -> Result<Zeroizing<[u8; N]>> {
    let contents = Zeroizing::new(std::fs::read(path)?);
    if contents.len() < N {
        return Err(Error::InvalidKeyFile {
            path: path.to_path_buf(),
            reason: format!("expected {} bytes, found {}", N, contents.len()),
        });
    }
    if contents.len() > N {
        tracing::warn!(
            "key file {} is {} bytes, using the first {}",
            path.display(),
            contents.len(),
            N
        );
    }
    let mut key = Zeroizing::new([0u8; N]);
    key.copy_from_slice(&contents[..N]);
    Ok(key)
}
