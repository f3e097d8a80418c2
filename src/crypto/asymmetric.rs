//! RSA-OAEP seal around the backing file. The public key encrypts records so
//! that only the process holding the private key can read them back; the
//! ciphertext carries no authentication beyond what OAEP padding provides.
//!
//! Key material lives in PEM files (SPKI public key, PKCS#8 private key) and
//! is read fresh from disk on every call, so a key swapped out under a
//! running process takes effect on the next operation.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

// OAEP reserves two SHA-256 digests plus two bytes of every RSA block.
const OAEP_OVERHEAD: usize = 2 * 32 + 2;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("key file unreadable: {0}")]
    KeyFileUnreadable(String),
    #[error("key parse failed: {0}")]
    KeyParseFailed(String),
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("base64 decoding failed: {0}")]
    Base64DecodeFailed(String),
    #[error("plaintext is not valid utf-8: {0}")]
    InvalidUtf8(String),
}

/// Public-key encrypt / private-key decrypt of UTF-8 text blobs, keyed by a
/// pair of PEM files. Failures of any kind surface as a typed `CipherError`;
/// nothing here panics on corrupt input or a mismatched key.
pub struct AsymmetricCipher {
    public_key_path: PathBuf,
    private_key_path: PathBuf,
}

impl AsymmetricCipher {
    pub fn new(public_key_path: impl Into<PathBuf>, private_key_path: impl Into<PathBuf>) -> Self {
        Self {
            public_key_path: public_key_path.into(),
            private_key_path: private_key_path.into(),
        }
    }

    /// Encrypts plaintext with the configured public key and returns the
    /// ciphertext as standard Base64 text.
    ///
    /// OAEP with SHA-256 caps a single block at `modulus - 66` bytes, so
    /// longer payloads are sealed block by block. Every ciphertext block is
    /// exactly the modulus size, which lets `decrypt` split the stream
    /// without any framing metadata.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let pem = read_key_file(&self.public_key_path)?;
        let public_key = RsaPublicKey::from_public_key_pem(&pem)
            .map_err(|e| CipherError::KeyParseFailed(format!("{e}")))?;

        let block_size = public_key.size().saturating_sub(OAEP_OVERHEAD).max(1);
        let mut encrypted = Vec::new();
        for chunk in plaintext.as_bytes().chunks(block_size) {
            let block = public_key
                .encrypt(&mut OsRng, Oaep::new::<Sha256>(), chunk)
                .map_err(|e| CipherError::EncryptionFailed(format!("{e}")))?;
            encrypted.extend_from_slice(&block);
        }
        Ok(STANDARD.encode(encrypted))
    }

    /// Decrypts Base64 ciphertext with the configured private key. Corrupt
    /// ciphertext and wrong-key padding mismatches both come back as
    /// `DecryptionFailed` rather than distinguishable faults.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        let pem = read_key_file(&self.private_key_path)?;
        let private_key = RsaPrivateKey::from_pkcs8_pem(&pem)
            .map_err(|e| CipherError::KeyParseFailed(format!("{e}")))?;

        let encrypted = STANDARD
            .decode(ciphertext.trim().as_bytes())
            .map_err(|e| CipherError::Base64DecodeFailed(format!("{e}")))?;

        let block_size = private_key.size();
        if encrypted.len() % block_size != 0 {
            return Err(CipherError::DecryptionFailed(
                "ciphertext length is not a whole number of blocks".to_string(),
            ));
        }

        let mut decrypted = Vec::new();
        for block in encrypted.chunks(block_size) {
            let plain = private_key
                .decrypt(Oaep::new::<Sha256>(), block)
                .map_err(|e| CipherError::DecryptionFailed(format!("{e}")))?;
            decrypted.extend_from_slice(&plain);
        }
        String::from_utf8(decrypted).map_err(|e| CipherError::InvalidUtf8(format!("{e}")))
    }
}

fn read_key_file(path: &Path) -> Result<String, CipherError> {
    fs::read_to_string(path).map_err(|e| {
        CipherError::KeyFileUnreadable(format!("{}: {e}", path.display()))
    })
}
