//! Configuration loader for the store. The config file only carries paths:
//! where the backing file lives and where the two PEM key files sit. Key
//! material itself is provisioned out of band and never appears here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::crypto::asymmetric::AsymmetricCipher;
use crate::store::UserStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Encrypted backing file holding the user collection.
    #[serde(rename = "usersPath", default = "default_users_path")]
    pub users_path: PathBuf,
    /// SPKI PEM file with the RSA public key used on save.
    #[serde(rename = "publicKeyPath", default = "default_public_key_path")]
    pub public_key_path: PathBuf,
    /// PKCS#8 PEM file with the RSA private key used on load.
    #[serde(rename = "privateKeyPath", default = "default_private_key_path")]
    pub private_key_path: PathBuf,
}

fn default_users_path() -> PathBuf {
    PathBuf::from("users.enc")
}

fn default_public_key_path() -> PathBuf {
    PathBuf::from("public_key.pem")
}

fn default_private_key_path() -> PathBuf {
    PathBuf::from("private_key.pem")
}

impl StoreConfig {
    /// Loads the JSON configuration file. Omitted keys fall back to files
    /// next to the working directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))
    }

    /// Wires up a store against the configured paths. The store starts empty;
    /// callers decide when to `load`.
    pub fn open_store(&self) -> UserStore {
        let cipher = AsymmetricCipher::new(&self.public_key_path, &self.private_key_path);
        UserStore::new(&self.users_path, cipher)
    }
}
