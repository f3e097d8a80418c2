//! The user store: owns the in-memory collection of registered users and
//! composes the codec and the asymmetric cipher for persistence. The backing
//! file is the durable copy of truth; the in-memory collection is a cache of
//! it between an explicit `load` and an explicit `save`.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::codec;
use crate::crypto::asymmetric::{AsymmetricCipher, CipherError};
use crate::crypto::hashing::sha256_hex;

const MIN_USERNAME_CHARS: usize = 5;
const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("users file io failed: {0}")]
    Io(String),
    #[error("user collection encoding failed")]
    Encode,
    #[error("cipher failed: {0}")]
    Cipher(String),
}

impl From<CipherError> for StoreError {
    fn from(value: CipherError) -> Self {
        StoreError::Cipher(format!("{value}"))
    }
}

/// A registered credential record. Immutable once created; the raw username
/// and password are hashed before the record exists and never stored.
///
/// `id` is the record's position in the collection at creation time, a
/// derived display value rather than a stable primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(rename = "usernameHash")]
    pub username_hash: String,
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
}

/// Encrypted at-rest collection of registered users.
///
/// The collection sits behind an internal mutex so one store instance can be
/// shared behind an `Arc` by concurrent callers; every method takes `&self`.
/// Mutation is append-only via [`add_user`](UserStore::add_user), and
/// mutations are NOT persisted automatically: callers batch adds and invoke
/// [`save`](UserStore::save) explicitly. Process state lost before a save
/// drops the unsaved users.
pub struct UserStore {
    path: PathBuf,
    cipher: AsymmetricCipher,
    users: Mutex<Vec<User>>,
}

impl UserStore {
    /// Creates an empty store backed by `path`. No file access happens until
    /// `load` or `save` is called.
    pub fn new(path: impl Into<PathBuf>, cipher: AsymmetricCipher) -> Self {
        Self {
            path: path.into(),
            cipher,
            users: Mutex::new(Vec::new()),
        }
    }

    /// Loads, decrypts, and decodes the backing file into memory.
    ///
    /// A missing file is created by saving the current (empty) collection
    /// first. A file that fails decryption or decoding is treated as corrupt:
    /// a warning is emitted and the file is overwritten with a fresh empty
    /// store, one shot, no retry. That recovery intentionally trades stored
    /// data for availability.
    pub fn load(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            self.save()?;
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))?;

        let decrypted = match self.cipher.decrypt(&raw) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "invalid users file found, overwritten");
                return self.reset_and_persist();
            }
        };

        let users = match codec::decode_users(&decrypted) {
            Some(users) => users,
            None => {
                warn!(path = %self.path.display(), "invalid users file found, overwritten");
                return self.reset_and_persist();
            }
        };

        *self.lock_users() = users;
        Ok(())
    }

    /// Encodes, encrypts, and writes the current collection, replacing the
    /// backing file whole. Unlike a silent-drop design, every failure comes
    /// back as an explicit `StoreError` so callers can tell a save was lost.
    pub fn save(&self) -> Result<(), StoreError> {
        let encoded = {
            let users = self.lock_users();
            codec::encode_users(&users).ok_or(StoreError::Encode)?
        };

        let ciphertext = self.cipher.encrypt(&encoded)?;
        fs::write(&self.path, ciphertext)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Validates, hashes, and appends a new user. Returns `false` without
    /// mutating anything when the username is blank or shorter than 5
    /// characters, the password is empty or shorter than 8, or the username
    /// is already registered. Does not persist; call `save` afterwards.
    pub fn add_user(&self, username: &str, password: &str) -> bool {
        if !is_user_valid(username, password) {
            return false;
        }

        let username_hash = sha256_hex(username.as_bytes());
        let mut users = self.lock_users();
        if users.iter().any(|u| u.username_hash == username_hash) {
            return false;
        }

        let user = User {
            id: users.len() as u64,
            username_hash,
            password_hash: sha256_hex(password.as_bytes()),
        };
        users.push(user);
        true
    }

    /// Number of registered users currently in memory.
    pub fn user_count(&self) -> usize {
        self.lock_users().len()
    }

    /// Snapshot of the in-memory collection, in registration order.
    pub fn users(&self) -> Vec<User> {
        self.lock_users().clone()
    }

    fn reset_and_persist(&self) -> Result<(), StoreError> {
        self.lock_users().clear();
        self.save()
    }

    fn lock_users(&self) -> MutexGuard<'_, Vec<User>> {
        // A poisoned lock only means another caller panicked mid-mutation;
        // the collection itself is still a valid Vec.
        match self.users.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn is_user_valid(username: &str, password: &str) -> bool {
    if username.trim().is_empty() || password.is_empty() {
        return false;
    }
    username.chars().count() >= MIN_USERNAME_CHARS
        && password.chars().count() >= MIN_PASSWORD_CHARS
}

#[cfg(test)]
mod tests {
    use super::{StoreError, UserStore};
    use crate::crypto::asymmetric::tests::cipher_with_keys;
    use crate::crypto::asymmetric::AsymmetricCipher;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> UserStore {
        let cipher = cipher_with_keys(dir.path());
        UserStore::new(dir.path().join("users.enc"), cipher)
    }

    #[test]
    fn accepts_valid_user_and_grows_by_one() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn rejects_invalid_shapes_without_mutation() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(!store.add_user("bob", "password1")); // username too short
        assert!(!store.add_user("alice123", "short")); // password too short
        assert!(!store.add_user("   ", "password1")); // blank username
        assert!(!store.add_user("alice123", "")); // empty password
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn rejects_duplicate_username() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        assert!(!store.add_user("alice123", "password2"));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn assigns_positional_ids_and_hex_hashes() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        assert!(store.add_user("bobby456", "password2"));

        let users = store.users();
        assert_eq!(users[0].id, 0);
        assert_eq!(users[1].id, 1);
        for user in &users {
            assert_eq!(user.username_hash.len(), 64);
            assert_eq!(user.password_hash.len(), 64);
        }
        assert_ne!(users[0].username_hash, users[1].username_hash);
    }

    #[test]
    fn save_then_load_round_trips_records() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        assert!(store.add_user("bobby456", "password2"));
        store.save().expect("save should succeed");

        let reopened = store_in(&dir);
        reopened.load().expect("load should succeed");
        assert_eq!(reopened.users(), store.users());
    }

    #[test]
    fn load_creates_missing_backing_file() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        let path = dir.path().join("users.enc");
        assert!(!path.exists());

        store.load().expect("load should succeed");
        assert!(path.exists());
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn corrupt_backing_file_self_heals_to_empty() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        store.save().expect("save should succeed");

        let path = dir.path().join("users.enc");
        fs::write(&path, "garbage that is not ciphertext").expect("corrupt file");

        let reopened = store_in(&dir);
        reopened.load().expect("self-heal should succeed");
        assert_eq!(reopened.user_count(), 0);

        // The overwrite left a valid empty store behind.
        let fresh = store_in(&dir);
        fresh.load().expect("load after self-heal should succeed");
        assert_eq!(fresh.user_count(), 0);
    }

    #[test]
    fn undecodable_plaintext_self_heals_to_empty() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        store.save().expect("save should succeed");

        // Decryption succeeds but the plaintext is not a user collection.
        let cipher = cipher_with_keys(dir.path());
        let ciphertext = cipher.encrypt("not a user list").expect("encryption should succeed");
        let path = dir.path().join("users.enc");
        fs::write(&path, ciphertext).expect("replace file");

        let reopened = store_in(&dir);
        reopened.load().expect("self-heal should succeed");
        assert_eq!(reopened.user_count(), 0);

        let fresh = store_in(&dir);
        fresh.load().expect("load after self-heal should succeed");
        assert_eq!(fresh.user_count(), 0);
    }

    #[test]
    fn truncated_ciphertext_also_self_heals() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.add_user("alice123", "password1"));
        store.save().expect("save should succeed");

        let path = dir.path().join("users.enc");
        let mut ciphertext = fs::read_to_string(&path).expect("read ciphertext");
        ciphertext.truncate(ciphertext.len() / 2);
        fs::write(&path, ciphertext).expect("truncate file");

        let reopened = store_in(&dir);
        reopened.load().expect("self-heal should succeed");
        assert_eq!(reopened.user_count(), 0);
    }

    #[test]
    fn save_reports_missing_key_material() {
        let dir = TempDir::new().expect("temp dir");
        let cipher = AsymmetricCipher::new(
            dir.path().join("missing_pub.pem"),
            dir.path().join("missing_priv.pem"),
        );
        let store = UserStore::new(dir.path().join("users.enc"), cipher);
        assert!(store.add_user("alice123", "password1"));

        let err = store.save().unwrap_err();
        assert!(matches!(err, StoreError::Cipher(_)));
        assert!(!dir.path().join("users.enc").exists());
    }
}
