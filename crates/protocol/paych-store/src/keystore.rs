//! Encrypted key storage.
//!
//! One file per account address under the keystore directory. Private keys
//! are encrypted at rest using AES-256-GCM with a key derived from a user
//! password using Argon2id.
//!
//! ```text
//! keystore/
//! ├── pay1<base58>.key
//! └── pay1<base58>.key
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use paych_crypto::{account_address, generate_identity, Address, PrivateKey, PublicKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Nonce length for AES-GCM.
const NONCE_LEN: usize = 12;

/// Key file extension.
const KEY_EXT: &str = "key";

/// On-disk key file.
#[derive(Serialize, Deserialize)]
struct StoredKey {
    /// Address the key controls.
    address: Address,
    /// Public key, readable without the password.
    public_key: PublicKey,
    /// Argon2 salt (PHC base64).
    salt: String,
    /// AES-GCM nonce (base58).
    nonce: String,
    /// Encrypted private key (base58).
    ciphertext: String,
}

/// Encrypted keystore for account keys.
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Open a keystore rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, address: &Address) -> PathBuf {
        self.dir.join(format!("{}.{}", address, KEY_EXT))
    }

    /// Whether a key is stored for `address`.
    pub fn exists(&self, address: &Address) -> bool {
        self.key_path(address).exists()
    }

    /// Generate, encrypt and store a new key. Returns its address.
    pub fn generate(&self, password: &str) -> Result<Address> {
        let (private_key, _) = generate_identity();
        self.import(&private_key, password)
    }

    /// Encrypt and store an existing private key. Returns its address.
    pub fn import(&self, private_key: &PrivateKey, password: &str) -> Result<Address> {
        let public_key = private_key.public_key();
        let address = account_address(&public_key);
        if self.exists(&address) {
            return Err(StoreError::KeyExists(address));
        }

        let salt = SaltString::generate(&mut OsRng);
        let encryption_key = derive_key(password, &salt)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::Rng::fill(&mut OsRng, &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = Aes256Gcm::new_from_slice(&encryption_key)
            .map_err(|e| StoreError::encryption(format!("Cipher init failed: {}", e)))?;
        let ciphertext = cipher
            .encrypt(nonce, private_key.as_bytes().as_ref())
            .map_err(|e| StoreError::encryption(format!("Encryption failed: {}", e)))?;

        let stored = StoredKey {
            address,
            public_key,
            salt: salt.to_string(),
            nonce: bs58::encode(nonce_bytes).into_string(),
            ciphertext: bs58::encode(ciphertext).into_string(),
        };

        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(self.key_path(&address), json)?;

        tracing::info!(address = %address, "Key stored");
        Ok(address)
    }

    /// Decrypt the private key for `address`.
    pub fn load(&self, address: &Address, password: &str) -> Result<PrivateKey> {
        let stored = self.read(address)?;

        let salt = SaltString::from_b64(&stored.salt)
            .map_err(|e| StoreError::encryption(format!("Invalid salt: {}", e)))?;
        let encryption_key = derive_key(password, &salt)?;

        let nonce_bytes = decode_field(&stored.nonce, "nonce")?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(StoreError::invalid_data("Invalid nonce length"));
        }
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = decode_field(&stored.ciphertext, "ciphertext")?;

        let cipher = Aes256Gcm::new_from_slice(&encryption_key)
            .map_err(|e| StoreError::encryption(format!("Cipher init failed: {}", e)))?;
        let plaintext = cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| StoreError::WrongPassword(*address))?;

        let key_bytes: [u8; 32] = plaintext
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::encryption("Invalid decrypted key length"))?;
        let private_key = PrivateKey::from_bytes(key_bytes);

        if private_key.public_key() != stored.public_key {
            return Err(StoreError::invalid_data(format!(
                "Key file for {} does not match its public key",
                address
            )));
        }
        Ok(private_key)
    }

    /// Public key for `address`, without the password.
    pub fn public_key(&self, address: &Address) -> Result<PublicKey> {
        Ok(self.read(address)?.public_key)
    }

    /// All stored addresses, sorted.
    pub fn list(&self) -> Result<Vec<Address>> {
        let mut addresses = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<Address>() {
                Ok(address) => addresses.push(address),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable key file");
                }
            }
        }
        addresses.sort();
        Ok(addresses)
    }

    /// Delete the key for `address`. Irreversible.
    pub fn delete(&self, address: &Address) -> Result<()> {
        if !self.exists(address) {
            return Err(StoreError::KeyNotFound(*address));
        }
        fs::remove_file(self.key_path(address))?;
        Ok(())
    }

    fn read(&self, address: &Address) -> Result<StoredKey> {
        let path = self.key_path(address);
        if !path.exists() {
            return Err(StoreError::KeyNotFound(*address));
        }
        let contents = fs::read_to_string(path)?;
        let stored: StoredKey = serde_json::from_str(&contents)?;
        if stored.address != *address {
            return Err(StoreError::invalid_data(format!(
                "Key file for {} names {}",
                address, stored.address
            )));
        }
        Ok(stored)
    }
}

/// Derive a 32-byte AES key from the password with Argon2id.
fn derive_key(password: &str, salt: &SaltString) -> Result<[u8; 32]> {
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), salt)
        .map_err(|e| StoreError::encryption(format!("Key derivation failed: {}", e)))?;

    let hash_bytes = password_hash
        .hash
        .ok_or_else(|| StoreError::encryption("Failed to extract hash bytes"))?;
    let key_bytes = hash_bytes.as_bytes();

    if key_bytes.len() < 32 {
        return Err(StoreError::encryption("Derived key too short"));
    }
    let mut encryption_key = [0u8; 32];
    encryption_key.copy_from_slice(&key_bytes[..32]);
    Ok(encryption_key)
}

fn decode_field(value: &str, name: &str) -> Result<Vec<u8>> {
    bs58::decode(value)
        .into_vec()
        .map_err(|e| StoreError::invalid_data(format!("Invalid {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::new(temp_dir.path()).unwrap();

        let address = store.generate("test_password_123").unwrap();
        assert!(store.exists(&address));

        let private_key = store.load(&address, "test_password_123").unwrap();
        assert_eq!(account_address(&private_key.public_key()), address);
        assert_eq!(store.public_key(&address).unwrap(), private_key.public_key());
    }

    #[test]
    fn test_wrong_password() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::new(temp_dir.path()).unwrap();

        let address = store.generate("correct_password").unwrap();
        assert!(matches!(
            store.load(&address, "wrong_password"),
            Err(StoreError::WrongPassword(a)) if a == address
        ));
    }

    #[test]
    fn test_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::new(temp_dir.path()).unwrap();
        let (_, public_key) = generate_identity();
        let address = account_address(&public_key);

        assert!(matches!(
            store.load(&address, "pw"),
            Err(StoreError::KeyNotFound(_))
        ));
        assert!(matches!(store.delete(&address), Err(StoreError::KeyNotFound(_))));
    }

    #[test]
    fn test_import_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::new(temp_dir.path()).unwrap();
        let (private_key, _) = generate_identity();

        store.import(&private_key, "pw").unwrap();
        assert!(matches!(
            store.import(&private_key, "pw"),
            Err(StoreError::KeyExists(_))
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyStore::new(temp_dir.path()).unwrap();

        let a = store.generate("pw").unwrap();
        let b = store.generate("pw").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(store.list().unwrap(), expected);

        store.delete(&a).unwrap();
        assert_eq!(store.list().unwrap(), vec![b]);
    }
}
