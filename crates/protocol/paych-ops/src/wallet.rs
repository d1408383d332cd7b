//! Signing keys available to the engine.

use std::collections::BTreeMap;

use paych_crypto::{account_address, generate_identity, Address, PrivateKey};
use paych_store::{KeyStore, StoreError};

use crate::error::{OpsError, OpsResult};

/// Source of account keys.
pub trait Wallet: Send + Sync {
    /// All addresses held, sorted.
    fn list(&self) -> OpsResult<Vec<Address>>;

    /// Whether the wallet holds `address`.
    fn contains(&self, address: &Address) -> OpsResult<bool>;

    /// Private key for `address`.
    fn signing_key(&self, address: &Address) -> OpsResult<PrivateKey>;

    /// Create a new key. Returns its address.
    fn generate(&mut self) -> OpsResult<Address>;
}

/// Wallet holding keys in memory only.
#[derive(Default)]
pub struct MemoryWallet {
    keys: BTreeMap<Address, PrivateKey>,
}

impl MemoryWallet {
    /// Empty wallet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing key. Returns its address.
    pub fn insert(&mut self, key: PrivateKey) -> Address {
        let address = account_address(&key.public_key());
        self.keys.insert(address, key);
        address
    }
}

impl Wallet for MemoryWallet {
    fn list(&self) -> OpsResult<Vec<Address>> {
        Ok(self.keys.keys().copied().collect())
    }

    fn contains(&self, address: &Address) -> OpsResult<bool> {
        Ok(self.keys.contains_key(address))
    }

    fn signing_key(&self, address: &Address) -> OpsResult<PrivateKey> {
        self.keys
            .get(address)
            .cloned()
            .ok_or(OpsError::KeyNotFound(*address))
    }

    fn generate(&mut self) -> OpsResult<Address> {
        let (key, _) = generate_identity();
        Ok(self.insert(key))
    }
}

/// Wallet backed by the encrypted keystore.
///
/// Listing needs no password; signing and generating do.
pub struct KeystoreWallet {
    keystore: KeyStore,
    password: Option<String>,
}

impl KeystoreWallet {
    /// Wallet over `keystore`, unlocked with `password` when given.
    pub fn new(keystore: KeyStore, password: Option<String>) -> Self {
        Self { keystore, password }
    }

    fn password(&self) -> OpsResult<&str> {
        self.password.as_deref().ok_or(OpsError::WalletLocked)
    }
}

impl Wallet for KeystoreWallet {
    fn list(&self) -> OpsResult<Vec<Address>> {
        Ok(self.keystore.list()?)
    }

    fn contains(&self, address: &Address) -> OpsResult<bool> {
        Ok(self.keystore.exists(address))
    }

    fn signing_key(&self, address: &Address) -> OpsResult<PrivateKey> {
        if !self.keystore.exists(address) {
            return Err(OpsError::KeyNotFound(*address));
        }
        match self.keystore.load(address, self.password()?) {
            Ok(key) => Ok(key),
            Err(StoreError::KeyNotFound(addr)) => Err(OpsError::KeyNotFound(addr)),
            Err(e) => Err(e.into()),
        }
    }

    fn generate(&mut self) -> OpsResult<Address> {
        let address = self.keystore.generate(self.password()?)?;
        tracing::info!(address = %address, "Generated new wallet key");
        Ok(address)
    }
}
