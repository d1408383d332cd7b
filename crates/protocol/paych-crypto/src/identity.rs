//! Keypair generation and address derivation.
//!
//! ```text
//! AccountAddress = H(0x00 || public_key)[0:20]
//! ActorAddress   = H(0x05 || creator_payload || creator_nonce as u64be)[0:20]
//! ```

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use crate::address::{Address, AddressKind, ADDRESS_PAYLOAD_LEN};
use crate::hash::domain_hash;
use crate::{PrivateKey, PublicKey};

const DOMAIN_KEY: u8 = 0x00;
const DOMAIN_ACTOR: u8 = 0x05;

/// Generate a new Ed25519 keypair from the OS random number generator.
pub fn generate_identity() -> (PrivateKey, PublicKey) {
    let mut csprng = OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let verifying_key = signing_key.verifying_key();

    let private_key = PrivateKey::from_signing_key(&signing_key);
    let public_key = PublicKey(verifying_key.to_bytes());

    (private_key, public_key)
}

/// Derive the account address controlled by a public key.
///
/// # Example
/// ```
/// use paych_crypto::{account_address, generate_identity, AddressKind};
///
/// let (_, public_key) = generate_identity();
/// let addr = account_address(&public_key);
/// assert_eq!(addr.kind(), AddressKind::Account);
/// assert!(addr.to_string().starts_with("pay1"));
/// ```
pub fn account_address(public_key: &PublicKey) -> Address {
    let hash = domain_hash(DOMAIN_KEY, &public_key.0);
    Address::new(AddressKind::Account, truncate(&hash.0))
}

/// Derive the address of an actor created by `creator` at account nonce `nonce`.
///
/// Two creations by the same account never share a nonce, so the
/// resulting addresses are unique.
pub fn actor_address(creator: &Address, nonce: u64) -> Address {
    let mut data = Vec::with_capacity(ADDRESS_PAYLOAD_LEN + 8);
    data.extend_from_slice(creator.payload());
    data.extend_from_slice(&nonce.to_be_bytes());
    let hash = domain_hash(DOMAIN_ACTOR, &data);
    Address::new(AddressKind::Actor, truncate(&hash.0))
}

fn truncate(hash: &[u8; 32]) -> [u8; ADDRESS_PAYLOAD_LEN] {
    let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
    payload.copy_from_slice(&hash[..ADDRESS_PAYLOAD_LEN]);
    payload
}
