//! SHA-256 hashing with domain separation.
//!
//! ```text
//! DomainHash(domain, data) = H(domain || data)
//! ```
//!
//! Domains in use across the workspace:
//!
//! | byte | use |
//! |------|-----|
//! | 0x00 | account address from public key |
//! | 0x01 | message signing bytes |
//! | 0x03 | voucher signing bytes |
//! | 0x04 | message id |
//! | 0x05 | actor address from creator and nonce |

use sha2::{Digest, Sha256};

use crate::Hash;

/// Plain SHA-256 of the input.
pub fn sha256(data: &[u8]) -> Hash {
    let result: [u8; 32] = Sha256::digest(data).into();
    Hash(result)
}

/// SHA-256 of `domain || data`.
///
/// # Example
/// ```
/// use paych_crypto::{domain_hash, sha256};
///
/// assert_ne!(domain_hash(0x03, b"x"), sha256(b"x"));
/// ```
pub fn domain_hash(domain: u8, data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([domain]);
    hasher.update(data);
    let result: [u8; 32] = hasher.finalize().into();
    Hash(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_deterministic() {
        assert_eq!(sha256(b"test"), sha256(b"test"));
        assert_ne!(sha256(b"test1"), sha256(b"test2"));
    }

    #[test]
    fn test_domains_do_not_collide() {
        let data = [0u8; 32];
        assert_ne!(domain_hash(0x03, &data), domain_hash(0x04, &data));
        assert_ne!(domain_hash(0x00, &data), sha256(&data));
    }
}
