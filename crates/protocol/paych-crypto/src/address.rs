//! Account and actor addresses.
//!
//! Human-readable format: a four-character prefix followed by the base58
//! encoding of the 20-byte payload.
//!
//! | kind    | prefix | derived from |
//! |---------|--------|--------------|
//! | Account | `pay1` | public key   |
//! | Actor   | `pay2` | creator + nonce |
//!
//! Binary format (CBOR, storage): `kind byte || payload` (21 bytes).

use std::str::FromStr;

use crate::error::CryptoError;

/// Length of an address payload in bytes.
pub const ADDRESS_PAYLOAD_LEN: usize = 20;

const ACCOUNT_PREFIX: &str = "pay1";
const ACTOR_PREFIX: &str = "pay2";

/// What an address points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AddressKind {
    /// Key-controlled account.
    Account = 1,
    /// On-chain actor (payment channel).
    Actor = 2,
}

impl AddressKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Account => ACCOUNT_PREFIX,
            Self::Actor => ACTOR_PREFIX,
        }
    }

    fn from_u8(value: u8) -> Result<Self, CryptoError> {
        match value {
            1 => Ok(Self::Account),
            2 => Ok(Self::Actor),
            other => Err(CryptoError::UnknownAddressKind(other)),
        }
    }
}

/// A chain address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    kind: AddressKind,
    payload: [u8; ADDRESS_PAYLOAD_LEN],
}

impl Address {
    /// Create an address from its parts.
    pub fn new(kind: AddressKind, payload: [u8; ADDRESS_PAYLOAD_LEN]) -> Self {
        Self { kind, payload }
    }

    /// The address kind.
    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    /// The 20-byte payload.
    pub fn payload(&self) -> &[u8; ADDRESS_PAYLOAD_LEN] {
        &self.payload
    }

    /// True for key-controlled accounts.
    pub fn is_account(&self) -> bool {
        self.kind == AddressKind::Account
    }

    /// True for actors such as payment channels.
    pub fn is_actor(&self) -> bool {
        self.kind == AddressKind::Actor
    }

    /// Binary form: kind byte followed by the payload.
    pub fn to_bytes(&self) -> [u8; ADDRESS_PAYLOAD_LEN + 1] {
        let mut out = [0u8; ADDRESS_PAYLOAD_LEN + 1];
        out[0] = self.kind as u8;
        out[1..].copy_from_slice(&self.payload);
        out
    }

    /// Parse the binary form produced by [`Address::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != ADDRESS_PAYLOAD_LEN + 1 {
            return Err(CryptoError::InvalidLength {
                expected: ADDRESS_PAYLOAD_LEN + 1,
                actual: bytes.len(),
            });
        }
        let kind = AddressKind::from_u8(bytes[0])?;
        let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
        payload.copy_from_slice(&bytes[1..]);
        Ok(Self { kind, payload })
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    /// Parse a `pay1…` / `pay2…` string.
    ///
    /// # Errors
    /// - `InvalidAddressPrefix` if the prefix is neither `pay1` nor `pay2`
    /// - `InvalidAddressFormat` if nothing follows the prefix
    /// - `InvalidBase58` if the base58 decoding fails
    /// - `InvalidLength` if the payload isn't 20 bytes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = if s.starts_with(ACCOUNT_PREFIX) {
            AddressKind::Account
        } else if s.starts_with(ACTOR_PREFIX) {
            AddressKind::Actor
        } else {
            let prefix: String = s.chars().take(4).collect();
            return Err(CryptoError::InvalidAddressPrefix(prefix));
        };

        let base58_part = &s[kind.prefix().len()..];
        if base58_part.is_empty() {
            return Err(CryptoError::InvalidAddressFormat(
                "missing data after prefix".to_string(),
            ));
        }

        let decoded = bs58::decode(base58_part)
            .into_vec()
            .map_err(|e| CryptoError::InvalidBase58(e.to_string()))?;

        if decoded.len() != ADDRESS_PAYLOAD_LEN {
            return Err(CryptoError::InvalidLength {
                expected: ADDRESS_PAYLOAD_LEN,
                actual: decoded.len(),
            });
        }

        let mut payload = [0u8; ADDRESS_PAYLOAD_LEN];
        payload.copy_from_slice(&decoded);
        Ok(Self { kind, payload })
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.kind.prefix(),
            bs58::encode(&self.payload).into_string()
        )
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{account_address, actor_address, generate_identity};

    #[test]
    fn test_string_roundtrip() {
        let (_, public_key) = generate_identity();
        let account = account_address(&public_key);
        let actor = actor_address(&account, 7);

        assert_eq!(account.to_string().parse::<Address>().unwrap(), account);
        assert_eq!(actor.to_string().parse::<Address>().unwrap(), actor);
        assert!(actor.to_string().starts_with("pay2"));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let addr = Address::new(AddressKind::Actor, [9u8; ADDRESS_PAYLOAD_LEN]);
        assert_eq!(Address::from_bytes(&addr.to_bytes()).unwrap(), addr);
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(matches!(
            "f01234".parse::<Address>(),
            Err(CryptoError::InvalidAddressPrefix(p)) if p == "f012"
        ));
        assert!(matches!(
            "".parse::<Address>(),
            Err(CryptoError::InvalidAddressPrefix(_))
        ));
    }

    #[test]
    fn test_missing_payload() {
        assert!(matches!(
            "pay1".parse::<Address>(),
            Err(CryptoError::InvalidAddressFormat(_))
        ));
    }

    #[test]
    fn test_invalid_base58() {
        // '0' and 'l' are not in the base58 alphabet
        assert!(matches!(
            "pay10l0l".parse::<Address>(),
            Err(CryptoError::InvalidBase58(_))
        ));
    }

    #[test]
    fn test_wrong_length() {
        let short = format!("pay1{}", bs58::encode([1u8; 5]).into_string());
        assert!(matches!(
            short.parse::<Address>(),
            Err(CryptoError::InvalidLength {
                expected: 20,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_unknown_kind_byte() {
        let mut bytes = [0u8; ADDRESS_PAYLOAD_LEN + 1];
        bytes[0] = 9;
        assert!(matches!(
            Address::from_bytes(&bytes),
            Err(CryptoError::UnknownAddressKind(9))
        ));
    }
}
