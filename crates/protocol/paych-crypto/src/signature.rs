//! Signature creation and verification.
//!
//! ```text
//! signature = Ed25519_Sign(private_key, H(message))
//! ```

use ed25519_dalek::{Signature as DalekSignature, Signer, Verifier, VerifyingKey};

use crate::hash::sha256;
use crate::{PrivateKey, PublicKey, Signature};

/// Sign a message with a private key.
///
/// The message is hashed first, then the hash is signed.
pub fn sign(private_key: &PrivateKey, message: &[u8]) -> Signature {
    let message_hash = sha256(message);
    let signing_key = private_key.to_signing_key();
    let sig: DalekSignature = signing_key.sign(&message_hash.0);
    Signature(sig.to_bytes())
}

/// Verify a signature against a public key and message.
///
/// Returns `false` for malformed keys as well as bad signatures.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let message_hash = sha256(message);

    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };

    let sig = DalekSignature::from_bytes(&signature.0);
    verifying_key.verify(&message_hash.0, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_identity;

    #[test]
    fn test_sign_verify() {
        let (private_key, public_key) = generate_identity();
        let signature = sign(&private_key, b"test message");
        assert!(verify(&public_key, b"test message", &signature));
    }

    #[test]
    fn test_wrong_key_fails() {
        let (private_key1, _) = generate_identity();
        let (_, public_key2) = generate_identity();
        let signature = sign(&private_key1, b"test message");
        assert!(!verify(&public_key2, b"test message", &signature));
    }

    #[test]
    fn test_tampered_message_fails() {
        let (private_key, public_key) = generate_identity();
        let signature = sign(&private_key, b"test message");
        assert!(!verify(&public_key, b"different message", &signature));
    }
}
