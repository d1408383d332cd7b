//! Voucher signing and the voucher string form.
//!
//! ```text
//! signing bytes = 0x03 || CBOR(voucher with signature = None)
//! signature     = Ed25519(SHA-256(signing bytes))
//! string form   = base58(CBOR(voucher))
//! ```

use paych_crypto::{sign, verify, PrivateKey, PublicKey};
use paych_types::SignedVoucher;

use crate::encoding::{decode_payload, encode_payload};
use crate::error::{DecodeError, EncodeError};

/// Domain separator for voucher signatures.
const DOMAIN_VOUCHER: u8 = 0x03;

/// Bytes covered by a voucher signature.
pub fn voucher_signing_bytes(voucher: &SignedVoucher) -> Result<Vec<u8>, EncodeError> {
    let cbor = encode_payload(&voucher.unsigned())?;
    let mut bytes = Vec::with_capacity(cbor.len() + 1);
    bytes.push(DOMAIN_VOUCHER);
    bytes.extend_from_slice(&cbor);
    Ok(bytes)
}

/// Sign a voucher, replacing any existing signature.
pub fn sign_voucher(
    mut voucher: SignedVoucher,
    private_key: &PrivateKey,
) -> Result<SignedVoucher, EncodeError> {
    let bytes = voucher_signing_bytes(&voucher)?;
    voucher.signature = Some(sign(private_key, &bytes));
    Ok(voucher)
}

/// Check the voucher's signature against `public_key`.
///
/// Unsigned vouchers and vouchers that cannot be encoded never verify.
pub fn verify_voucher_signature(voucher: &SignedVoucher, public_key: &PublicKey) -> bool {
    let Some(signature) = voucher.signature.as_ref() else {
        return false;
    };
    match voucher_signing_bytes(voucher) {
        Ok(bytes) => verify(public_key, &bytes, signature),
        Err(_) => false,
    }
}

/// Encode a voucher to its string form.
pub fn encode_voucher(voucher: &SignedVoucher) -> Result<String, EncodeError> {
    let cbor = encode_payload(voucher)?;
    Ok(bs58::encode(cbor).into_string())
}

/// Decode a voucher from its string form.
pub fn decode_voucher(s: &str) -> Result<SignedVoucher, DecodeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DecodeError::Empty);
    }
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| DecodeError::InvalidEncoding(e.to_string()))?;
    decode_payload(&bytes)
}
