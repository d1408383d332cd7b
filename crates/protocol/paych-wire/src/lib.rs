//! Wire formats for paych.
//!
//! - **CBOR**: deterministic encoding of every signed or hashed structure
//! - **Vouchers**: signing bytes, signatures and the base58 string form
//!   exchanged between payer and payee
//! - **Messages**: chain message signatures and message ids
//!
//! # Example
//!
//! ```
//! use paych_crypto::{generate_identity, Address, AddressKind};
//! use paych_types::SignedVoucher;
//! use paych_wire::{decode_voucher, encode_voucher, sign_voucher, verify_voucher_signature};
//!
//! let (private_key, public_key) = generate_identity();
//! let channel = Address::new(AddressKind::Actor, [1u8; 20]);
//! let voucher = sign_voucher(SignedVoucher::new(channel, 0, 1, 10), &private_key).unwrap();
//!
//! let encoded = encode_voucher(&voucher).unwrap();
//! let decoded = decode_voucher(&encoded).unwrap();
//! assert_eq!(decoded, voucher);
//! assert!(verify_voucher_signature(&decoded, &public_key));
//! ```

mod encoding;
mod error;
mod message;
mod voucher;

pub use encoding::{decode_payload, encode_payload};
pub use error::{DecodeError, EncodeError};
pub use message::{message_id, message_signing_bytes, sign_message, verify_message};
pub use voucher::{
    decode_voucher, encode_voucher, sign_voucher, verify_voucher_signature, voucher_signing_bytes,
};
