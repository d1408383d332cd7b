//! Chain message signing and message ids.

use paych_crypto::{domain_hash, sign, verify, PrivateKey};
use paych_types::{Message, MessageId, SignedMessage};

use crate::encoding::encode_payload;
use crate::error::EncodeError;

/// Domain separator for message signatures.
const DOMAIN_MESSAGE_SIGNING: u8 = 0x01;

/// Domain separator for message ids.
const DOMAIN_MESSAGE_ID: u8 = 0x04;

/// Bytes covered by a message signature: `0x01 || CBOR(message)`.
pub fn message_signing_bytes(message: &Message) -> Result<Vec<u8>, EncodeError> {
    let cbor = encode_payload(message)?;
    let mut bytes = Vec::with_capacity(cbor.len() + 1);
    bytes.push(DOMAIN_MESSAGE_SIGNING);
    bytes.extend_from_slice(&cbor);
    Ok(bytes)
}

/// Sign a message with the sender's key.
pub fn sign_message(message: Message, private_key: &PrivateKey) -> Result<SignedMessage, EncodeError> {
    let bytes = message_signing_bytes(&message)?;
    let signature = sign(private_key, &bytes);
    Ok(SignedMessage {
        message,
        signer: private_key.public_key(),
        signature,
    })
}

/// Check the signature against the embedded signer key.
pub fn verify_message(signed: &SignedMessage) -> bool {
    match message_signing_bytes(&signed.message) {
        Ok(bytes) => verify(&signed.signer, &bytes, &signed.signature),
        Err(_) => false,
    }
}

/// Id of a signed message: `H(0x04 || CBOR(signed message))`.
pub fn message_id(signed: &SignedMessage) -> Result<MessageId, EncodeError> {
    let cbor = encode_payload(signed)?;
    Ok(MessageId(domain_hash(DOMAIN_MESSAGE_ID, &cbor)))
}
