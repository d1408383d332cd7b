//! Chain messages, receipts and exit codes.

use paych_crypto::{Address, CryptoError, Hash, PublicKey, Signature};
use serde::{Deserialize, Serialize};

use crate::{Amount, Epoch, Nonce, SignedVoucher};

/// What a message asks the chain to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Create a channel from the sender to `Message::to`, funded by `value`.
    CreateChannel,
    /// Redeem a voucher on the channel at `Message::to`.
    UpdateChannelState { voucher: SignedVoucher },
    /// Start the settlement delay.
    Settle,
    /// Pay out a settled channel.
    Collect,
}

impl Method {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateChannel => "create_channel",
            Self::UpdateChannelState { .. } => "update_channel_state",
            Self::Settle => "settle",
            Self::Collect => "collect",
        }
    }
}

/// An unsigned chain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender account.
    pub from: Address,
    /// Recipient: the payee for `CreateChannel`, otherwise the channel.
    pub to: Address,
    /// Sender account nonce.
    pub nonce: Nonce,
    /// Funds moved with the message.
    pub value: Amount,
    /// Requested action.
    pub method: Method,
}

impl Message {
    /// Message with zero value.
    pub fn new(from: Address, to: Address, nonce: Nonce, method: Method) -> Self {
        Self {
            from,
            to,
            nonce,
            value: 0,
            method,
        }
    }

    /// Set the value carried by the message.
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// A message with the sender's key and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub message: Message,
    pub signer: PublicKey,
    pub signature: Signature,
}

/// Identifier of a pushed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Hash);

impl MessageId {
    /// Parse the hex form.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Hash::from_hex(s).map(Self)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result code of message execution.
///
/// Zero is success. Non-zero codes follow the actor error numbering
/// (16 and up); unknown codes are carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitCode(pub u32);

impl ExitCode {
    pub const OK: Self = Self(0);
    pub const ILLEGAL_ARGUMENT: Self = Self(16);
    pub const NOT_FOUND: Self = Self(17);
    pub const FORBIDDEN: Self = Self(18);
    pub const INSUFFICIENT_FUNDS: Self = Self(19);
    pub const ILLEGAL_STATE: Self = Self(20);
    pub const SERIALIZATION_ERROR: Self = Self(21);

    /// Whether execution succeeded.
    pub fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Symbolic name, if the code is a known one.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Ok"),
            16 => Some("IllegalArgument"),
            17 => Some("NotFound"),
            18 => Some("Forbidden"),
            19 => Some("InsufficientFunds"),
            20 => Some("IllegalState"),
            21 => Some("SerializationError"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of an executed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub exit_code: ExitCode,
    /// CBOR-encoded return value; the new channel address for `CreateChannel`.
    pub return_value: Vec<u8>,
    /// Epoch in which the message executed.
    pub epoch: Epoch,
}

/// A message found on chain together with its receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLookup {
    pub id: MessageId,
    pub message: Message,
    pub receipt: MessageReceipt,
}

/// Balance and nonce of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Amount,
    pub nonce: Nonce,
}
