//! Data structures for paych.
//!
//! Type definitions with serialization support and no business logic.
//!
//! - [`amount`] - amounts and amount parsing
//! - [`voucher`] - signed vouchers
//! - [`channel`] - registry records and on-chain channel state
//! - [`message`] - chain messages, receipts and exit codes
//! - [`error`] - error codes shared with the CLI
//! - [`constants`] - defaults
//!
//! # Example
//!
//! ```
//! use paych_crypto::{Address, AddressKind};
//! use paych_types::{parse_amount, SignedVoucher};
//!
//! let channel = Address::new(AddressKind::Actor, [1u8; 20]);
//! let voucher = SignedVoucher::new(channel, 0, 1, parse_amount("250").unwrap());
//! assert!(!voucher.is_signed());
//! ```

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod amount;
pub mod channel;
pub mod constants;
pub mod error;
pub mod message;
pub mod voucher;

/// Lane identifier within a channel.
pub type Lane = u64;

/// Voucher or account nonce.
pub type Nonce = u64;

/// Chain height.
pub type Epoch = u64;

pub use amount::{parse_amount, Amount, AmountError};
pub use channel::{ChannelActorState, ChannelDirection, ChannelInfo, ChannelStatus, LaneState};
pub use constants::*;
pub use error::ErrorCode;
pub use message::{
    AccountState, ExitCode, Message, MessageId, MessageLookup, MessageReceipt, Method,
    SignedMessage,
};
pub use voucher::SignedVoucher;
