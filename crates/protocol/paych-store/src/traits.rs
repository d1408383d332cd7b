//! Storage trait definitions.

use std::collections::BTreeMap;

use paych_crypto::Address;
use paych_types::{Amount, ChannelInfo, Lane, MessageId, Nonce};

use crate::error::Result;
use crate::types::StoredVoucher;

/// Registry of locally known payment channels.
pub trait ChannelStore {
    /// Register a channel.
    ///
    /// Fails with `ChannelExists` if the address is already registered.
    fn insert(&mut self, info: &ChannelInfo) -> Result<()>;

    /// Look up a channel by address.
    fn get(&self, address: &Address) -> Result<Option<ChannelInfo>>;

    /// All channels, oldest first (ties broken by address).
    fn list(&self) -> Result<Vec<ChannelInfo>>;

    /// Whether a channel is registered.
    fn exists(&self, address: &Address) -> Result<bool>;
}

/// Signed vouchers per channel, keyed by `(channel, lane, nonce)`.
pub trait VoucherStore {
    /// Store a voucher.
    ///
    /// Fails with `VoucherExists` if the key is taken.
    fn insert(&mut self, voucher: &StoredVoucher) -> Result<()>;

    /// Look up one voucher.
    fn get(&self, channel: &Address, lane: Lane, nonce: Nonce) -> Result<Option<StoredVoucher>>;

    /// Vouchers of a channel, lane ascending then nonce ascending.
    fn list_for_channel(&self, channel: &Address) -> Result<Vec<StoredVoucher>>;

    /// Record that a voucher was redeemed by `message`.
    fn mark_submitted(
        &mut self,
        channel: &Address,
        lane: Lane,
        nonce: Nonce,
        message: &MessageId,
    ) -> Result<()>;

    /// Highest stored nonce in a lane.
    fn max_nonce(&self, channel: &Address, lane: Lane) -> Result<Option<Nonce>>;

    /// Highest stored amount in each lane of a channel.
    fn best_per_lane(&self, channel: &Address) -> Result<BTreeMap<Lane, Amount>>;

    /// Number of vouchers stored for a channel.
    fn count(&self, channel: &Address) -> Result<usize>;
}
