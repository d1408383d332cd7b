//! Chain trait definitions.

use async_trait::async_trait;
use paych_crypto::Address;
use paych_types::{
    AccountState, Amount, ChannelActorState, Epoch, MessageId, MessageLookup, SignedMessage,
};

use crate::error::ChainResult;

/// The chain the engine talks to.
///
/// Implementations:
/// - [`LocalChain`](crate::LocalChain): single-node SQLite devnet
/// - test doubles in `paych-test-utils`
#[async_trait]
pub trait Chain: Send + Sync {
    /// Submit a signed message.
    ///
    /// Fails without producing a receipt if the message is rejected
    /// (bad signature, wrong sender, wrong nonce).
    async fn push_message(&self, message: SignedMessage) -> ChainResult<MessageId>;

    /// Look up an executed message and its receipt.
    ///
    /// Returns `None` while the message is not yet executed.
    async fn message_lookup(&self, id: &MessageId) -> ChainResult<Option<MessageLookup>>;

    /// Balance and next nonce of an account. Unknown accounts are empty.
    async fn account(&self, address: &Address) -> ChainResult<AccountState>;

    /// State of a payment channel actor.
    async fn channel_state(&self, address: &Address) -> ChainResult<Option<ChannelActorState>>;

    /// Current chain height.
    async fn epoch(&self) -> ChainResult<Epoch>;
}

/// Development faucet.
#[async_trait]
pub trait Faucet: Send + Sync {
    /// Credit `amount` to `address`. Returns the new balance.
    async fn fund(&self, address: &Address, amount: Amount) -> ChainResult<Amount>;
}
