//! Chain wrapper with failure injection.
//!
//! Delegates to an inner chain and can make pushes fail, make lookups fail
//! transiently, or hide receipts so waits time out.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use paych_chain::{Chain, ChainError, ChainResult};
use paych_crypto::Address;
use paych_types::{AccountState, ChannelActorState, Epoch, MessageId, MessageLookup, SignedMessage};

/// A `Chain` that forwards to another chain with injectable failures.
///
/// Cheap to clone; all clones share the same switches.
#[derive(Clone)]
pub struct MockChain {
    inner: Arc<dyn Chain>,
    unavailable: Arc<AtomicBool>,
    lookup_failures: Arc<AtomicU32>,
    hide_receipts: Arc<AtomicBool>,
    pushes: Arc<AtomicU32>,
}

impl MockChain {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn Chain>) -> Self {
        Self {
            inner,
            unavailable: Arc::new(AtomicBool::new(false)),
            lookup_failures: Arc::new(AtomicU32::new(0)),
            hide_receipts: Arc::new(AtomicBool::new(false)),
            pushes: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Make every push fail with `ChainError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `count` lookups with a transient error.
    pub fn fail_next_lookups(&self, count: u32) {
        self.lookup_failures.store(count, Ordering::SeqCst);
    }

    /// Report every message as pending.
    pub fn set_hide_receipts(&self, hide: bool) {
        self.hide_receipts.store(hide, Ordering::SeqCst);
    }

    /// Number of messages accepted by the inner chain.
    pub fn push_count(&self) -> u32 {
        self.pushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Chain for MockChain {
    async fn push_message(&self, message: SignedMessage) -> ChainResult<MessageId> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ChainError::unavailable("mock chain is down"));
        }
        let id = self.inner.push_message(message).await?;
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn message_lookup(&self, id: &MessageId) -> ChainResult<Option<MessageLookup>> {
        let remaining = self.lookup_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.lookup_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ChainError::unavailable("mock lookup failure"));
        }
        if self.hide_receipts.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.message_lookup(id).await
    }

    async fn account(&self, address: &Address) -> ChainResult<AccountState> {
        self.inner.account(address).await
    }

    async fn channel_state(&self, address: &Address) -> ChainResult<Option<ChannelActorState>> {
        self.inner.channel_state(address).await
    }

    async fn epoch(&self) -> ChainResult<Epoch> {
        self.inner.epoch().await
    }
}
