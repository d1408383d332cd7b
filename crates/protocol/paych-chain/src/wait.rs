//! Waiting for message execution.

use tokio::time::{sleep, Instant};
use tracing::debug;

use paych_types::{MessageId, MessageLookup};

use crate::config::WaitConfig;
use crate::error::{ChainError, ChainResult};
use crate::retry::RetryPolicy;
use crate::traits::Chain;

/// Poll `chain` until message `id` has a receipt.
///
/// Polls back off exponentially from `poll_base` to `poll_max`. Transient
/// lookup errors are retried. Fails with [`ChainError::Timeout`] once
/// `config.timeout` has elapsed.
pub async fn wait_message<C: Chain + ?Sized>(
    chain: &C,
    id: &MessageId,
    config: &WaitConfig,
) -> ChainResult<MessageLookup> {
    let policy = RetryPolicy::from_wait_config(config);
    let deadline = Instant::now() + config.timeout;
    let mut poll: u32 = 0;

    loop {
        if let Some(lookup) = policy.execute(|| chain.message_lookup(id)).await? {
            debug!(message = %id, polls = poll + 1, "Message executed");
            return Ok(lookup);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ChainError::timeout(format!(
                "message {} not executed after {} ms",
                id,
                config.timeout.as_millis()
            )));
        }

        poll = poll.saturating_add(1);
        let delay = std::cmp::min(policy.delay_for_attempt(poll), deadline - now);
        debug!(message = %id, poll, ?delay, "Message pending");
        sleep(delay).await;
    }
}
