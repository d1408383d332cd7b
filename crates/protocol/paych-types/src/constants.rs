//! Constants shared across crates.

use crate::Epoch;

/// Epochs between a settle message and the earliest collect.
pub const DEFAULT_SETTLE_DELAY: Epoch = 10;

/// Default time to wait for a message to be executed (milliseconds).
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default first polling delay while waiting for a message (milliseconds).
pub const DEFAULT_POLL_BASE_MS: u64 = 50;

/// Default maximum polling delay while waiting for a message (milliseconds).
pub const DEFAULT_POLL_MAX_MS: u64 = 2_000;

/// Default lane for new vouchers.
pub const DEFAULT_LANE: u64 = 0;
