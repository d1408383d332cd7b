//! Chain and wait configuration.

use std::time::Duration;

use paych_types::{
    Epoch, DEFAULT_POLL_BASE_MS, DEFAULT_POLL_MAX_MS, DEFAULT_SETTLE_DELAY,
    DEFAULT_WAIT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};

/// Local chain parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Epochs between settle and the earliest collect.
    pub settle_delay: Epoch,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// How long and how often to poll for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Give up after this long.
    #[serde(with = "millis_serde")]
    pub timeout: Duration,
    /// First delay between polls.
    #[serde(with = "millis_serde")]
    pub poll_base: Duration,
    /// Maximum delay between polls.
    #[serde(with = "millis_serde")]
    pub poll_max: Duration,
    /// Attempts per lookup when the backend reports a transient error.
    pub lookup_attempts: u32,
}

impl WaitConfig {
    /// Build from millisecond values.
    pub fn from_millis(timeout_ms: u64, poll_base_ms: u64, poll_max_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            poll_base: Duration::from_millis(poll_base_ms),
            poll_max: Duration::from_millis(poll_max_ms),
            ..Self::default()
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_base: Duration::from_millis(DEFAULT_POLL_BASE_MS),
            poll_max: Duration::from_millis(DEFAULT_POLL_MAX_MS),
            lookup_attempts: 3,
        }
    }
}

/// Serde helper for Duration as milliseconds.
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
