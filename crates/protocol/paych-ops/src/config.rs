//! Configuration for the engine.

use paych_chain::WaitConfig;

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct OpsConfig {
    /// How long to wait for pushed messages to execute.
    pub wait: WaitConfig,
}

impl OpsConfig {
    /// Set the wait configuration.
    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }
}
