//! Engine context for CLI operations.

use std::sync::Arc;

use paych_chain::LocalChain;
use paych_ops::{KeystoreWallet, OpsConfig, PaychManager};
use paych_store::{PaychState, PaychStateConfig};
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliResult;

/// Context containing all initialized components.
pub struct CliContext {
    /// The engine.
    pub manager: PaychManager,
    /// The local devnet, for commands that drive it directly.
    pub chain: Arc<LocalChain>,
    /// Configuration.
    pub config: CliConfig,
}

impl CliContext {
    /// Open local state, keystore and devnet.
    ///
    /// Without a password the wallet can list keys but not sign.
    pub fn open(config: CliConfig, password: Option<String>) -> CliResult<Self> {
        let base_dir = config.base_dir();

        // Open storage
        let state = PaychState::open(PaychStateConfig::new(&base_dir))?;
        let keystore = state.open_keystore()?;

        // Open the devnet
        let chain_db = config.chain_database();
        if let Some(parent) = chain_db.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let chain = Arc::new(LocalChain::open(&chain_db, config.chain_config())?);
        debug!(base_dir = %base_dir.display(), chain_db = %chain_db.display(), "Context opened");

        let wallet = KeystoreWallet::new(keystore, password);
        let ops_config = OpsConfig::default().with_wait(config.wait_config());
        let manager = PaychManager::new(state, chain.clone(), Box::new(wallet), ops_config)
            .with_faucet(chain.clone());

        Ok(Self {
            manager,
            chain,
            config,
        })
    }

    /// Context for read-only and non-signing commands.
    pub fn locked(config: CliConfig) -> CliResult<Self> {
        Self::open(config, None)
    }

    /// Context whose wallet can sign.
    ///
    /// `password` runs before anything is opened, so a missing password
    /// leaves the data directory untouched.
    pub fn unlocked(
        config: CliConfig,
        password: impl FnOnce() -> CliResult<String>,
    ) -> CliResult<Self> {
        Self::open(config, Some(password()?))
    }
}
