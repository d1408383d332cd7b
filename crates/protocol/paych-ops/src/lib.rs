//! Payment channel voucher management engine.
//!
//! This crate combines the store, evaluator, wire format and chain seam into
//! [`PaychManager`], which implements every operation the `paych` CLI calls.
//!
//! # Module Organization
//!
//! - [`error`] - Engine error types
//! - [`config`] - Engine configuration
//! - [`wallet`] - Signing keys: in memory or from the encrypted keystore
//! - [`manager`] - `PaychManager`
//!
//! # Operations Overview
//!
//! ## Channels
//!
//! - **create_channel**: fund a channel on chain and register it as outbound
//! - **list_channels** / **channel_status**
//! - **settle** / **collect**
//!
//! ## Vouchers
//!
//! - **create_voucher**: sign the next voucher in a lane, within the balance
//! - **check_voucher_valid** / **check_voucher_spendable**
//! - **add_voucher**: store a received voucher, registering the channel
//! - **list_vouchers** / **best_spendable**
//! - **submit_voucher**: redeem on chain and wait for the receipt
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use paych_chain::{ChainConfig, LocalChain};
//! use paych_ops::{MemoryWallet, OpsConfig, PaychManager};
//! use paych_store::{PaychState, PaychStateConfig};
//!
//! let chain = Arc::new(LocalChain::in_memory(ChainConfig::default())?);
//! let state = PaychState::open(PaychStateConfig::new("/tmp/paych"))?;
//! let mut wallet = MemoryWallet::new();
//! let from = wallet.generate()?;
//!
//! let mut manager = PaychManager::new(state, chain.clone(), Box::new(wallet), OpsConfig::default())
//!     .with_faucet(chain);
//! manager.fund(&from, 1_000).await?;
//! let channel = manager.create_channel(&from, &payee, 500).await?;
//! let voucher = manager.create_voucher(&channel, 100, 0, 0).await?;
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod wallet;

pub use config::OpsConfig;
pub use error::{OpsError, OpsResult};
pub use manager::{current_timestamp, ChannelStatusReport, PaychManager};
pub use wallet::{KeystoreWallet, MemoryWallet, Wallet};
