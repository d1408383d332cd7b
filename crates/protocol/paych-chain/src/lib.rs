//! Chain seam for paych.
//!
//! The engine talks to a chain only through the [`Chain`] trait. The
//! shipped implementation is [`LocalChain`], a single-node SQLite devnet
//! that executes every message as soon as it is pushed:
//!
//! - push-time checks (signature, sender, nonce) reject a message outright
//! - an accepted message runs in its own epoch and always gets a receipt
//! - the payment channel rules live in [`actor`]
//!
//! [`wait_message`] polls for a receipt with exponential backoff.
//!
//! # Example
//!
//! ```
//! use paych_chain::{Chain, ChainConfig, Faucet, LocalChain};
//! use paych_crypto::{account_address, generate_identity};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let chain = LocalChain::in_memory(ChainConfig::default()).unwrap();
//! let (_, public_key) = generate_identity();
//! let address = account_address(&public_key);
//!
//! chain.fund(&address, 1_000).await.unwrap();
//! assert_eq!(chain.account(&address).await.unwrap().balance, 1_000);
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod error;
pub mod local;
pub mod retry;
pub mod traits;
pub mod wait;

pub use actor::{ActorError, ActorResult, Payout};
pub use config::{ChainConfig, WaitConfig};
pub use error::{ChainError, ChainResult};
pub use local::LocalChain;
pub use retry::RetryPolicy;
pub use traits::{Chain, Faucet};
pub use wait::wait_message;

/// Database file name of the local chain inside the data directory.
pub const CHAIN_DB_FILE: &str = "chain.db";
