//! Command-line interface for payment channel vouchers.
//!
//! This crate provides the `paych` binary. It includes commands for:
//!
//! - **Channels**: create, list, status, settle, collect
//! - **Vouchers**: create, check, add, list, best-spendable, submit
//! - **Wallet**: new addresses, balances, devnet funding
//! - **Chain**: inspect and advance the local devnet
//!
//! # Quick Start
//!
//! ```bash
//! # Create and fund a payer address
//! paych wallet new
//! paych wallet fund pay1... 1000
//!
//! # Open a channel and pay through it
//! paych create pay1<from> pay1<to> 500
//! paych voucher create pay2<channel> 100
//! ```
//!
//! # Output Formats
//!
//! All commands support `--format` for output control:
//!
//! - `human` (default): Human-readable with colors
//! - `json`: Machine-readable JSON
//!
//! # Configuration
//!
//! Configuration is loaded from `<data dir>/config.toml`. Override with `--config`.

pub mod args;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod progress;
pub mod prompt;

pub use cli::{Cli, Commands, OutputFormatArg};
pub use config::CliConfig;
pub use context::CliContext;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
