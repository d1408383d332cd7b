//! CLI command implementations.
//!
//! Every command parses its arguments before opening any state.

pub mod chain;
pub mod channel;
pub mod completions;
pub mod voucher;
pub mod wallet;

// Re-export command handlers
pub use channel::{collect, create, list, settle, status};
pub use completions::completions;
