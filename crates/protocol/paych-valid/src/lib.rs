//! Voucher evaluation rules for paych.
//!
//! Pure functions over a voucher and the on-chain channel state; no I/O.
//!
//! - [`validate_voucher`]: could this voucher be redeemed now?
//! - [`check_spendable`]: validity plus time lock and lane supersession
//! - [`select_best_spendable`]: highest-amount spendable voucher
//! - [`redeemed_total_after`]: the redemption arithmetic the chain actor
//!   applies, exposed so both sides agree

mod error;
mod redeem;
mod voucher;

pub use error::{NotSpendable, ValidationResult};
pub use redeem::redeemed_total_after;
pub use voucher::{check_spendable, select_best_spendable, validate_voucher};
