//! Token amounts.

use thiserror::Error;

/// Amount in base units.
pub type Amount = u64;

/// Why an amount string was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Nothing to parse.
    #[error("empty amount")]
    Empty,

    /// A character other than an ASCII digit.
    #[error("invalid character '{0}' in amount")]
    InvalidCharacter(char),

    /// Larger than the maximum representable amount.
    #[error("amount overflows {}", u64::MAX)]
    Overflow,
}

/// Parse a decimal amount string.
///
/// Only plain base-10 digits are accepted: no sign, fraction or separators.
///
/// # Example
/// ```
/// use paych_types::{parse_amount, AmountError};
///
/// assert_eq!(parse_amount("1000"), Ok(1000));
/// assert_eq!(parse_amount("-5"), Err(AmountError::InvalidCharacter('-')));
/// ```
pub fn parse_amount(s: &str) -> Result<Amount, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }
    s.parse::<Amount>().map_err(|_| AmountError::Overflow)
}
