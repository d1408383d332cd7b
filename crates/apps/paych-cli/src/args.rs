//! Positional argument parsing.
//!
//! Channel and voucher commands take raw positional arguments and check
//! their count themselves, so each command reports its own usage message.
//! Everything here runs before any state is opened.

use paych_crypto::Address;
use paych_types::{parse_amount, Amount, SignedVoucher};
use paych_wire::decode_voucher;

use crate::error::{CliError, CliResult};

/// Require exactly `count` arguments, failing with `message` otherwise.
pub fn expect_args<'a>(args: &'a [String], count: usize, message: &str) -> CliResult<&'a [String]> {
    if args.len() != count {
        return Err(CliError::usage(message));
    }
    Ok(args)
}

/// Parse an address, reporting the parser's own message.
pub fn parse_address(s: &str) -> CliResult<Address> {
    s.parse()
        .map_err(|e: paych_crypto::CryptoError| CliError::InvalidAddress(e.to_string()))
}

/// Parse an address, naming which one failed.
pub fn parse_named_address(s: &str, name: &str) -> CliResult<Address> {
    s.parse().map_err(|e: paych_crypto::CryptoError| {
        CliError::InvalidAddress(format!("failed to parse {} address: {}", name, e))
    })
}

/// Parse an amount, reporting the parser's own message.
pub fn parse_amount_arg(s: &str) -> CliResult<Amount> {
    parse_amount(s).map_err(|e| CliError::InvalidAmount(e.to_string()))
}

/// Decode a voucher string.
pub fn parse_voucher(s: &str) -> CliResult<SignedVoucher> {
    decode_voucher(s).map_err(|e| CliError::InvalidVoucher(e.to_string()))
}

/// `create <from> <to> <amount>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

impl CreateArgs {
    pub fn parse(args: &[String]) -> CliResult<Self> {
        let args = expect_args(args, 3, "must pass three arguments: <from> <to> <amount>")?;
        let from = parse_named_address(&args[0], "from")?;
        let to = parse_named_address(&args[1], "to")?;
        let amount = parse_amount(&args[2])
            .map_err(|e| CliError::InvalidAmount(format!("parsing amount failed: {}", e)))?;
        Ok(Self { from, to, amount })
    }
}

/// `voucher create <channel> <amount>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherCreateArgs {
    pub channel: Address,
    pub amount: Amount,
}

impl VoucherCreateArgs {
    pub fn parse(args: &[String]) -> CliResult<Self> {
        let args = expect_args(args, 2, "must pass two arguments: <channel> <amount>")?;
        Ok(Self {
            channel: parse_address(&args[0])?,
            amount: parse_amount_arg(&args[1])?,
        })
    }
}

/// `<channel> <voucher>` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelVoucherArgs {
    pub channel: Address,
    pub voucher: SignedVoucher,
}

impl ChannelVoucherArgs {
    pub fn parse(args: &[String], message: &str) -> CliResult<Self> {
        let args = expect_args(args, 2, message)?;
        Ok(Self {
            channel: parse_address(&args[0])?,
            voucher: parse_voucher(&args[1])?,
        })
    }
}

/// A single `<channel>` argument.
pub fn parse_channel_arg(args: &[String]) -> CliResult<Address> {
    let args = expect_args(args, 1, "must pass payment channel address")?;
    parse_address(&args[0])
}
