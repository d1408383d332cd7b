//! Wallet commands.

use crate::args::{parse_address, parse_amount_arg};
use crate::config::CliConfig;
use crate::context::CliContext;
use crate::error::CliResult;
use crate::output::{BalanceOutput, NewAddressOutput, OutputFormat, Render, WalletListOutput};

/// Execute the `wallet new` command.
pub fn new(
    config: CliConfig,
    format: OutputFormat,
    password: impl FnOnce() -> CliResult<String>,
) -> CliResult<String> {
    let mut ctx = CliContext::unlocked(config, password)?;
    let address = ctx.manager.new_address()?;

    let output = NewAddressOutput {
        address: address.to_string(),
    };
    Ok(output.render(format))
}

/// Execute the `wallet list` command.
pub fn list(config: CliConfig, format: OutputFormat) -> CliResult<String> {
    let ctx = CliContext::locked(config)?;
    let addresses = ctx.manager.wallet_list()?;

    let output = WalletListOutput {
        addresses: addresses.iter().map(ToString::to_string).collect(),
    };
    Ok(output.render(format))
}

/// Execute the `wallet balance` command.
pub async fn balance(config: CliConfig, format: OutputFormat, address: &str) -> CliResult<String> {
    let address = parse_address(address)?;

    let ctx = CliContext::locked(config)?;
    let balance = ctx.manager.balance(&address).await?;

    let output = BalanceOutput {
        address: address.to_string(),
        balance,
    };
    Ok(output.render(format))
}

/// Execute the `wallet fund` command.
pub async fn fund(
    config: CliConfig,
    format: OutputFormat,
    address: &str,
    amount: &str,
) -> CliResult<String> {
    let address = parse_address(address)?;
    let amount = parse_amount_arg(amount)?;

    let ctx = CliContext::locked(config)?;
    let balance = ctx.manager.fund(&address, amount).await?;

    let output = BalanceOutput {
        address: address.to_string(),
        balance,
    };
    Ok(output.render(format))
}
