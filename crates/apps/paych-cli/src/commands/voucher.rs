//! Voucher commands.

use paych_ops::OpsError;
use paych_wire::encode_voucher;

use crate::args::{parse_channel_arg, ChannelVoucherArgs, VoucherCreateArgs};
use crate::config::CliConfig;
use crate::context::CliContext;
use crate::error::CliResult;
use crate::output::{
    AddOutput, BestSpendableOutput, CheckOutput, OutputFormat, Render, SubmitOutput,
    VoucherEntry, VoucherListOutput, VoucherOutput,
};
use crate::progress::with_spinner;

const CHECK_USAGE: &str = "must pass payment channel address and voucher to validate";
const VOUCHER_USAGE: &str = "must pass payment channel address and voucher";

/// Execute the `voucher create` command.
pub async fn create(
    config: CliConfig,
    format: OutputFormat,
    args: &[String],
    lane: u64,
    time_lock: u64,
    password: impl FnOnce() -> CliResult<String>,
) -> CliResult<String> {
    let args = VoucherCreateArgs::parse(args)?;

    let mut ctx = CliContext::unlocked(config, password)?;
    let voucher = ctx
        .manager
        .create_voucher(&args.channel, args.amount, lane, time_lock)
        .await?;
    let encoded = encode_voucher(&voucher).map_err(OpsError::from)?;

    Ok(VoucherOutput::new(&voucher, encoded).render(format))
}

/// Execute the `voucher check` command.
pub async fn check(config: CliConfig, format: OutputFormat, args: &[String]) -> CliResult<String> {
    let args = ChannelVoucherArgs::parse(args, CHECK_USAGE)?;

    let ctx = CliContext::locked(config)?;
    ctx.manager
        .check_voucher_valid(&args.channel, &args.voucher)
        .await?;

    let output = CheckOutput {
        channel: args.channel.to_string(),
        valid: true,
    };
    Ok(output.render(format))
}

/// Execute the `voucher add` command.
pub async fn add(config: CliConfig, format: OutputFormat, args: &[String]) -> CliResult<String> {
    let args = ChannelVoucherArgs::parse(args, VOUCHER_USAGE)?;

    let mut ctx = CliContext::locked(config)?;
    ctx.manager.add_voucher(&args.channel, &args.voucher).await?;

    let output = AddOutput {
        channel: args.channel.to_string(),
        lane: args.voucher.lane,
        nonce: args.voucher.nonce,
        amount: args.voucher.amount,
    };
    Ok(output.render(format))
}

/// Execute the `voucher list` command.
pub fn list(config: CliConfig, format: OutputFormat, args: &[String]) -> CliResult<String> {
    let channel = parse_channel_arg(args)?;

    let ctx = CliContext::locked(config)?;
    let vouchers = ctx.manager.list_vouchers(&channel)?;

    let output = VoucherListOutput {
        channel: channel.to_string(),
        vouchers: vouchers.iter().map(VoucherEntry::from).collect(),
    };
    Ok(output.render(format))
}

/// Execute the `voucher best-spendable` command.
pub async fn best_spendable(
    config: CliConfig,
    format: OutputFormat,
    args: &[String],
) -> CliResult<String> {
    let channel = parse_channel_arg(args)?;

    let ctx = CliContext::locked(config)?;
    let best = ctx.manager.best_spendable(&channel).await?;

    let output = BestSpendableOutput {
        encoded: best.encoded.clone(),
        lane: best.voucher.lane,
        nonce: best.voucher.nonce,
        amount: best.voucher.amount,
    };
    Ok(output.render(format))
}

/// Execute the `voucher submit` command.
pub async fn submit(
    config: CliConfig,
    format: OutputFormat,
    args: &[String],
    password: impl FnOnce() -> CliResult<String>,
) -> CliResult<String> {
    let args = ChannelVoucherArgs::parse(args, VOUCHER_USAGE)?;

    let mut ctx = CliContext::unlocked(config, password)?;
    let lookup = with_spinner(
        format,
        "Waiting for message...",
        ctx.manager.submit_voucher(&args.channel, &args.voucher),
    )
    .await?;

    let output = SubmitOutput {
        channel: args.channel.to_string(),
        message: lookup.id.to_string(),
        epoch: lookup.receipt.epoch,
        exit_code: lookup.receipt.exit_code.value(),
    };
    Ok(output.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{channel, wallet};
    use crate::error::CliError;
    use tempfile::TempDir;

    fn test_password() -> CliResult<String> {
        Ok("test_password".to_string())
    }

    fn setup_config(temp_dir: &TempDir) -> CliConfig {
        CliConfig::with_base_dir(temp_dir.path().join("data"))
    }

    fn json_field(output: &str, field: &str) -> serde_json::Value {
        let value: serde_json::Value = serde_json::from_str(output).unwrap();
        value[field].clone()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// A funded channel with payer and payee keys in the same keystore.
    async fn open_channel(config: &CliConfig, amount: &str) -> String {
        let payer = wallet::new(config.clone(), OutputFormat::Json, test_password).unwrap();
        let payer = json_field(&payer, "address").as_str().unwrap().to_string();
        let payee = wallet::new(config.clone(), OutputFormat::Json, test_password).unwrap();
        let payee = json_field(&payee, "address").as_str().unwrap().to_string();
        wallet::fund(config.clone(), OutputFormat::Human, &payer, "1000")
            .await
            .unwrap();

        let output = channel::create(
            config.clone(),
            OutputFormat::Json,
            &args(&[&payer, &payee, amount]),
            test_password,
        )
        .await
        .unwrap();
        json_field(&output, "channel").as_str().unwrap().to_string()
    }

    async fn new_voucher(config: &CliConfig, channel: &str, amount: &str, lane: u64) -> String {
        create(
            config.clone(),
            OutputFormat::Human,
            &args(&[channel, amount]),
            lane,
            0,
            test_password,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_usage_errors() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);

        let err = create(config.clone(), OutputFormat::Human, &args(&["x"]), 0, 0, test_password)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "must pass two arguments: <channel> <amount>");

        let err = check(config.clone(), OutputFormat::Human, &args(&["x"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), CHECK_USAGE);

        let err = add(config.clone(), OutputFormat::Human, &[]).await.unwrap_err();
        assert_eq!(err.to_string(), VOUCHER_USAGE);

        let err = submit(config.clone(), OutputFormat::Human, &args(&["a", "b", "c"]), test_password)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), VOUCHER_USAGE);

        let err = list(config.clone(), OutputFormat::Human, &[]).unwrap_err();
        assert_eq!(err.to_string(), "must pass payment channel address");

        assert!(!config.base_dir().exists());
    }

    #[tokio::test]
    async fn test_garbage_voucher_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let channel = open_channel(&config, "100").await;

        let result = check(config, OutputFormat::Human, &args(&[&channel, "not-a-voucher"])).await;
        assert!(matches!(result, Err(CliError::InvalidVoucher(_))));
    }

    #[tokio::test]
    async fn test_create_check_add_list() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let channel = open_channel(&config, "100").await;

        let first = new_voucher(&config, &channel, "10", 0).await;
        let second = new_voucher(&config, &channel, "25", 0).await;
        new_voucher(&config, &channel, "5", 1).await;

        let output = check(config.clone(), OutputFormat::Human, &args(&[&channel, &second]))
            .await
            .unwrap();
        assert_eq!(output, "voucher is valid");

        // Already stored when created; adding again is silent.
        let output = add(config.clone(), OutputFormat::Human, &args(&[&channel, &first]))
            .await
            .unwrap();
        assert!(output.is_empty());

        let output = list(config.clone(), OutputFormat::Human, &args(&[&channel])).unwrap();
        assert_eq!(
            output,
            "Lane 0, Nonce 1: 10\nLane 0, Nonce 2: 25\nLane 1, Nonce 1: 5"
        );
    }

    #[tokio::test]
    async fn test_voucher_over_balance() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let channel = open_channel(&config, "100").await;

        let result = create(config, OutputFormat::Human, &args(&[&channel, "101"]), 0, 0, test_password).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_best_spendable_then_submit() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let channel = open_channel(&config, "100").await;

        new_voucher(&config, &channel, "10", 0).await;
        let best = new_voucher(&config, &channel, "40", 0).await;

        let output = best_spendable(config.clone(), OutputFormat::Human, &args(&[&channel]))
            .await
            .unwrap();
        assert_eq!(output, format!("{}\nAmount: 40", best));

        let output = submit(config.clone(), OutputFormat::Json, &args(&[&channel, &best]), test_password)
            .await
            .unwrap();
        assert_eq!(json_field(&output, "exit_code"), 0);

        let output = submit(
            config.clone(),
            OutputFormat::Human,
            &args(&[&channel, &best]),
            test_password,
        )
        .await;
        assert!(output.is_err());

        let result = best_spendable(config.clone(), OutputFormat::Human, &args(&[&channel])).await;
        assert!(result.is_err());

        let output = list(config, OutputFormat::Json, &args(&[&channel])).unwrap();
        let vouchers = json_field(&output, "vouchers");
        let submitted: Vec<bool> = vouchers
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["submitted"].as_bool().unwrap())
            .collect();
        assert_eq!(submitted, vec![false, true]);
    }
}
