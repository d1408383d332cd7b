//! Channel commands: create, list, status, settle, collect.

use crate::args::{parse_address, CreateArgs};
use crate::config::CliConfig;
use crate::context::CliContext;
use crate::error::CliResult;
use crate::output::{
    ChannelListOutput, CollectOutput, CreateOutput, OutputFormat, Render, SettleOutput,
    StatusOutput,
};
use crate::progress::with_spinner;

/// Execute the `create` command.
pub async fn create(
    config: CliConfig,
    format: OutputFormat,
    args: &[String],
    password: impl FnOnce() -> CliResult<String>,
) -> CliResult<String> {
    let args = CreateArgs::parse(args)?;

    let mut ctx = CliContext::unlocked(config, password)?;
    let channel = with_spinner(
        format,
        "Creating channel...",
        ctx.manager.create_channel(&args.from, &args.to, args.amount),
    )
    .await?;

    let output = CreateOutput {
        channel: channel.to_string(),
        from: args.from.to_string(),
        to: args.to.to_string(),
        amount: args.amount,
    };
    Ok(output.render(format))
}

/// Execute the `list` command.
pub fn list(config: CliConfig, format: OutputFormat) -> CliResult<String> {
    let ctx = CliContext::locked(config)?;
    let channels = ctx.manager.list_channels()?;

    let output = ChannelListOutput {
        channels: channels.iter().map(ToString::to_string).collect(),
    };
    Ok(output.render(format))
}

/// Execute the `status` command.
pub async fn status(config: CliConfig, format: OutputFormat, channel: &str) -> CliResult<String> {
    let channel = parse_address(channel)?;

    let ctx = CliContext::locked(config)?;
    let report = ctx.manager.channel_status(&channel).await?;

    Ok(StatusOutput::from(report).render(format))
}

/// Execute the `settle` command.
pub async fn settle(
    config: CliConfig,
    format: OutputFormat,
    channel: &str,
    password: impl FnOnce() -> CliResult<String>,
) -> CliResult<String> {
    let channel = parse_address(channel)?;

    let mut ctx = CliContext::unlocked(config, password)?;
    let settling_at = with_spinner(format, "Settling channel...", ctx.manager.settle(&channel)).await?;

    let output = SettleOutput {
        channel: channel.to_string(),
        settling_at,
    };
    Ok(output.render(format))
}

/// Execute the `collect` command.
pub async fn collect(
    config: CliConfig,
    format: OutputFormat,
    channel: &str,
    password: impl FnOnce() -> CliResult<String>,
) -> CliResult<String> {
    let channel = parse_address(channel)?;

    let mut ctx = CliContext::unlocked(config, password)?;
    let payout = with_spinner(format, "Collecting channel...", ctx.manager.collect(&channel)).await?;

    let output = CollectOutput {
        channel: channel.to_string(),
        to_payee: payout.to_payee,
        to_payer: payout.to_payer,
    };
    Ok(output.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{chain, voucher, wallet};
    use crate::error::CliError;
    use paych_ops::OpsError;
    use paych_types::ExitCode;
    use tempfile::TempDir;

    fn test_password() -> CliResult<String> {
        Ok("test_password".to_string())
    }

    fn setup_config(temp_dir: &TempDir) -> CliConfig {
        let mut config = CliConfig::with_base_dir(temp_dir.path().join("data"));
        config.chain.settle_delay = 3;
        config
    }

    fn json_field(output: &str, field: &str) -> serde_json::Value {
        let value: serde_json::Value = serde_json::from_str(output).unwrap();
        value[field].clone()
    }

    fn new_address(config: &CliConfig) -> String {
        let output = wallet::new(config.clone(), OutputFormat::Json, test_password).unwrap();
        json_field(&output, "address").as_str().unwrap().to_string()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_malformed_addresses_touch_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);

        let result = create(
            config.clone(),
            OutputFormat::Human,
            &args(&["bad", "worse", "5"]),
            test_password,
        )
        .await;
        match result {
            Err(CliError::InvalidAddress(msg)) => {
                assert!(msg.starts_with("failed to parse from address"))
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }

        let result = status(config.clone(), OutputFormat::Human, "bad").await;
        assert!(matches!(result, Err(CliError::InvalidAddress(_))));
        let result = settle(config.clone(), OutputFormat::Human, "bad", test_password).await;
        assert!(matches!(result, Err(CliError::InvalidAddress(_))));
        let result = collect(config.clone(), OutputFormat::Human, "bad", test_password).await;
        assert!(matches!(result, Err(CliError::InvalidAddress(_))));

        assert!(!config.base_dir().exists());
    }

    #[tokio::test]
    async fn test_create_arity() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);

        let result = create(config.clone(), OutputFormat::Human, &args(&["a", "b"]), test_password).await;
        match result {
            Err(CliError::Usage(msg)) => {
                assert_eq!(msg, "must pass three arguments: <from> <to> <amount>")
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
        assert!(!config.base_dir().exists());
    }

    #[test]
    fn test_list_empty() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);

        let output = list(config, OutputFormat::Human).unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_create_without_funds() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let payer = new_address(&config);
        let payee = new_address(&config);

        let result = create(
            config,
            OutputFormat::Human,
            &args(&[&payer, &payee, "10"]),
            test_password,
        )
        .await;
        match result {
            Err(CliError::Ops(OpsError::ExecutionFailed { exit_code })) => {
                assert_eq!(exit_code, ExitCode::INSUFFICIENT_FUNDS)
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_channel_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let config = setup_config(&temp_dir);
        let payer = new_address(&config);
        let payee = new_address(&config);
        wallet::fund(config.clone(), OutputFormat::Human, &payer, "1000")
            .await
            .unwrap();

        // Create
        let output = create(
            config.clone(),
            OutputFormat::Json,
            &args(&[&payer, &payee, "400"]),
            test_password,
        )
        .await
        .unwrap();
        let channel = json_field(&output, "channel").as_str().unwrap().to_string();

        let output = list(config.clone(), OutputFormat::Human).unwrap();
        assert_eq!(output, channel);

        let output = status(config.clone(), OutputFormat::Json, &channel)
            .await
            .unwrap();
        assert_eq!(json_field(&output, "direction"), "outbound");
        assert_eq!(json_field(&output, "balance"), 400);

        // Pay the payee 150
        let output = voucher::create(
            config.clone(),
            OutputFormat::Json,
            &args(&[&channel, "150"]),
            0,
            0,
            test_password,
        )
        .await
        .unwrap();
        let encoded = json_field(&output, "encoded").as_str().unwrap().to_string();
        voucher::submit(
            config.clone(),
            OutputFormat::Human,
            &args(&[&channel, &encoded]),
            test_password,
        )
        .await
            .unwrap();

        // Settle, wait out the delay, collect
        let output = settle(config.clone(), OutputFormat::Json, &channel, test_password)
            .await
            .unwrap();
        assert!(json_field(&output, "settling_at").as_u64().is_some());

        let result = collect(config.clone(), OutputFormat::Human, &channel, test_password).await;
        assert!(result.is_err());

        chain::mine(config.clone(), OutputFormat::Human, 3).unwrap();
        let output = collect(config.clone(), OutputFormat::Json, &channel, test_password)
            .await
            .unwrap();
        assert_eq!(json_field(&output, "to_payee"), 150);
        assert_eq!(json_field(&output, "to_payer"), 250);

        let output = wallet::balance(config, OutputFormat::Json, &payer)
            .await
            .unwrap();
        assert_eq!(json_field(&output, "balance"), 850);
    }
}
