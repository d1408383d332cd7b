//! paych CLI binary entry point.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paych_cli::{
    cli::{ChainCommands, Cli, Commands, VoucherCommands, WalletCommands},
    commands,
    config::{default_config_path, CliConfig},
    error::{CliError, CliResult},
    output::OutputFormat,
    prompt::keystore_password,
};

fn main() {
    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let e = CliError::from(e);
            print_error(&e);
            std::process::exit(e.exit_code());
        }
    };
    rt.block_on(async_main(cli));
}

async fn async_main(cli: Cli) {
    // Initialize logging based on --verbose flag or RUST_LOG env var
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if cli.verbose || has_rust_log {
        let mut filter = EnvFilter::from_default_env();
        if cli.verbose {
            if let Ok(directive) = "paych=debug".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    if let Err(e) = run(cli).await {
        print_error(&e);
        std::process::exit(e.exit_code());
    }
}

/// Print a user-friendly error message with error code and recovery hint.
fn print_error(e: &CliError) {
    let code = e.error_code();

    eprintln!(
        "{} [{}]: {}",
        "Error".red().bold(),
        code.to_string().yellow(),
        e
    );

    if let Some(suggestion) = e.suggestion() {
        eprintln!("{}: {}", "Hint".cyan(), suggestion);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    // Load configuration
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = CliConfig::load(&config_path)?;

    if !config.display.color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = match cli.format {
        Some(arg) => arg.into(),
        None => config.default_format()?,
    };

    // Signing commands ask for the keystore password after parsing arguments.
    let unlock = || keystore_password(false);

    let output = match cli.command {
        // Channel commands
        Commands::Create { args } => {
            commands::create(config, format, &args, unlock).await?
        }
        Commands::List => commands::list(config, format)?,
        Commands::Status { channel } => commands::status(config, format, &channel).await?,
        Commands::Settle { channel } => {
            commands::settle(config, format, &channel, unlock).await?
        }
        Commands::Collect { channel } => {
            commands::collect(config, format, &channel, unlock).await?
        }

        // Voucher commands
        Commands::Voucher { command } => match command {
            VoucherCommands::Create {
                args,
                lane,
                time_lock,
            } => {
                commands::voucher::create(config, format, &args, lane, time_lock, unlock).await?
            }
            VoucherCommands::Check { args } => {
                commands::voucher::check(config, format, &args).await?
            }
            VoucherCommands::Add { args } => commands::voucher::add(config, format, &args).await?,
            VoucherCommands::List { args } => commands::voucher::list(config, format, &args)?,
            VoucherCommands::BestSpendable { args } => {
                commands::voucher::best_spendable(config, format, &args).await?
            }
            VoucherCommands::Submit { args } => {
                commands::voucher::submit(config, format, &args, unlock).await?
            }
        },

        // Wallet commands
        Commands::Wallet { command } => match command {
            WalletCommands::New => {
                commands::wallet::new(config, format, || keystore_password(true))?
            }
            WalletCommands::List => commands::wallet::list(config, format)?,
            WalletCommands::Balance { address } => {
                commands::wallet::balance(config, format, &address).await?
            }
            WalletCommands::Fund { address, amount } => {
                commands::wallet::fund(config, format, &address, &amount).await?
            }
        },

        // Devnet commands
        Commands::Chain { command } => match command {
            ChainCommands::Head => commands::chain::head(config, format).await?,
            ChainCommands::Mine { blocks } => commands::chain::mine(config, format, blocks)?,
        },

        Commands::Completions { shell } => commands::completions(shell)?,
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
