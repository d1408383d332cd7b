//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use paych_types::DEFAULT_LANE;

use crate::output::OutputFormat;

/// Payment channel CLI.
#[derive(Parser, Debug)]
#[command(name = "paych")]
#[command(author = "paych contributors")]
#[command(version)]
#[command(about = "Manage payment channels")]
#[command(
    long_about = "Manage payment channels and their vouchers on a local devnet.\n\nRun 'paych wallet new' to get started."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (human or json). Defaults to the configured format.
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormatArg>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output format argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormatArg {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Shell type for completions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // =========================================================================
    // Channel Commands
    // =========================================================================
    /// Create a new payment channel.
    ///
    /// Arguments: <from> <to> <amount>
    Create {
        #[arg(value_name = "ARGS", allow_negative_numbers = true)]
        args: Vec<String>,
    },

    /// List all locally registered payment channels.
    List,

    /// Interact with payment channel vouchers.
    Voucher {
        #[command(subcommand)]
        command: VoucherCommands,
    },

    /// Show registry and on-chain state of a channel.
    Status {
        /// Channel address.
        channel: String,
    },

    /// Start settling a channel.
    Settle {
        /// Channel address.
        channel: String,
    },

    /// Pay out a settled channel.
    Collect {
        /// Channel address.
        channel: String,
    },

    // =========================================================================
    // Wallet and Chain Commands
    // =========================================================================
    /// Manage wallet keys and balances.
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },

    /// Inspect or advance the local devnet.
    Chain {
        #[command(subcommand)]
        command: ChainCommands,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: CompletionShell,
    },
}

/// Voucher subcommands.
#[derive(Subcommand, Debug)]
pub enum VoucherCommands {
    /// Create a signed payment channel voucher.
    ///
    /// Arguments: <channel> <amount>
    Create {
        #[arg(value_name = "ARGS", allow_negative_numbers = true)]
        args: Vec<String>,

        /// Payment channel lane to use.
        #[arg(long, default_value_t = DEFAULT_LANE)]
        lane: u64,

        /// Earliest epoch at which the voucher can be redeemed.
        #[arg(long = "time-lock", default_value_t = 0)]
        time_lock: u64,
    },

    /// Check validity of payment channel voucher.
    ///
    /// Arguments: <channel> <voucher>
    Check {
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Add payment channel voucher to local datastore.
    ///
    /// Arguments: <channel> <voucher>
    Add {
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// List stored vouchers for a given payment channel.
    ///
    /// Arguments: <channel>
    List {
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Print voucher with highest value that is currently spendable.
    ///
    /// Arguments: <channel>
    BestSpendable {
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Submit voucher to chain to update payment channel state.
    ///
    /// Arguments: <channel> <voucher>
    Submit {
        #[arg(value_name = "ARGS")]
        args: Vec<String>,
    },
}

/// Wallet subcommands.
#[derive(Subcommand, Debug)]
pub enum WalletCommands {
    /// Generate a new address in the keystore.
    New,

    /// List keystore addresses.
    List,

    /// Show the on-chain balance of an address.
    Balance {
        /// Account address.
        address: String,
    },

    /// Credit an address from the devnet faucet.
    Fund {
        /// Account address.
        address: String,

        /// Amount in base units.
        amount: String,
    },
}

/// Devnet subcommands.
#[derive(Subcommand, Debug)]
pub enum ChainCommands {
    /// Show the current epoch.
    Head,

    /// Advance the epoch with empty blocks.
    Mine {
        /// Number of blocks.
        #[arg(default_value_t = 1)]
        blocks: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_args_collected() {
        let cli = Cli::parse_from(["paych", "create", "a", "b"]);
        match cli.command {
            Commands::Create { args } => assert_eq!(args, vec!["a", "b"]),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["paych", "voucher", "create", "c", "5", "--lane", "3"]);
        match cli.command {
            Commands::Voucher {
                command:
                    VoucherCommands::Create {
                        args,
                        lane,
                        time_lock,
                    },
            } => {
                assert_eq!(args, vec!["c", "5"]);
                assert_eq!(lane, 3);
                assert_eq!(time_lock, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_voucher_create_defaults() {
        let cli = Cli::parse_from(["paych", "voucher", "create", "c", "5"]);
        match cli.command {
            Commands::Voucher {
                command: VoucherCommands::Create { lane, time_lock, .. },
            } => {
                assert_eq!(lane, DEFAULT_LANE);
                assert_eq!(time_lock, 0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["paych", "list", "--format", "json", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.format, Some(OutputFormatArg::Json)));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_missing_arguments_reach_the_command() {
        let cli = Cli::parse_from(["paych", "voucher", "best-spendable"]);
        match cli.command {
            Commands::Voucher {
                command: VoucherCommands::BestSpendable { args },
            } => assert!(args.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
