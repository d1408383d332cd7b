//! Output formatting for CLI.
//!
//! Human output of the channel and voucher commands keeps the plain
//! line formats scripts already parse; the supplementary commands use
//! colored labels.

use colored::Colorize;
use serde::Serialize;

use paych_ops::ChannelStatusReport;
use paych_store::StoredVoucher;
use paych_types::{ChannelStatus, SignedVoucher};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use 'human' or 'json'.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Trait for renderable output.
pub trait Render {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String;

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

macro_rules! json_render {
    () => {
        fn render_json(&self) -> String {
            serde_json::to_string_pretty(self).unwrap_or_default()
        }
    };
}

// =============================================================================
// Channel Outputs
// =============================================================================

/// Output for `create`.
#[derive(Debug, Serialize)]
pub struct CreateOutput {
    pub channel: String,
    pub from: String,
    pub to: String,
    pub amount: u64,
}

impl Render for CreateOutput {
    fn render_human(&self) -> String {
        self.channel.clone()
    }

    json_render!();
}

/// Output for `list`.
#[derive(Debug, Serialize)]
pub struct ChannelListOutput {
    pub channels: Vec<String>,
}

impl Render for ChannelListOutput {
    fn render_human(&self) -> String {
        self.channels.join("\n")
    }

    json_render!();
}

/// Output for `status`.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub channel: String,
    pub direction: String,
    pub from: String,
    pub to: String,
    pub epoch: u64,
    pub status: Option<String>,
    pub balance: Option<u64>,
    pub to_send: Option<u64>,
    pub settling_at: Option<u64>,
    pub lanes: Vec<LaneOutput>,
    pub vouchers: usize,
}

/// One on-chain lane in `status`.
#[derive(Debug, Serialize)]
pub struct LaneOutput {
    pub lane: u64,
    pub nonce: u64,
    pub redeemed: u64,
}

impl From<ChannelStatusReport> for StatusOutput {
    fn from(report: ChannelStatusReport) -> Self {
        let on_chain = report.on_chain.as_ref();
        Self {
            channel: report.info.address.to_string(),
            direction: report.info.direction.as_str().to_string(),
            from: report.info.from.to_string(),
            to: report.info.to.to_string(),
            epoch: report.epoch,
            status: report.status.as_ref().map(ChannelStatus::to_string),
            balance: on_chain.map(|s| s.balance),
            to_send: on_chain.map(|s| s.to_send),
            settling_at: on_chain.and_then(|s| s.settling_at),
            lanes: on_chain
                .map(|s| {
                    s.lane_states
                        .iter()
                        .map(|(lane, state)| LaneOutput {
                            lane: *lane,
                            nonce: state.nonce,
                            redeemed: state.redeemed,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            vouchers: report.voucher_count,
        }
    }
}

impl Render for StatusOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![
            format!("{} {}", "Channel:".bold(), self.channel),
            format!("{} {}", "Direction:".bold(), self.direction),
            format!("{} {}", "From:".bold(), self.from),
            format!("{} {}", "To:".bold(), self.to),
        ];
        match &self.status {
            Some(status) => lines.push(format!(
                "{} {} (epoch {})",
                "Status:".bold(),
                status.green(),
                self.epoch
            )),
            None => lines.push(format!("{} {}", "Status:".bold(), "not on chain".red())),
        }
        if let (Some(balance), Some(to_send)) = (self.balance, self.to_send) {
            lines.push(format!("{} {}", "Balance:".bold(), balance));
            lines.push(format!("{} {}", "Redeemed:".bold(), to_send));
        }
        if let Some(settling_at) = self.settling_at {
            lines.push(format!("{} {}", "Settling at:".bold(), settling_at));
        }
        for lane in &self.lanes {
            lines.push(format!(
                "  Lane {}: nonce {}, redeemed {}",
                lane.lane, lane.nonce, lane.redeemed
            ));
        }
        lines.push(format!("{} {}", "Stored vouchers:".bold(), self.vouchers));
        lines.join("\n")
    }

    json_render!();
}

/// Output for `settle`.
#[derive(Debug, Serialize)]
pub struct SettleOutput {
    pub channel: String,
    pub settling_at: u64,
}

impl Render for SettleOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}",
            "Channel settling:".green().bold(),
            self.channel,
            "Collectable from epoch:".bold(),
            self.settling_at
        )
    }

    json_render!();
}

/// Output for `collect`.
#[derive(Debug, Serialize)]
pub struct CollectOutput {
    pub channel: String,
    pub to_payee: u64,
    pub to_payer: u64,
}

impl Render for CollectOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}\n{} {}",
            "Channel collected:".green().bold(),
            self.channel,
            "Paid to payee:".bold(),
            self.to_payee,
            "Returned to payer:".bold(),
            self.to_payer
        )
    }

    json_render!();
}

// =============================================================================
// Voucher Outputs
// =============================================================================

/// A voucher and its encoded form.
#[derive(Debug, Serialize)]
pub struct VoucherOutput {
    pub encoded: String,
    pub channel: String,
    pub lane: u64,
    pub nonce: u64,
    pub amount: u64,
    pub time_lock_min: u64,
}

impl VoucherOutput {
    /// Build from a voucher and its encoded string.
    pub fn new(voucher: &SignedVoucher, encoded: String) -> Self {
        Self {
            encoded,
            channel: voucher.channel.to_string(),
            lane: voucher.lane,
            nonce: voucher.nonce,
            amount: voucher.amount,
            time_lock_min: voucher.time_lock_min,
        }
    }
}

impl Render for VoucherOutput {
    fn render_human(&self) -> String {
        self.encoded.clone()
    }

    json_render!();
}

/// Output for `voucher check`.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub channel: String,
    pub valid: bool,
}

impl Render for CheckOutput {
    fn render_human(&self) -> String {
        "voucher is valid".to_string()
    }

    json_render!();
}

/// Output for `voucher add`. Silent in human mode.
#[derive(Debug, Serialize)]
pub struct AddOutput {
    pub channel: String,
    pub lane: u64,
    pub nonce: u64,
    pub amount: u64,
}

impl Render for AddOutput {
    fn render_human(&self) -> String {
        String::new()
    }

    json_render!();
}

/// One stored voucher in `voucher list`.
#[derive(Debug, Serialize)]
pub struct VoucherEntry {
    pub lane: u64,
    pub nonce: u64,
    pub amount: u64,
    pub time_lock_min: u64,
    pub submitted: bool,
    pub encoded: String,
}

impl From<&StoredVoucher> for VoucherEntry {
    fn from(stored: &StoredVoucher) -> Self {
        Self {
            lane: stored.voucher.lane,
            nonce: stored.voucher.nonce,
            amount: stored.voucher.amount,
            time_lock_min: stored.voucher.time_lock_min,
            submitted: stored.submitted,
            encoded: stored.encoded.clone(),
        }
    }
}

/// Output for `voucher list`.
#[derive(Debug, Serialize)]
pub struct VoucherListOutput {
    pub channel: String,
    pub vouchers: Vec<VoucherEntry>,
}

impl Render for VoucherListOutput {
    fn render_human(&self) -> String {
        self.vouchers
            .iter()
            .map(|v| format!("Lane {}, Nonce {}: {}", v.lane, v.nonce, v.amount))
            .collect::<Vec<_>>()
            .join("\n")
    }

    json_render!();
}

/// Output for `voucher best-spendable`.
#[derive(Debug, Serialize)]
pub struct BestSpendableOutput {
    pub encoded: String,
    pub lane: u64,
    pub nonce: u64,
    pub amount: u64,
}

impl Render for BestSpendableOutput {
    fn render_human(&self) -> String {
        format!("{}\nAmount: {}", self.encoded, self.amount)
    }

    json_render!();
}

/// Output for `voucher submit`.
#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub channel: String,
    pub message: String,
    pub epoch: u64,
    pub exit_code: u32,
}

impl Render for SubmitOutput {
    fn render_human(&self) -> String {
        "channel updated succesfully".to_string()
    }

    json_render!();
}

// =============================================================================
// Wallet and Chain Outputs
// =============================================================================

/// Output for `wallet new`.
#[derive(Debug, Serialize)]
pub struct NewAddressOutput {
    pub address: String,
}

impl Render for NewAddressOutput {
    fn render_human(&self) -> String {
        self.address.clone()
    }

    json_render!();
}

/// Output for `wallet list`.
#[derive(Debug, Serialize)]
pub struct WalletListOutput {
    pub addresses: Vec<String>,
}

impl Render for WalletListOutput {
    fn render_human(&self) -> String {
        if self.addresses.is_empty() {
            return "No wallet addresses. Create one with 'paych wallet new'.".dimmed().to_string();
        }
        self.addresses.join("\n")
    }

    json_render!();
}

/// Output for `wallet balance` and `wallet fund`.
#[derive(Debug, Serialize)]
pub struct BalanceOutput {
    pub address: String,
    pub balance: u64,
}

impl Render for BalanceOutput {
    fn render_human(&self) -> String {
        format!("{} {}", "Balance:".bold(), self.balance)
    }

    json_render!();
}

/// Output for `chain head` and `chain mine`.
#[derive(Debug, Serialize)]
pub struct ChainHeadOutput {
    pub epoch: u64,
}

impl Render for ChainHeadOutput {
    fn render_human(&self) -> String {
        format!("{} {}", "Epoch:".bold(), self.epoch)
    }

    json_render!();
}
