//! The payment channel manager.
//!
//! `PaychManager` ties together local state, the chain and the wallet.
//! Every CLI command is one method here.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use paych_chain::{wait_message, Chain, Faucet, Payout};
use paych_crypto::{Address, PrivateKey, Timestamp};
use paych_store::{ChannelStore, PaychState, StoredVoucher, VoucherStore};
use paych_types::{
    Amount, ChannelActorState, ChannelDirection, ChannelInfo, ChannelStatus, Epoch, Lane,
    Message, MessageLookup, Method, SignedVoucher,
};
use paych_valid::{check_spendable, select_best_spendable, validate_voucher, NotSpendable};
use paych_wire::{decode_payload, encode_voucher, sign_message, sign_voucher};

use crate::config::OpsConfig;
use crate::error::{OpsError, OpsResult};
use crate::wallet::Wallet;

/// Registry record joined with on-chain state.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatusReport {
    /// Local registry record.
    pub info: ChannelInfo,
    /// Chain height the report was taken at.
    pub epoch: Epoch,
    /// Actor state, if the channel exists on chain.
    pub on_chain: Option<ChannelActorState>,
    /// Lifecycle status at `epoch`.
    pub status: Option<ChannelStatus>,
    /// Vouchers stored for the channel.
    pub voucher_count: usize,
}

/// Payment channel voucher manager.
pub struct PaychManager {
    /// Channel registry and voucher store.
    pub state: PaychState,
    /// Engine configuration.
    pub config: OpsConfig,
    chain: Arc<dyn Chain>,
    faucet: Option<Arc<dyn Faucet>>,
    wallet: Box<dyn Wallet>,
}

impl PaychManager {
    /// Create a manager without a faucet.
    pub fn new(
        state: PaychState,
        chain: Arc<dyn Chain>,
        wallet: Box<dyn Wallet>,
        config: OpsConfig,
    ) -> Self {
        Self {
            state,
            config,
            chain,
            faucet: None,
            wallet,
        }
    }

    /// Enable `fund` through `faucet`.
    pub fn with_faucet(mut self, faucet: Arc<dyn Faucet>) -> Self {
        self.faucet = Some(faucet);
        self
    }

    /// The chain this manager talks to.
    pub fn chain(&self) -> &Arc<dyn Chain> {
        &self.chain
    }

    /// The wallet this manager signs with.
    pub fn wallet(&self) -> &dyn Wallet {
        self.wallet.as_ref()
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Create and fund a channel from `from` to `to`. Returns the channel
    /// address.
    pub async fn create_channel(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> OpsResult<Address> {
        let key = self.wallet.signing_key(from)?;
        let lookup = self
            .push_and_wait(from, &key, to, Method::CreateChannel, amount)
            .await?;

        let channel: Address = decode_payload(&lookup.receipt.return_value)?;
        let info = ChannelInfo::outbound(channel, *from, *to, amount, lookup.id, current_timestamp());
        self.state.channels.insert(&info)?;

        info!(channel = %channel, from = %from, to = %to, amount, "Channel created");
        Ok(channel)
    }

    /// Addresses of all registered channels.
    pub fn list_channels(&self) -> OpsResult<Vec<Address>> {
        Ok(self
            .state
            .channels
            .list()?
            .into_iter()
            .map(|info| info.address)
            .collect())
    }

    /// Registry record joined with chain state.
    pub async fn channel_status(&self, channel: &Address) -> OpsResult<ChannelStatusReport> {
        let info = self.registered(channel)?;
        let on_chain = self.chain.channel_state(channel).await?;
        let epoch = self.chain.epoch().await?;
        let status = on_chain.as_ref().map(|state| state.status(epoch));
        let voucher_count = self.state.vouchers.count(channel)?;

        Ok(ChannelStatusReport {
            info,
            epoch,
            on_chain,
            status,
            voucher_count,
        })
    }

    /// Start settlement. Returns the epoch from which the channel can be
    /// collected.
    pub async fn settle(&mut self, channel: &Address) -> OpsResult<Epoch> {
        let sender = self.party_sender(channel).await?;
        let key = self.wallet.signing_key(&sender)?;
        self.push_and_wait(&sender, &key, channel, Method::Settle, 0)
            .await?;

        let settling_at = self
            .chain
            .channel_state(channel)
            .await?
            .and_then(|state| state.settling_at)
            .ok_or_else(|| OpsError::channel_not_active("channel missing after settle"))?;

        info!(channel = %channel, settling_at, "Channel settling");
        Ok(settling_at)
    }

    /// Pay out a settled channel.
    pub async fn collect(&mut self, channel: &Address) -> OpsResult<Payout> {
        let sender = self.party_sender(channel).await?;
        let key = self.wallet.signing_key(&sender)?;
        self.push_and_wait(&sender, &key, channel, Method::Collect, 0)
            .await?;

        let state = self
            .chain
            .channel_state(channel)
            .await?
            .ok_or_else(|| OpsError::channel_not_active("channel missing after collect"))?;
        let payout = Payout {
            to_payee: state.to_send,
            to_payer: state.remaining(),
        };

        info!(
            channel = %channel,
            to_payee = payout.to_payee,
            to_payer = payout.to_payer,
            "Channel collected"
        );
        Ok(payout)
    }

    // =========================================================================
    // Vouchers
    // =========================================================================

    /// Create, sign and store a voucher for `amount` on `lane`.
    ///
    /// The nonce is one above both the highest stored nonce and the
    /// on-chain nonce for the lane.
    pub async fn create_voucher(
        &mut self,
        channel: &Address,
        amount: Amount,
        lane: Lane,
        time_lock_min: Epoch,
    ) -> OpsResult<SignedVoucher> {
        let info = self.registered(channel)?;
        if info.direction != ChannelDirection::Outbound {
            return Err(OpsError::NotOutbound(*channel));
        }

        let state = self
            .chain
            .channel_state(channel)
            .await?
            .ok_or_else(|| OpsError::channel_not_active("channel not found on chain"))?;
        let epoch = self.chain.epoch().await?;
        let status = state.status(epoch);
        if !status.accepts_updates() {
            return Err(OpsError::channel_not_active(format!("channel is {}", status)));
        }

        let key = self.wallet.signing_key(&info.from)?;

        let on_chain = state.lane(lane);
        if amount < on_chain.redeemed {
            return Err(OpsError::AmountBelowRedeemed {
                amount,
                redeemed: on_chain.redeemed,
            });
        }

        // Every other lane may still pay out its best known amount.
        let mut committed = self.state.vouchers.best_per_lane(channel)?;
        for (other, lane_state) in &state.lane_states {
            let best = committed.entry(*other).or_insert(0);
            *best = (*best).max(lane_state.redeemed);
        }
        let others: u128 = committed
            .iter()
            .filter(|(other, _)| **other != lane)
            .map(|(_, best)| *best as u128)
            .sum();
        let required = others + amount as u128;
        if required > state.balance as u128 {
            return Err(OpsError::InsufficientFunds {
                required,
                balance: state.balance,
            });
        }

        let stored_nonce = self.state.vouchers.max_nonce(channel, lane)?.unwrap_or(0);
        let nonce = stored_nonce.max(on_chain.nonce).saturating_add(1);

        let voucher = sign_voucher(
            SignedVoucher::new(*channel, lane, nonce, amount).with_time_lock_min(time_lock_min),
            &key,
        )?;
        let encoded = encode_voucher(&voucher)?;
        self.state.vouchers.insert(&StoredVoucher::new(
            voucher.clone(),
            encoded,
            current_timestamp(),
        ))?;

        info!(channel = %channel, lane, nonce, amount, "Voucher created");
        Ok(voucher)
    }

    /// Check that a voucher could be redeemed now.
    pub async fn check_voucher_valid(
        &self,
        channel: &Address,
        voucher: &SignedVoucher,
    ) -> OpsResult<()> {
        let state = self.chain.channel_state(channel).await?;
        let epoch = self.chain.epoch().await?;
        validate_voucher(voucher, channel, state.as_ref(), epoch)?;
        Ok(())
    }

    /// Whether a voucher is spendable now, given the vouchers we hold.
    pub async fn check_voucher_spendable(
        &self,
        channel: &Address,
        voucher: &SignedVoucher,
    ) -> OpsResult<bool> {
        let state = self.chain.channel_state(channel).await?;
        let epoch = self.chain.epoch().await?;
        let known = self.state.vouchers.list_for_channel(channel)?;

        match check_spendable(voucher, channel, state.as_ref(), epoch, &known) {
            Ok(()) => Ok(true),
            Err(reason) => {
                debug!(
                    channel = %channel,
                    lane = voucher.lane,
                    nonce = voucher.nonce,
                    reason = %reason,
                    "Voucher not spendable"
                );
                Ok(false)
            }
        }
    }

    /// Validate and store a received voucher.
    ///
    /// Registers the channel as inbound if unknown. Adding the same voucher
    /// twice is a no-op.
    pub async fn add_voucher(&mut self, channel: &Address, voucher: &SignedVoucher) -> OpsResult<()> {
        let state = self.chain.channel_state(channel).await?;
        let epoch = self.chain.epoch().await?;
        validate_voucher(voucher, channel, state.as_ref(), epoch)?;

        if let Some(existing) = self
            .state
            .vouchers
            .get(channel, voucher.lane, voucher.nonce)?
        {
            if existing.voucher == *voucher {
                debug!(channel = %channel, lane = voucher.lane, nonce = voucher.nonce, "Voucher already stored");
                return Ok(());
            }
            return Err(OpsError::VoucherConflict {
                lane: voucher.lane,
                nonce: voucher.nonce,
            });
        }

        if let Some(state) = &state {
            self.register_inbound(channel, state)?;
        }
        self.store_voucher(voucher)?;

        info!(
            channel = %channel,
            lane = voucher.lane,
            nonce = voucher.nonce,
            amount = voucher.amount,
            "Voucher added"
        );
        Ok(())
    }

    /// Stored vouchers in lane then nonce order.
    pub fn list_vouchers(&self, channel: &Address) -> OpsResult<Vec<StoredVoucher>> {
        self.registered(channel)?;
        Ok(self.state.vouchers.list_for_channel(channel)?)
    }

    /// The spendable stored voucher with the highest amount.
    pub async fn best_spendable(&self, channel: &Address) -> OpsResult<StoredVoucher> {
        let vouchers = self.list_vouchers(channel)?;
        let state = self.chain.channel_state(channel).await?;
        let epoch = self.chain.epoch().await?;

        select_best_spendable(&vouchers, channel, state.as_ref(), epoch)
            .cloned()
            .ok_or(OpsError::NoSpendableVouchers)
    }

    /// Redeem a voucher on chain and wait for execution.
    ///
    /// A non-zero exit code is returned as [`OpsError::ExecutionFailed`].
    /// On success the stored voucher is marked submitted.
    pub async fn submit_voucher(
        &mut self,
        channel: &Address,
        voucher: &SignedVoucher,
    ) -> OpsResult<MessageLookup> {
        if voucher.channel != *channel {
            return Err(NotSpendable::WrongChannel {
                channel: channel.to_string(),
                voucher_channel: voucher.channel.to_string(),
            }
            .into());
        }

        let sender = self.payee_sender(channel).await?;
        let key = self.wallet.signing_key(&sender)?;
        let method = Method::UpdateChannelState {
            voucher: voucher.clone(),
        };
        let lookup = self.push_and_wait(&sender, &key, channel, method, 0).await?;

        match self
            .state
            .vouchers
            .get(channel, voucher.lane, voucher.nonce)?
        {
            Some(existing) if existing.voucher != *voucher => {
                warn!(
                    channel = %channel,
                    lane = voucher.lane,
                    nonce = voucher.nonce,
                    "Submitted voucher differs from stored one; store left unchanged"
                );
                return Ok(lookup);
            }
            Some(_) => {}
            None => {
                if let Some(state) = self.chain.channel_state(channel).await? {
                    self.register_inbound(channel, &state)?;
                }
                self.store_voucher(voucher)?;
            }
        }
        self.state
            .vouchers
            .mark_submitted(channel, voucher.lane, voucher.nonce, &lookup.id)?;

        info!(
            channel = %channel,
            lane = voucher.lane,
            nonce = voucher.nonce,
            message = %lookup.id,
            "Voucher submitted"
        );
        Ok(lookup)
    }

    // =========================================================================
    // Wallet and chain
    // =========================================================================

    /// Generate a new wallet address.
    pub fn new_address(&mut self) -> OpsResult<Address> {
        self.wallet.generate()
    }

    /// All wallet addresses.
    pub fn wallet_list(&self) -> OpsResult<Vec<Address>> {
        self.wallet.list()
    }

    /// On-chain balance of an address.
    pub async fn balance(&self, address: &Address) -> OpsResult<Amount> {
        Ok(self.chain.account(address).await?.balance)
    }

    /// Credit an address from the faucet. Returns the new balance.
    pub async fn fund(&self, address: &Address, amount: Amount) -> OpsResult<Amount> {
        let faucet = self.faucet.as_ref().ok_or(OpsError::FaucetUnavailable)?;
        Ok(faucet.fund(address, amount).await?)
    }

    /// Current chain height.
    pub async fn epoch(&self) -> OpsResult<Epoch> {
        Ok(self.chain.epoch().await?)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn registered(&self, channel: &Address) -> OpsResult<ChannelInfo> {
        self.state
            .channels
            .get(channel)?
            .ok_or(OpsError::ChannelNotFound(*channel))
    }

    fn register_inbound(&mut self, channel: &Address, state: &ChannelActorState) -> OpsResult<()> {
        if self.state.channels.exists(channel)? {
            return Ok(());
        }
        self.state
            .channels
            .insert(&ChannelInfo::inbound(*channel, state, current_timestamp()))?;
        info!(channel = %channel, from = %state.from, "Inbound channel registered");
        Ok(())
    }

    fn store_voucher(&mut self, voucher: &SignedVoucher) -> OpsResult<()> {
        let encoded = encode_voucher(voucher)?;
        self.state.vouchers.insert(&StoredVoucher::new(
            voucher.clone(),
            encoded,
            current_timestamp(),
        ))?;
        Ok(())
    }

    /// Channel parties, from the registry or else from chain state.
    async fn parties(&self, channel: &Address) -> OpsResult<(Address, Address)> {
        if let Some(info) = self.state.channels.get(channel)? {
            return Ok((info.from, info.to));
        }
        match self.chain.channel_state(channel).await? {
            Some(state) => Ok((state.from, state.to)),
            None => Err(OpsError::ChannelNotFound(*channel)),
        }
    }

    /// Wallet address to redeem with: the payee, falling back to the payer.
    async fn payee_sender(&self, channel: &Address) -> OpsResult<Address> {
        let (from, to) = self.parties(channel).await?;
        self.first_held(channel, [to, from])
    }

    /// Wallet address to settle or collect with: the payer, else the payee.
    async fn party_sender(&self, channel: &Address) -> OpsResult<Address> {
        let (from, to) = self.parties(channel).await?;
        self.first_held(channel, [from, to])
    }

    fn first_held(&self, channel: &Address, candidates: [Address; 2]) -> OpsResult<Address> {
        for candidate in candidates {
            if self.wallet.contains(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(OpsError::NotAParty(*channel))
    }

    /// Sign, push and wait for a message. Non-zero exit codes are errors.
    async fn push_and_wait(
        &self,
        from: &Address,
        key: &PrivateKey,
        to: &Address,
        method: Method,
        value: Amount,
    ) -> OpsResult<MessageLookup> {
        let nonce = self.chain.account(from).await?.nonce;
        let method_name = method.name();
        let message = Message::new(*from, *to, nonce, method).with_value(value);
        let signed = sign_message(message, key)?;

        let id = self.chain.push_message(signed).await?;
        debug!(message = %id, method = method_name, nonce, "Message pushed");

        let lookup = wait_message(&*self.chain, &id, &self.config.wait).await?;
        if !lookup.receipt.exit_code.is_success() {
            warn!(
                message = %id,
                method = method_name,
                exit_code = %lookup.receipt.exit_code,
                "Message execution failed"
            );
            return Err(OpsError::ExecutionFailed {
                exit_code: lookup.receipt.exit_code,
            });
        }
        Ok(lookup)
    }
}

/// Get the current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as Timestamp)
        .unwrap_or(0)
}
