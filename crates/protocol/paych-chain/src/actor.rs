//! Payment channel actor rules.
//!
//! Pure state transitions over [`ChannelActorState`]. Each rule either
//! returns the new state (or payout) or an [`ActorError`] carrying the exit
//! code for the receipt. Callers write nothing when a rule fails.

use paych_crypto::{Address, PublicKey};
use paych_types::{
    Amount, ChannelActorState, ChannelStatus, Epoch, ExitCode, LaneState, SignedVoucher,
};
use paych_valid::redeemed_total_after;
use paych_wire::verify_voucher_signature;

/// A failed actor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorError {
    /// Exit code written to the receipt.
    pub exit_code: ExitCode,
    /// Reason, for logs only.
    pub reason: String,
}

impl ActorError {
    fn new(exit_code: ExitCode, reason: impl Into<String>) -> Self {
        Self {
            exit_code,
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal_argument(reason: impl Into<String>) -> Self {
        Self::new(ExitCode::ILLEGAL_ARGUMENT, reason)
    }

    pub(crate) fn not_found(reason: impl Into<String>) -> Self {
        Self::new(ExitCode::NOT_FOUND, reason)
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::new(ExitCode::FORBIDDEN, reason)
    }

    pub(crate) fn insufficient_funds(reason: impl Into<String>) -> Self {
        Self::new(ExitCode::INSUFFICIENT_FUNDS, reason)
    }

    pub(crate) fn illegal_state(reason: impl Into<String>) -> Self {
        Self::new(ExitCode::ILLEGAL_STATE, reason)
    }
}

/// Result type for actor calls.
pub type ActorResult<T> = Result<T, ActorError>;

/// Funds released by a collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Paid to `to`: the redeemed total.
    pub to_payee: Amount,
    /// Returned to `from`: the unredeemed remainder.
    pub to_payer: Amount,
}

/// Construct a new channel funded with `value` by `from`.
pub fn construct(
    from: &Address,
    from_key: &PublicKey,
    from_balance: Amount,
    to: &Address,
    value: Amount,
) -> ActorResult<ChannelActorState> {
    if !to.is_account() {
        return Err(ActorError::illegal_argument(format!(
            "payee {} is not an account address",
            to
        )));
    }
    if from_balance < value {
        return Err(ActorError::insufficient_funds(format!(
            "balance {} below channel amount {}",
            from_balance, value
        )));
    }
    Ok(ChannelActorState::new(*from, *to, *from_key, value))
}

/// Redeem a voucher against the channel at `channel`.
pub fn update_channel_state(
    state: &ChannelActorState,
    channel: &Address,
    caller: &Address,
    voucher: &SignedVoucher,
    epoch: Epoch,
) -> ActorResult<ChannelActorState> {
    if !state.is_party(caller) {
        return Err(ActorError::forbidden(format!(
            "{} is not a party to the channel",
            caller
        )));
    }
    if !state.status(epoch).accepts_updates() {
        return Err(ActorError::illegal_state(format!(
            "channel is {}",
            state.status(epoch)
        )));
    }
    if voucher.channel != *channel {
        return Err(ActorError::illegal_argument(format!(
            "voucher is for channel {}",
            voucher.channel
        )));
    }
    if !verify_voucher_signature(voucher, &state.from_key) {
        return Err(ActorError::illegal_argument("voucher signature invalid"));
    }
    if epoch < voucher.time_lock_min {
        return Err(ActorError::illegal_argument(format!(
            "voucher time locked until epoch {}",
            voucher.time_lock_min
        )));
    }
    let lane = state.lane(voucher.lane);
    if state.lane_states.contains_key(&voucher.lane) && voucher.nonce <= lane.nonce {
        return Err(ActorError::illegal_argument(format!(
            "voucher nonce {} not above lane nonce {}",
            voucher.nonce, lane.nonce
        )));
    }
    let to_send = redeemed_total_after(state, voucher)
        .map_err(|e| ActorError::illegal_argument(e.to_string()))?;

    let mut next = state.clone();
    next.lane_states.insert(
        voucher.lane,
        LaneState {
            redeemed: voucher.amount,
            nonce: voucher.nonce,
        },
    );
    next.to_send = to_send;
    Ok(next)
}

/// Start the settlement delay.
pub fn settle(
    state: &ChannelActorState,
    caller: &Address,
    epoch: Epoch,
    settle_delay: Epoch,
) -> ActorResult<ChannelActorState> {
    if !state.is_party(caller) {
        return Err(ActorError::forbidden(format!(
            "{} is not a party to the channel",
            caller
        )));
    }
    if state.status(epoch) != ChannelStatus::Active {
        return Err(ActorError::illegal_state(format!(
            "channel is already {}",
            state.status(epoch)
        )));
    }

    let mut next = state.clone();
    next.settling_at = Some(epoch.saturating_add(settle_delay));
    Ok(next)
}

/// Pay out a settled channel and mark it collected.
pub fn collect(
    state: &ChannelActorState,
    caller: &Address,
    epoch: Epoch,
) -> ActorResult<(ChannelActorState, Payout)> {
    if !state.is_party(caller) {
        return Err(ActorError::forbidden(format!(
            "{} is not a party to the channel",
            caller
        )));
    }
    match state.status(epoch) {
        ChannelStatus::Settled { .. } => {}
        status => {
            return Err(ActorError::illegal_state(format!(
                "channel is {}, cannot collect",
                status
            )));
        }
    }

    let payout = Payout {
        to_payee: state.to_send,
        to_payer: state.remaining(),
    };
    let mut next = state.clone();
    next.collected = true;
    Ok((next, payout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paych_crypto::{account_address, generate_identity, AddressKind, PrivateKey};
    use paych_wire::sign_voucher;

    struct Fixture {
        key: PrivateKey,
        payee: Address,
        channel: Address,
        state: ChannelActorState,
    }

    fn fixture(balance: Amount) -> Fixture {
        let (key, public_key) = generate_identity();
        let from = account_address(&public_key);
        let payee = Address::new(AddressKind::Account, [7u8; 20]);
        let state = construct(&from, &public_key, balance, &payee, balance).unwrap();
        Fixture {
            key,
            payee,
            channel: Address::new(AddressKind::Actor, [3u8; 20]),
            state,
        }
    }

    impl Fixture {
        fn voucher(&self, lane: u64, nonce: u64, amount: Amount) -> SignedVoucher {
            sign_voucher(SignedVoucher::new(self.channel, lane, nonce, amount), &self.key).unwrap()
        }
    }

    #[test]
    fn test_construct_rules() {
        let (_, key) = generate_identity();
        let from = account_address(&key);
        let actor = Address::new(AddressKind::Actor, [1u8; 20]);
        let payee = Address::new(AddressKind::Account, [1u8; 20]);

        let err = construct(&from, &key, 100, &actor, 10).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_ARGUMENT);

        let err = construct(&from, &key, 5, &payee, 10).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::INSUFFICIENT_FUNDS);

        let state = construct(&from, &key, 10, &payee, 10).unwrap();
        assert_eq!(state.balance, 10);
        assert_eq!(state.from_key, key);
    }

    #[test]
    fn test_update_replaces_lane_amount() {
        let f = fixture(100);
        let s1 = update_channel_state(&f.state, &f.channel, &f.payee, &f.voucher(0, 1, 30), 1)
            .unwrap();
        assert_eq!(s1.to_send, 30);

        // Cumulative amount: nonce 2 for 50 adds 20, not 50.
        let s2 = update_channel_state(&s1, &f.channel, &f.payee, &f.voucher(0, 2, 50), 2).unwrap();
        assert_eq!(s2.to_send, 50);
        assert_eq!(s2.lane(0), LaneState { redeemed: 50, nonce: 2 });

        let s3 = update_channel_state(&s2, &f.channel, &f.payee, &f.voucher(1, 1, 40), 3).unwrap();
        assert_eq!(s3.to_send, 90);
    }

    #[test]
    fn test_update_rejections() {
        let f = fixture(100);
        let stranger = Address::new(AddressKind::Account, [8u8; 20]);
        let v = f.voucher(0, 1, 30);

        let err = update_channel_state(&f.state, &f.channel, &stranger, &v, 1).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FORBIDDEN);

        let other = Address::new(AddressKind::Actor, [4u8; 20]);
        let err = update_channel_state(&f.state, &other, &f.payee, &v, 1).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_ARGUMENT);

        let (stranger_key, _) = generate_identity();
        let forged =
            sign_voucher(SignedVoucher::new(f.channel, 0, 1, 30), &stranger_key).unwrap();
        let err = update_channel_state(&f.state, &f.channel, &f.payee, &forged, 1).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_ARGUMENT);

        let big = f.voucher(0, 1, 101);
        let err = update_channel_state(&f.state, &f.channel, &f.payee, &big, 1).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_ARGUMENT);

        let locked = sign_voucher(
            SignedVoucher::new(f.channel, 0, 1, 10).with_time_lock_min(5),
            &f.key,
        )
        .unwrap();
        let err = update_channel_state(&f.state, &f.channel, &f.payee, &locked, 4).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_ARGUMENT);
        assert!(update_channel_state(&f.state, &f.channel, &f.payee, &locked, 5).is_ok());
    }

    #[test]
    fn test_update_stale_nonce() {
        let f = fixture(100);
        let s1 = update_channel_state(&f.state, &f.channel, &f.payee, &f.voucher(0, 3, 30), 1)
            .unwrap();
        let err = update_channel_state(&s1, &f.channel, &f.payee, &f.voucher(0, 3, 40), 2)
            .unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_ARGUMENT);
    }

    #[test]
    fn test_settle_and_collect() {
        let f = fixture(100);
        let s1 = update_channel_state(&f.state, &f.channel, &f.payee, &f.voucher(0, 1, 70), 1)
            .unwrap();

        let err = collect(&s1, &f.payee, 2).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_STATE);

        let settling = settle(&s1, &f.payee, 2, 10).unwrap();
        assert_eq!(settling.settling_at, Some(12));
        let err = settle(&settling, &f.payee, 3, 10).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_STATE);

        // Updates still allowed while settling, rejected once settled.
        assert!(
            update_channel_state(&settling, &f.channel, &f.payee, &f.voucher(0, 2, 80), 11)
                .is_ok()
        );
        let err =
            update_channel_state(&settling, &f.channel, &f.payee, &f.voucher(0, 2, 80), 12)
                .unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_STATE);

        let err = collect(&settling, &f.payee, 11).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_STATE);

        let (collected, payout) = collect(&settling, &f.state.from, 12).unwrap();
        assert!(collected.collected);
        assert_eq!(payout, Payout { to_payee: 70, to_payer: 30 });

        let err = collect(&collected, &f.payee, 13).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::ILLEGAL_STATE);
    }

    #[test]
    fn test_settle_forbidden_for_stranger() {
        let f = fixture(100);
        let stranger = Address::new(AddressKind::Account, [8u8; 20]);
        assert_eq!(
            settle(&f.state, &stranger, 1, 10).unwrap_err().exit_code,
            ExitCode::FORBIDDEN
        );
        assert_eq!(
            collect(&f.state, &stranger, 1).unwrap_err().exit_code,
            ExitCode::FORBIDDEN
        );
    }
}
