//! Voucher validity, spendability and best-spendable selection.

use paych_crypto::Address;
use paych_types::{ChannelActorState, ChannelStatus, Epoch, SignedVoucher};
use paych_wire::verify_voucher_signature;

use crate::error::{NotSpendable, ValidationResult};
use crate::redeem::redeemed_total_after;

/// Check that a voucher could be redeemed on `channel` right now,
/// ignoring time locks and other known vouchers.
///
/// Checks, in order:
/// 1. The voucher names `channel`
/// 2. The channel exists on chain and still accepts updates at `epoch`
/// 3. The voucher is signed by the channel's `from` key
/// 4. The nonce is above the lane's redeemed nonce
/// 5. The redeemed total stays within the balance
pub fn validate_voucher(
    voucher: &SignedVoucher,
    channel: &Address,
    state: Option<&ChannelActorState>,
    epoch: Epoch,
) -> ValidationResult<()> {
    // 1. Channel matches
    if voucher.channel != *channel {
        return Err(NotSpendable::WrongChannel {
            channel: channel.to_string(),
            voucher_channel: voucher.channel.to_string(),
        });
    }

    // 2. Channel active
    let Some(state) = state else {
        return Err(NotSpendable::ChannelNotActive(
            "channel not found on chain".to_string(),
        ));
    };
    match state.status(epoch) {
        ChannelStatus::Active | ChannelStatus::Settling { .. } => {}
        ChannelStatus::Settled { settling_at } => {
            return Err(NotSpendable::ChannelNotActive(format!(
                "channel settled at epoch {}",
                settling_at
            )));
        }
        ChannelStatus::Collected => {
            return Err(NotSpendable::ChannelNotActive(
                "channel already collected".to_string(),
            ));
        }
    }

    // 3. Signature
    if voucher.signature.is_none() {
        return Err(NotSpendable::MissingSignature);
    }
    if !verify_voucher_signature(voucher, &state.from_key) {
        return Err(NotSpendable::InvalidSignature);
    }

    // 4. Nonce above the redeemed one
    if let Some(lane) = state.lane_states.get(&voucher.lane) {
        if voucher.nonce <= lane.nonce {
            return Err(NotSpendable::StaleNonce {
                nonce: voucher.nonce,
                redeemed_nonce: lane.nonce,
            });
        }
    }

    // 5. Within balance
    redeemed_total_after(state, voucher)?;

    Ok(())
}

/// Check that a voucher is spendable: valid, past its time lock, and not
/// superseded by a valid higher-nonce voucher in `known`.
pub fn check_spendable<T: AsRef<SignedVoucher>>(
    voucher: &SignedVoucher,
    channel: &Address,
    state: Option<&ChannelActorState>,
    epoch: Epoch,
    known: &[T],
) -> ValidationResult<()> {
    validate_voucher(voucher, channel, state, epoch)?;

    // 6. Time lock
    if epoch < voucher.time_lock_min {
        return Err(NotSpendable::TimeLocked {
            time_lock_min: voucher.time_lock_min,
            epoch,
        });
    }

    // 7. Newest valid voucher in the lane
    let newer = known
        .iter()
        .map(AsRef::as_ref)
        .filter(|other| {
            other.channel == voucher.channel
                && other.lane == voucher.lane
                && other.nonce > voucher.nonce
        })
        .filter(|other| validate_voucher(other, channel, state, epoch).is_ok())
        .map(|other| other.nonce)
        .max();

    if let Some(by_nonce) = newer {
        return Err(NotSpendable::Superseded { by_nonce });
    }

    Ok(())
}

/// Pick the spendable voucher with the highest amount.
///
/// Ties keep the earliest candidate, so callers pass vouchers in lane then
/// nonce order. Returns `None` when nothing is spendable.
pub fn select_best_spendable<'a, T: AsRef<SignedVoucher>>(
    candidates: &'a [T],
    channel: &Address,
    state: Option<&ChannelActorState>,
    epoch: Epoch,
) -> Option<&'a T> {
    let mut best: Option<&'a T> = None;
    for candidate in candidates {
        if check_spendable(candidate.as_ref(), channel, state, epoch, candidates).is_err() {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => candidate.as_ref().amount > current.as_ref().amount,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use paych_crypto::{generate_identity, Address, AddressKind, PrivateKey};
    use paych_types::{Amount, LaneState};
    use paych_wire::sign_voucher;

    struct Fixture {
        key: PrivateKey,
        channel: Address,
        state: ChannelActorState,
    }

    fn fixture(balance: Amount) -> Fixture {
        let (key, public_key) = generate_identity();
        let state = ChannelActorState::new(
            paych_crypto::account_address(&public_key),
            Address::new(AddressKind::Account, [2u8; 20]),
            public_key,
            balance,
        );
        Fixture {
            key,
            channel: Address::new(AddressKind::Actor, [9u8; 20]),
            state,
        }
    }

    impl Fixture {
        fn voucher(&self, lane: u64, nonce: u64, amount: Amount) -> SignedVoucher {
            sign_voucher(SignedVoucher::new(self.channel, lane, nonce, amount), &self.key).unwrap()
        }
    }

    #[test]
    fn test_valid_voucher() {
        let f = fixture(100);
        let v = f.voucher(0, 1, 50);
        assert_eq!(validate_voucher(&v, &f.channel, Some(&f.state), 1), Ok(()));
    }

    #[test]
    fn test_wrong_channel() {
        let f = fixture(100);
        let v = f.voucher(0, 1, 50);
        let other = Address::new(AddressKind::Actor, [1u8; 20]);
        assert!(matches!(
            validate_voucher(&v, &other, Some(&f.state), 1),
            Err(NotSpendable::WrongChannel { .. })
        ));
    }

    #[test]
    fn test_channel_missing_or_inactive() {
        let f = fixture(100);
        let v = f.voucher(0, 1, 50);
        assert!(matches!(
            validate_voucher(&v, &f.channel, None, 1),
            Err(NotSpendable::ChannelNotActive(_))
        ));

        let mut settling = f.state.clone();
        settling.settling_at = Some(10);
        assert_eq!(validate_voucher(&v, &f.channel, Some(&settling), 9), Ok(()));
        assert!(matches!(
            validate_voucher(&v, &f.channel, Some(&settling), 10),
            Err(NotSpendable::ChannelNotActive(_))
        ));

        let mut collected = f.state.clone();
        collected.collected = true;
        assert!(matches!(
            validate_voucher(&v, &f.channel, Some(&collected), 1),
            Err(NotSpendable::ChannelNotActive(_))
        ));
    }

    #[test]
    fn test_signature_checks() {
        let f = fixture(100);
        let unsigned = SignedVoucher::new(f.channel, 0, 1, 50);
        assert_eq!(
            validate_voucher(&unsigned, &f.channel, Some(&f.state), 1),
            Err(NotSpendable::MissingSignature)
        );

        let (stranger, _) = generate_identity();
        let forged = sign_voucher(unsigned, &stranger).unwrap();
        assert_eq!(
            validate_voucher(&forged, &f.channel, Some(&f.state), 1),
            Err(NotSpendable::InvalidSignature)
        );
    }

    #[test]
    fn test_stale_nonce() {
        let mut f = fixture(100);
        f.state.lane_states.insert(0, LaneState { redeemed: 10, nonce: 3 });
        f.state.to_send = 10;
        assert_eq!(
            validate_voucher(&f.voucher(0, 3, 50), &f.channel, Some(&f.state), 1),
            Err(NotSpendable::StaleNonce { nonce: 3, redeemed_nonce: 3 })
        );
        // Other lanes are unaffected.
        assert_eq!(
            validate_voucher(&f.voucher(1, 1, 50), &f.channel, Some(&f.state), 1),
            Ok(())
        );
    }

    #[test]
    fn test_exceeds_balance() {
        let f = fixture(100);
        assert!(matches!(
            validate_voucher(&f.voucher(0, 1, 101), &f.channel, Some(&f.state), 1),
            Err(NotSpendable::ExceedsBalance { required: 101, balance: 100 })
        ));
    }

    #[test]
    fn test_time_locked() {
        let f = fixture(100);
        let v = sign_voucher(
            SignedVoucher::new(f.channel, 0, 1, 50).with_time_lock_min(20),
            &f.key,
        )
        .unwrap();
        let none: &[SignedVoucher] = &[];

        assert_eq!(validate_voucher(&v, &f.channel, Some(&f.state), 5), Ok(()));
        assert_eq!(
            check_spendable(&v, &f.channel, Some(&f.state), 5, none),
            Err(NotSpendable::TimeLocked { time_lock_min: 20, epoch: 5 })
        );
        assert_eq!(check_spendable(&v, &f.channel, Some(&f.state), 20, none), Ok(()));
    }

    #[test]
    fn test_superseded() {
        let f = fixture(100);
        let old = f.voucher(0, 1, 30);
        let new = f.voucher(0, 2, 40);
        let other_lane = f.voucher(1, 5, 10);
        let known = vec![old.clone(), new.clone(), other_lane.clone()];

        assert_eq!(
            check_spendable(&old, &f.channel, Some(&f.state), 1, &known),
            Err(NotSpendable::Superseded { by_nonce: 2 })
        );
        assert_eq!(check_spendable(&new, &f.channel, Some(&f.state), 1, &known), Ok(()));
        assert_eq!(
            check_spendable(&other_lane, &f.channel, Some(&f.state), 1, &known),
            Ok(())
        );
    }

    #[test]
    fn test_invalid_newer_voucher_does_not_supersede() {
        let f = fixture(100);
        let old = f.voucher(0, 1, 30);
        // Newer voucher exceeds the balance, so it cannot replace the old one.
        let too_big = f.voucher(0, 2, 500);
        let known = vec![old.clone(), too_big];
        assert_eq!(check_spendable(&old, &f.channel, Some(&f.state), 1, &known), Ok(()));
    }

    #[test]
    fn test_best_spendable_picks_max_amount() {
        let f = fixture(1000);
        let vouchers = vec![
            f.voucher(0, 1, 100),
            f.voucher(0, 2, 300),
            f.voucher(1, 1, 250),
            f.voucher(2, 1, 200),
        ];
        let best = select_best_spendable(&vouchers, &f.channel, Some(&f.state), 1).unwrap();
        assert_eq!((best.lane, best.nonce, best.amount), (0, 2, 300));
    }

    #[test]
    fn test_best_spendable_skips_superseded_even_if_larger() {
        let f = fixture(1000);
        // Lane 0 nonce 1 has the largest amount but nonce 2 replaces it.
        let vouchers = vec![
            f.voucher(0, 1, 900),
            f.voucher(0, 2, 100),
            f.voucher(1, 1, 200),
        ];
        let best = select_best_spendable(&vouchers, &f.channel, Some(&f.state), 1).unwrap();
        assert_eq!((best.lane, best.nonce), (1, 1));
    }

    #[test]
    fn test_best_spendable_tie_keeps_first() {
        let f = fixture(1000);
        let vouchers = vec![f.voucher(0, 1, 200), f.voucher(1, 1, 200)];
        let best = select_best_spendable(&vouchers, &f.channel, Some(&f.state), 1).unwrap();
        assert_eq!(best.lane, 0);
    }

    #[test]
    fn test_best_spendable_none() {
        let f = fixture(100);
        let vouchers = vec![f.voucher(0, 1, 500)];
        assert!(select_best_spendable(&vouchers, &f.channel, Some(&f.state), 1).is_none());
        let empty: Vec<SignedVoucher> = Vec::new();
        assert!(select_best_spendable(&empty, &f.channel, Some(&f.state), 1).is_none());
    }
}
