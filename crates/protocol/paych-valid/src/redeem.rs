//! Redemption arithmetic shared by the evaluator and the chain actor.
//!
//! Voucher amounts are cumulative per lane. Redeeming a voucher replaces
//! the lane's redeemed amount:
//!
//! ```text
//! new_to_send = to_send - lane.redeemed + voucher.amount
//! ```
//!
//! The result must lie in `[0, balance]`.

use paych_types::{Amount, ChannelActorState, SignedVoucher};

use crate::error::{NotSpendable, ValidationResult};

/// Channel-wide redeemed total after redeeming `voucher`.
pub fn redeemed_total_after(
    state: &ChannelActorState,
    voucher: &SignedVoucher,
) -> ValidationResult<Amount> {
    let lane = state.lane(voucher.lane);
    let required =
        state.to_send as i128 - lane.redeemed as i128 + voucher.amount as i128;

    if required < 0 || required > state.balance as i128 {
        return Err(NotSpendable::ExceedsBalance {
            required,
            balance: state.balance,
        });
    }

    Ok(required as Amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paych_crypto::{Address, AddressKind, PublicKey};
    use paych_types::LaneState;

    fn state(balance: Amount) -> ChannelActorState {
        ChannelActorState::new(
            Address::new(AddressKind::Account, [1u8; 20]),
            Address::new(AddressKind::Account, [2u8; 20]),
            PublicKey::from_bytes([0u8; 32]),
            balance,
        )
    }

    fn voucher(lane: u64, amount: Amount) -> SignedVoucher {
        SignedVoucher::new(Address::new(AddressKind::Actor, [3u8; 20]), lane, 1, amount)
    }

    #[test]
    fn test_fresh_lane() {
        assert_eq!(redeemed_total_after(&state(100), &voucher(0, 60)), Ok(60));
    }

    #[test]
    fn test_cumulative_within_lane() {
        let mut s = state(100);
        s.to_send = 50;
        s.lane_states.insert(0, LaneState { redeemed: 50, nonce: 1 });
        // Same lane: replaces 50 with 90.
        assert_eq!(redeemed_total_after(&s, &voucher(0, 90)), Ok(90));
        // Other lane: adds.
        assert!(matches!(
            redeemed_total_after(&s, &voucher(1, 60)),
            Err(NotSpendable::ExceedsBalance { required: 110, balance: 100 })
        ));
    }

    #[test]
    fn test_exactly_balance_allowed() {
        assert_eq!(redeemed_total_after(&state(100), &voucher(0, 100)), Ok(100));
    }

    #[test]
    fn test_no_overflow_at_extremes() {
        let mut s = state(u64::MAX);
        s.to_send = u64::MAX;
        s.lane_states.insert(0, LaneState { redeemed: 0, nonce: 1 });
        assert!(matches!(
            redeemed_total_after(&s, &voucher(1, u64::MAX)),
            Err(NotSpendable::ExceedsBalance { .. })
        ));
    }
}
