//! Payment channel types.
//!
//! [`ChannelInfo`] is the local registry record. [`ChannelActorState`] is
//! the on-chain state the evaluator and the chain both reason about.

use std::collections::BTreeMap;

use paych_crypto::{Address, PublicKey, Timestamp};
use serde::{Deserialize, Serialize};

use crate::message::MessageId;
use crate::{Amount, Epoch, Lane, Nonce};

/// Which side of a channel the local wallet is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ChannelDirection {
    /// We pay (we are `from`).
    Outbound = 0,
    /// We get paid (we are `to`, or an observer).
    Inbound = 1,
}

impl ChannelDirection {
    /// Convert from the stored byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Outbound),
            1 => Some(Self::Inbound),
            _ => None,
        }
    }

    /// Lower-case name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
        }
    }
}

impl std::fmt::Display for ChannelDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A locally registered channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel actor address.
    pub address: Address,
    /// Payer.
    pub from: Address,
    /// Payee.
    pub to: Address,
    /// Our side of the channel.
    pub direction: ChannelDirection,
    /// Amount escrowed at creation (or observed when registered).
    pub amount: Amount,
    /// Message that created the channel, when we sent it.
    pub create_message: Option<MessageId>,
    /// When the record was created locally.
    pub created_at: Timestamp,
}

impl ChannelInfo {
    /// Registry record for a channel we created.
    pub fn outbound(
        address: Address,
        from: Address,
        to: Address,
        amount: Amount,
        create_message: MessageId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            address,
            from,
            to,
            direction: ChannelDirection::Outbound,
            amount,
            create_message: Some(create_message),
            created_at,
        }
    }

    /// Registry record for a channel learned from chain state.
    pub fn inbound(address: Address, state: &ChannelActorState, created_at: Timestamp) -> Self {
        Self {
            address,
            from: state.from,
            to: state.to,
            direction: ChannelDirection::Inbound,
            amount: state.balance,
            create_message: None,
            created_at,
        }
    }
}

/// Redeemed state of one lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneState {
    /// Cumulative amount redeemed on this lane.
    pub redeemed: Amount,
    /// Highest nonce redeemed on this lane.
    pub nonce: Nonce,
}

/// Lifecycle of a channel as seen at a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ChannelStatus {
    /// Accepting voucher updates.
    Active,
    /// Settle was called; updates are accepted until `settling_at`.
    Settling { settling_at: Epoch },
    /// Settling epoch reached; ready to collect.
    Settled { settling_at: Epoch },
    /// Funds paid out.
    Collected,
}

impl ChannelStatus {
    /// Whether vouchers can still be redeemed.
    pub fn accepts_updates(&self) -> bool {
        matches!(self, Self::Active | Self::Settling { .. })
    }

    /// Short name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Settling { .. } => "settling",
            Self::Settled { .. } => "settled",
            Self::Collected => "collected",
        }
    }
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-chain state of a payment channel actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelActorState {
    /// Payer.
    pub from: Address,
    /// Payee.
    pub to: Address,
    /// Key that must sign vouchers.
    pub from_key: PublicKey,
    /// Escrowed funds.
    pub balance: Amount,
    /// Sum of redeemed amounts across all lanes.
    pub to_send: Amount,
    /// Per-lane redeemed state.
    pub lane_states: BTreeMap<Lane, LaneState>,
    /// Epoch from which the channel can be collected.
    pub settling_at: Option<Epoch>,
    /// Whether the funds have been paid out.
    pub collected: bool,
}

impl ChannelActorState {
    /// Fresh state for a newly created channel.
    pub fn new(from: Address, to: Address, from_key: PublicKey, balance: Amount) -> Self {
        Self {
            from,
            to,
            from_key,
            balance,
            to_send: 0,
            lane_states: BTreeMap::new(),
            settling_at: None,
            collected: false,
        }
    }

    /// State of a lane, or the zero state if it was never redeemed.
    pub fn lane(&self, lane: Lane) -> LaneState {
        self.lane_states.get(&lane).copied().unwrap_or_default()
    }

    /// Whether the address is one of the two parties.
    pub fn is_party(&self, addr: &Address) -> bool {
        *addr == self.from || *addr == self.to
    }

    /// Lifecycle status at `epoch`.
    pub fn status(&self, epoch: Epoch) -> ChannelStatus {
        if self.collected {
            return ChannelStatus::Collected;
        }
        match self.settling_at {
            None => ChannelStatus::Active,
            Some(settling_at) if epoch < settling_at => ChannelStatus::Settling { settling_at },
            Some(settling_at) => ChannelStatus::Settled { settling_at },
        }
    }

    /// Funds not yet committed to any lane.
    pub fn remaining(&self) -> Amount {
        self.balance.saturating_sub(self.to_send)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paych_crypto::AddressKind;

    fn state() -> ChannelActorState {
        ChannelActorState::new(
            Address::new(AddressKind::Account, [1u8; 20]),
            Address::new(AddressKind::Account, [2u8; 20]),
            PublicKey::from_bytes([3u8; 32]),
            1000,
        )
    }

    #[test]
    fn test_status_transitions() {
        let mut s = state();
        assert_eq!(s.status(5), ChannelStatus::Active);

        s.settling_at = Some(10);
        assert_eq!(s.status(9), ChannelStatus::Settling { settling_at: 10 });
        assert!(s.status(9).accepts_updates());
        assert_eq!(s.status(10), ChannelStatus::Settled { settling_at: 10 });
        assert!(!s.status(10).accepts_updates());

        s.collected = true;
        assert_eq!(s.status(11), ChannelStatus::Collected);
    }

    #[test]
    fn test_missing_lane_is_zero() {
        let s = state();
        assert_eq!(s.lane(4), LaneState::default());
    }

    #[test]
    fn test_is_party() {
        let s = state();
        assert!(s.is_party(&s.from));
        assert!(s.is_party(&s.to));
        assert!(!s.is_party(&Address::new(AddressKind::Account, [9u8; 20])));
    }

    #[test]
    fn test_direction_roundtrip() {
        for d in [ChannelDirection::Outbound, ChannelDirection::Inbound] {
            assert_eq!(ChannelDirection::from_u8(d as u8), Some(d));
        }
        assert_eq!(ChannelDirection::from_u8(7), None);
    }
}
