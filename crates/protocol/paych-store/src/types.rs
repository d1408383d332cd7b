//! Records persisted by the store.

use paych_crypto::Timestamp;
use paych_types::{MessageId, SignedVoucher};
use serde::{Deserialize, Serialize};

/// A voucher kept in the voucher store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredVoucher {
    /// The voucher itself.
    pub voucher: SignedVoucher,
    /// Its string form, as exchanged between parties.
    pub encoded: String,
    /// Whether it was redeemed on chain by us.
    pub submitted: bool,
    /// Message that redeemed it.
    pub submit_message: Option<MessageId>,
    /// When it was stored (ms since Unix epoch).
    pub added_at: Timestamp,
}

impl StoredVoucher {
    /// New, unsubmitted record.
    pub fn new(voucher: SignedVoucher, encoded: String, added_at: Timestamp) -> Self {
        Self {
            voucher,
            encoded,
            submitted: false,
            submit_message: None,
            added_at,
        }
    }
}

impl AsRef<SignedVoucher> for StoredVoucher {
    fn as_ref(&self) -> &SignedVoucher {
        &self.voucher
    }
}
