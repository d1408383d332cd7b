//! Voucher storage.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use paych_crypto::Address;
use paych_types::{Amount, Lane, MessageId, Nonce, SignedVoucher};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::columns::{
    address_column, message_id_column, signature_column, to_sql_u64, u64_column,
};
use crate::error::{Result, StoreError};
use crate::traits::VoucherStore;
use crate::types::StoredVoucher;

const SELECT_VOUCHER: &str = "SELECT channel, lane, nonce, amount, time_lock_min, signature, encoded, submitted, submit_message, added_at FROM vouchers";

/// SQLite-based voucher store.
pub struct SqliteVoucherStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteVoucherStore {
    /// Create a new voucher store with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn deserialize_voucher(row: &Row) -> rusqlite::Result<StoredVoucher> {
        let voucher = SignedVoucher {
            channel: address_column(row, 0)?,
            lane: u64_column(row, 1)?,
            nonce: u64_column(row, 2)?,
            amount: u64_column(row, 3)?,
            time_lock_min: u64_column(row, 4)?,
            signature: signature_column(row, 5)?,
        };
        let submitted: i64 = row.get(7)?;

        Ok(StoredVoucher {
            voucher,
            encoded: row.get(6)?,
            submitted: submitted != 0,
            submit_message: message_id_column(row, 8)?,
            added_at: u64_column(row, 9)?,
        })
    }

    fn load_channel(conn: &Connection, channel: &Address) -> Result<Vec<StoredVoucher>> {
        let mut stmt = conn.prepare(&format!("{} WHERE channel = ?1", SELECT_VOUCHER))?;
        let mut vouchers = stmt
            .query_map([channel.to_bytes().to_vec()], Self::deserialize_voucher)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        vouchers.sort_by_key(|v| (v.voucher.lane, v.voucher.nonce));
        Ok(vouchers)
    }
}

impl VoucherStore for SqliteVoucherStore {
    fn insert(&mut self, stored: &StoredVoucher) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let v = &stored.voucher;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO vouchers (channel, lane, nonce, amount, time_lock_min, signature, encoded, submitted, submit_message, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                v.channel.to_bytes().to_vec(),
                to_sql_u64(v.lane),
                to_sql_u64(v.nonce),
                to_sql_u64(v.amount),
                to_sql_u64(v.time_lock_min),
                v.signature.map(|s| s.0.to_vec()),
                stored.encoded,
                stored.submitted as i64,
                stored.submit_message.map(|id| id.0 .0.to_vec()),
                to_sql_u64(stored.added_at),
            ],
        )?;

        if inserted == 0 {
            return Err(StoreError::VoucherExists {
                lane: v.lane,
                nonce: v.nonce,
            });
        }

        tracing::debug!(channel = %v.channel, lane = v.lane, nonce = v.nonce, "Voucher stored");
        Ok(())
    }

    fn get(&self, channel: &Address, lane: Lane, nonce: Nonce) -> Result<Option<StoredVoucher>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let voucher = conn
            .query_row(
                &format!(
                    "{} WHERE channel = ?1 AND lane = ?2 AND nonce = ?3",
                    SELECT_VOUCHER
                ),
                params![
                    channel.to_bytes().to_vec(),
                    to_sql_u64(lane),
                    to_sql_u64(nonce)
                ],
                Self::deserialize_voucher,
            )
            .optional()?;
        Ok(voucher)
    }

    fn list_for_channel(&self, channel: &Address) -> Result<Vec<StoredVoucher>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;
        Self::load_channel(&conn, channel)
    }

    fn mark_submitted(
        &mut self,
        channel: &Address,
        lane: Lane,
        nonce: Nonce,
        message: &MessageId,
    ) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let updated = conn.execute(
            "UPDATE vouchers SET submitted = 1, submit_message = ?4
             WHERE channel = ?1 AND lane = ?2 AND nonce = ?3",
            params![
                channel.to_bytes().to_vec(),
                to_sql_u64(lane),
                to_sql_u64(nonce),
                message.0 .0.to_vec(),
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::VoucherNotFound { lane, nonce });
        }
        Ok(())
    }

    fn max_nonce(&self, channel: &Address, lane: Lane) -> Result<Option<Nonce>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut stmt = conn.prepare("SELECT nonce FROM vouchers WHERE channel = ?1 AND lane = ?2")?;
        let nonces = stmt
            .query_map(
                params![channel.to_bytes().to_vec(), to_sql_u64(lane)],
                |row| u64_column(row, 0),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(nonces.into_iter().max())
    }

    fn best_per_lane(&self, channel: &Address) -> Result<BTreeMap<Lane, Amount>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut best = BTreeMap::new();
        for stored in Self::load_channel(&conn, channel)? {
            let entry = best.entry(stored.voucher.lane).or_insert(0);
            *entry = (*entry).max(stored.voucher.amount);
        }
        Ok(best)
    }

    fn count(&self, channel: &Address) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM vouchers WHERE channel = ?1",
            [channel.to_bytes().to_vec()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
