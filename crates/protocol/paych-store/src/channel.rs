//! Channel registry storage.

use std::sync::{Arc, Mutex};

use paych_crypto::Address;
use paych_types::{ChannelDirection, ChannelInfo};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::columns::{address_column, message_id_column, to_sql_u64, u64_column};
use crate::error::{Result, StoreError};
use crate::traits::ChannelStore;

const SELECT_CHANNEL: &str = "SELECT address, from_addr, to_addr, direction, amount, create_message, created_at FROM channels";

/// SQLite-based channel registry.
pub struct SqliteChannelStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteChannelStore {
    /// Create a new channel store with the given database connection.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn deserialize_channel(row: &Row) -> rusqlite::Result<ChannelInfo> {
        let direction_u8: u8 = row.get(3)?;
        let direction = ChannelDirection::from_u8(direction_u8).ok_or(
            rusqlite::Error::IntegralValueOutOfRange(3, direction_u8 as i64),
        )?;

        Ok(ChannelInfo {
            address: address_column(row, 0)?,
            from: address_column(row, 1)?,
            to: address_column(row, 2)?,
            direction,
            amount: u64_column(row, 4)?,
            create_message: message_id_column(row, 5)?,
            created_at: u64_column(row, 6)?,
        })
    }
}

impl ChannelStore for SqliteChannelStore {
    fn insert(&mut self, info: &ChannelInfo) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let address_bytes = info.address.to_bytes().to_vec();
        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM channels WHERE address = ?1",
                [&address_bytes],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::ChannelExists(info.address));
        }

        conn.execute(
            "INSERT INTO channels (address, from_addr, to_addr, direction, amount, create_message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                address_bytes,
                info.from.to_bytes().to_vec(),
                info.to.to_bytes().to_vec(),
                info.direction as u8,
                to_sql_u64(info.amount),
                info.create_message.map(|id| id.0 .0.to_vec()),
                to_sql_u64(info.created_at),
            ],
        )?;

        tracing::debug!(channel = %info.address, direction = %info.direction, "Channel registered");
        Ok(())
    }

    fn get(&self, address: &Address) -> Result<Option<ChannelInfo>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let info = conn
            .query_row(
                &format!("{} WHERE address = ?1", SELECT_CHANNEL),
                [address.to_bytes().to_vec()],
                Self::deserialize_channel,
            )
            .optional()?;
        Ok(info)
    }

    fn list(&self) -> Result<Vec<ChannelInfo>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let mut stmt = conn.prepare(SELECT_CHANNEL)?;
        let mut channels = stmt
            .query_map([], Self::deserialize_channel)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        channels.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.address.cmp(&b.address))
        });
        Ok(channels)
    }

    fn exists(&self, address: &Address) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::lock_poisoned("database connection lock poisoned"))?;

        let exists = conn
            .query_row(
                "SELECT 1 FROM channels WHERE address = ?1",
                [address.to_bytes().to_vec()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::initialize_schema;
    use paych_crypto::{sha256, AddressKind};
    use paych_types::MessageId;

    fn setup() -> SqliteChannelStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        SqliteChannelStore::new(Arc::new(Mutex::new(conn)))
    }

    fn info(seed: u8, created_at: u64) -> ChannelInfo {
        ChannelInfo::outbound(
            Address::new(AddressKind::Actor, [seed; 20]),
            Address::new(AddressKind::Account, [1u8; 20]),
            Address::new(AddressKind::Account, [2u8; 20]),
            1_000,
            MessageId(sha256(&[seed])),
            created_at,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = setup();
        let channel = info(9, 100);
        store.insert(&channel).unwrap();

        assert!(store.exists(&channel.address).unwrap());
        assert_eq!(store.get(&channel.address).unwrap(), Some(channel));
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let mut store = setup();
        let channel = info(9, 100);
        store.insert(&channel).unwrap();
        assert!(matches!(
            store.insert(&channel),
            Err(StoreError::ChannelExists(_))
        ));
    }

    #[test]
    fn test_get_missing() {
        let store = setup();
        let addr = Address::new(AddressKind::Actor, [7u8; 20]);
        assert_eq!(store.get(&addr).unwrap(), None);
        assert!(!store.exists(&addr).unwrap());
    }

    #[test]
    fn test_list_ordered_by_creation() {
        let mut store = setup();
        store.insert(&info(3, 300)).unwrap();
        store.insert(&info(1, 100)).unwrap();
        store.insert(&info(2, 100)).unwrap();

        let listed: Vec<u64> = store.list().unwrap().iter().map(|c| c.created_at).collect();
        assert_eq!(listed, vec![100, 100, 300]);

        let first_two = store.list().unwrap();
        assert!(first_two[0].address < first_two[1].address);
    }

    #[test]
    fn test_inbound_without_create_message() {
        let mut store = setup();
        let mut channel = info(5, 10);
        channel.direction = ChannelDirection::Inbound;
        channel.create_message = None;
        store.insert(&channel).unwrap();
        assert_eq!(store.get(&channel.address).unwrap(), Some(channel));
    }
}
