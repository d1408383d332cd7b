//! Column conversions between SQLite values and protocol types.
//!
//! Unsigned 64-bit values are stored as their `i64` bit pattern, so
//! ordering by these columns in SQL is not meaningful above `i64::MAX`.
//! Callers sort in Rust instead.

use paych_crypto::{Address, Hash, Signature};
use paych_types::MessageId;
use rusqlite::types::Type;
use rusqlite::Row;

pub(crate) fn to_sql_u64(value: u64) -> i64 {
    value as i64
}

pub(crate) fn u64_column(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(idx)?;
    Ok(value as u64)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Blob, Box::new(err))
}

#[derive(Debug, thiserror::Error)]
#[error("expected {expected} bytes, got {actual}")]
struct LengthError {
    expected: usize,
    actual: usize,
}

fn fixed_column<const N: usize>(row: &Row, idx: usize) -> rusqlite::Result<[u8; N]> {
    let bytes: Vec<u8> = row.get(idx)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| conversion_error(idx, LengthError { expected: N, actual }))
}

pub(crate) fn address_column(row: &Row, idx: usize) -> rusqlite::Result<Address> {
    let bytes: Vec<u8> = row.get(idx)?;
    Address::from_bytes(&bytes).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn signature_column(row: &Row, idx: usize) -> rusqlite::Result<Option<Signature>> {
    let present: Option<Vec<u8>> = row.get(idx)?;
    match present {
        None => Ok(None),
        Some(_) => fixed_column::<64>(row, idx).map(|b| Some(Signature::from_bytes(b))),
    }
}

pub(crate) fn message_id_column(row: &Row, idx: usize) -> rusqlite::Result<Option<MessageId>> {
    let present: Option<Vec<u8>> = row.get(idx)?;
    match present {
        None => Ok(None),
        Some(_) => fixed_column::<32>(row, idx).map(|b| Some(MessageId(Hash(b)))),
    }
}
