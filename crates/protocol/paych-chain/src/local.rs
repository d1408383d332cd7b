//! Single-node SQLite devnet.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use paych_crypto::{account_address, actor_address, Address};
use paych_types::{
    AccountState, Amount, ChannelActorState, Epoch, ExitCode, Message, MessageId, MessageLookup,
    MessageReceipt, Method, SignedMessage,
};
use paych_wire::{decode_payload, encode_payload, message_id, verify_message};

use crate::actor::{self, ActorError, ActorResult};
use crate::config::ChainConfig;
use crate::error::{ChainError, ChainResult};
use crate::traits::{Chain, Faucet};

/// Local chain executing each message in its own epoch as soon as it is
/// pushed.
///
/// Cloning shares the underlying database.
#[derive(Clone)]
pub struct LocalChain {
    conn: Arc<Mutex<Connection>>,
    config: ChainConfig,
}

impl LocalChain {
    /// Open (or create) the chain database at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: ChainConfig) -> ChainResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, config)
    }

    /// Chain that lives only as long as this value and its clones.
    pub fn in_memory(config: ChainConfig) -> ChainResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    fn with_connection(conn: Connection, config: ChainConfig) -> ChainResult<Self> {
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Chain parameters.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Advance the epoch by `blocks` empty blocks. Returns the new epoch.
    pub fn mine(&self, blocks: u64) -> ChainResult<Epoch> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let epoch = get_epoch(&tx)?.saturating_add(blocks);
        set_epoch(&tx, epoch)?;
        tx.commit()?;
        info!(blocks, epoch, "Mined empty blocks");
        Ok(epoch)
    }

    fn lock(&self) -> ChainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ChainError::internal("chain lock poisoned"))
    }

    /// Run `signed` against the current state. Writes happen only when the
    /// actor call succeeds.
    fn apply(
        &self,
        conn: &Connection,
        signed: &SignedMessage,
        epoch: Epoch,
    ) -> ChainResult<ActorResult<Vec<u8>>> {
        let message = &signed.message;
        let sender = load_account(conn, &message.from)?;

        if !matches!(message.method, Method::CreateChannel) && message.value != 0 {
            return Ok(Err(ActorError::illegal_argument(format!(
                "method {} does not accept value",
                message.method.name()
            ))));
        }

        match &message.method {
            Method::CreateChannel => {
                let state = match actor::construct(
                    &message.from,
                    &signed.signer,
                    sender.balance,
                    &message.to,
                    message.value,
                ) {
                    Ok(state) => state,
                    Err(e) => return Ok(Err(e)),
                };
                let channel = actor_address(&message.from, message.nonce);
                if load_actor(conn, &channel)?.is_some() {
                    return Ok(Err(ActorError::illegal_state(format!(
                        "actor {} already exists",
                        channel
                    ))));
                }

                store_actor(conn, &channel, &state)?;
                store_account(
                    conn,
                    &message.from,
                    &AccountState {
                        balance: sender.balance - message.value,
                        nonce: sender.nonce,
                    },
                )?;
                info!(
                    channel = %channel,
                    from = %message.from,
                    to = %message.to,
                    amount = message.value,
                    "Channel created"
                );
                Ok(Ok(encode_payload(&channel)?))
            }
            Method::UpdateChannelState { voucher } => {
                let Some(state) = load_actor(conn, &message.to)? else {
                    return Ok(Err(not_found(&message.to)));
                };
                let next = match actor::update_channel_state(
                    &state,
                    &message.to,
                    &message.from,
                    voucher,
                    epoch,
                ) {
                    Ok(next) => next,
                    Err(e) => return Ok(Err(e)),
                };
                store_actor(conn, &message.to, &next)?;
                info!(
                    channel = %message.to,
                    lane = voucher.lane,
                    nonce = voucher.nonce,
                    amount = voucher.amount,
                    to_send = next.to_send,
                    "Voucher redeemed"
                );
                Ok(Ok(Vec::new()))
            }
            Method::Settle => {
                let Some(state) = load_actor(conn, &message.to)? else {
                    return Ok(Err(not_found(&message.to)));
                };
                let next =
                    match actor::settle(&state, &message.from, epoch, self.config.settle_delay) {
                        Ok(next) => next,
                        Err(e) => return Ok(Err(e)),
                    };
                store_actor(conn, &message.to, &next)?;
                info!(channel = %message.to, settling_at = ?next.settling_at, "Channel settling");
                Ok(Ok(Vec::new()))
            }
            Method::Collect => {
                let Some(state) = load_actor(conn, &message.to)? else {
                    return Ok(Err(not_found(&message.to)));
                };
                let (next, payout) = match actor::collect(&state, &message.from, epoch) {
                    Ok(collected) => collected,
                    Err(e) => return Ok(Err(e)),
                };
                store_actor(conn, &message.to, &next)?;
                credit(conn, &next.to, payout.to_payee)?;
                credit(conn, &next.from, payout.to_payer)?;
                info!(
                    channel = %message.to,
                    to_payee = payout.to_payee,
                    to_payer = payout.to_payer,
                    "Channel collected"
                );
                Ok(Ok(Vec::new()))
            }
        }
    }
}

impl std::fmt::Debug for LocalChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalChain")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Chain for LocalChain {
    async fn push_message(&self, signed: SignedMessage) -> ChainResult<MessageId> {
        if !verify_message(&signed) {
            return Err(ChainError::InvalidSignature);
        }
        let signer = account_address(&signed.signer);
        if signer != signed.message.from {
            return Err(ChainError::SenderMismatch {
                from: signed.message.from,
                signer,
            });
        }
        let id = message_id(&signed)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let sender = load_account(&tx, &signed.message.from)?;
        if signed.message.nonce != sender.nonce {
            return Err(ChainError::NonceMismatch {
                expected: sender.nonce,
                got: signed.message.nonce,
            });
        }

        let epoch = get_epoch(&tx)?.saturating_add(1);
        set_epoch(&tx, epoch)?;
        store_account(
            &tx,
            &signed.message.from,
            &AccountState {
                balance: sender.balance,
                nonce: sender.nonce + 1,
            },
        )?;

        let receipt = match self.apply(&tx, &signed, epoch)? {
            Ok(return_value) => MessageReceipt {
                exit_code: ExitCode::OK,
                return_value,
                epoch,
            },
            Err(e) => {
                warn!(
                    message = %id,
                    method = signed.message.method.name(),
                    exit_code = %e.exit_code,
                    reason = %e.reason,
                    "Message execution failed"
                );
                MessageReceipt {
                    exit_code: e.exit_code,
                    return_value: Vec::new(),
                    epoch,
                }
            }
        };

        tx.execute(
            "INSERT INTO messages (id, message, exit_code, return_value, epoch)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &id.0 .0[..],
                encode_payload(&signed.message)?,
                receipt.exit_code.value(),
                receipt.return_value,
                to_sql(epoch),
            ],
        )?;
        tx.commit()?;

        debug!(message = %id, epoch, exit_code = %receipt.exit_code, "Message executed");
        Ok(id)
    }

    async fn message_lookup(&self, id: &MessageId) -> ChainResult<Option<MessageLookup>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT message, exit_code, return_value, epoch FROM messages WHERE id = ?1",
                params![&id.0 .0[..]],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((message, exit_code, return_value, epoch)) = row else {
            return Ok(None);
        };
        let message: Message = decode_payload(&message)?;
        Ok(Some(MessageLookup {
            id: *id,
            message,
            receipt: MessageReceipt {
                exit_code: ExitCode(exit_code),
                return_value,
                epoch: epoch as u64,
            },
        }))
    }

    async fn account(&self, address: &Address) -> ChainResult<AccountState> {
        let conn = self.lock()?;
        load_account(&conn, address)
    }

    async fn channel_state(&self, address: &Address) -> ChainResult<Option<ChannelActorState>> {
        let conn = self.lock()?;
        load_actor(&conn, address)
    }

    async fn epoch(&self) -> ChainResult<Epoch> {
        let conn = self.lock()?;
        get_epoch(&conn)
    }
}

#[async_trait]
impl Faucet for LocalChain {
    async fn fund(&self, address: &Address, amount: Amount) -> ChainResult<Amount> {
        if !address.is_account() {
            return Err(ChainError::rejected(format!(
                "{} is not an account address",
                address
            )));
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let account = load_account(&tx, address)?;
        let balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| ChainError::rejected("balance overflow"))?;
        store_account(
            &tx,
            address,
            &AccountState {
                balance,
                nonce: account.nonce,
            },
        )?;
        tx.commit()?;
        info!(address = %address, amount, balance, "Faucet funded account");
        Ok(balance)
    }
}

fn not_found(channel: &Address) -> ActorError {
    ActorError::not_found(format!("channel {} not found", channel))
}

fn initialize_schema(conn: &Connection) -> ChainResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         CREATE TABLE IF NOT EXISTS chain_meta (
             key TEXT PRIMARY KEY,
             value INTEGER NOT NULL
         );
         CREATE TABLE IF NOT EXISTS accounts (
             address BLOB PRIMARY KEY,
             balance INTEGER NOT NULL,
             nonce INTEGER NOT NULL
         );
         CREATE TABLE IF NOT EXISTS actors (
             address BLOB PRIMARY KEY,
             state BLOB NOT NULL
         );
         CREATE TABLE IF NOT EXISTS messages (
             id BLOB PRIMARY KEY,
             message BLOB NOT NULL,
             exit_code INTEGER NOT NULL,
             return_value BLOB NOT NULL,
             epoch INTEGER NOT NULL
         );
         INSERT OR IGNORE INTO chain_meta (key, value) VALUES ('epoch', 0);",
    )?;
    Ok(())
}

// u64 values are stored as their i64 bit pattern.
fn to_sql(value: u64) -> i64 {
    value as i64
}

fn get_epoch(conn: &Connection) -> ChainResult<Epoch> {
    let value: i64 = conn.query_row(
        "SELECT value FROM chain_meta WHERE key = 'epoch'",
        [],
        |row| row.get(0),
    )?;
    Ok(value as u64)
}

fn set_epoch(conn: &Connection, epoch: Epoch) -> ChainResult<()> {
    conn.execute(
        "UPDATE chain_meta SET value = ?1 WHERE key = 'epoch'",
        params![to_sql(epoch)],
    )?;
    Ok(())
}

fn load_account(conn: &Connection, address: &Address) -> ChainResult<AccountState> {
    let row = conn
        .query_row(
            "SELECT balance, nonce FROM accounts WHERE address = ?1",
            params![&address.to_bytes()[..]],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )
        .optional()?;
    Ok(row
        .map(|(balance, nonce)| AccountState {
            balance: balance as u64,
            nonce: nonce as u64,
        })
        .unwrap_or_default())
}

fn store_account(conn: &Connection, address: &Address, account: &AccountState) -> ChainResult<()> {
    conn.execute(
        "INSERT INTO accounts (address, balance, nonce) VALUES (?1, ?2, ?3)
         ON CONFLICT(address) DO UPDATE SET balance = excluded.balance, nonce = excluded.nonce",
        params![
            &address.to_bytes()[..],
            to_sql(account.balance),
            to_sql(account.nonce)
        ],
    )?;
    Ok(())
}

fn credit(conn: &Connection, address: &Address, amount: Amount) -> ChainResult<()> {
    if amount == 0 {
        return Ok(());
    }
    let account = load_account(conn, address)?;
    store_account(
        conn,
        address,
        &AccountState {
            balance: account.balance.saturating_add(amount),
            nonce: account.nonce,
        },
    )
}

fn load_actor(conn: &Connection, address: &Address) -> ChainResult<Option<ChannelActorState>> {
    let bytes: Option<Vec<u8>> = conn
        .query_row(
            "SELECT state FROM actors WHERE address = ?1",
            params![&address.to_bytes()[..]],
            |row| row.get(0),
        )
        .optional()?;
    match bytes {
        Some(bytes) => Ok(Some(decode_payload(&bytes)?)),
        None => Ok(None),
    }
}

fn store_actor(conn: &Connection, address: &Address, state: &ChannelActorState) -> ChainResult<()> {
    conn.execute(
        "INSERT INTO actors (address, state) VALUES (?1, ?2)
         ON CONFLICT(address) DO UPDATE SET state = excluded.state",
        params![&address.to_bytes()[..], encode_payload(state)?],
    )?;
    Ok(())
}
