//! Local storage for paych.
//!
//! - **Channel registry** (SQLite): channels this wallet created or was paid on
//! - **Voucher store** (SQLite): signed vouchers keyed by `(channel, lane, nonce)`
//! - **Keystore** (filesystem): encrypted account keys
//!
//! # Storage Layout
//!
//! ```text
//! ~/.paych/
//! ├── config.toml              # CLI configuration
//! ├── keystore/
//! │   └── pay1<base58>.key     # Ed25519 private key (encrypted)
//! ├── paych.db                 # SQLite: channels, vouchers
//! └── chain.db                 # SQLite: local devnet (paych-chain)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use paych_store::{ChannelStore, PaychState, PaychStateConfig};
//!
//! let config = PaychStateConfig::new("/tmp/paych");
//! let state = PaychState::open(config).expect("Failed to open state");
//! for channel in state.channels.list().expect("Failed to list") {
//!     println!("{}", channel.address);
//! }
//! ```

mod columns;
pub mod channel;
pub mod error;
pub mod keystore;
pub mod schema;
pub mod traits;
pub mod types;
pub mod voucher;

pub use channel::SqliteChannelStore;
pub use error::{Result, StoreError};
pub use keystore::KeyStore;
pub use traits::{ChannelStore, VoucherStore};
pub use types::StoredVoucher;
pub use voucher::SqliteVoucherStore;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PAYCH_DATA_DIR";

/// Get the default data directory.
///
/// Priority:
/// 1. `PAYCH_DATA_DIR` environment variable (if set)
/// 2. Platform-specific data directory (e.g. `~/.local/share/paych` on Linux)
/// 3. Fallback to `$HOME/.paych`
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("io", "paych", "paych")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".paych")
        })
}

/// Configuration for [`PaychState`].
#[derive(Debug, Clone)]
pub struct PaychStateConfig {
    /// Base directory for all local data.
    pub base_dir: PathBuf,
    /// Keystore directory (default: base_dir/keystore).
    pub keystore_dir: Option<PathBuf>,
    /// Database file path (default: base_dir/paych.db).
    pub database_path: Option<PathBuf>,
}

impl PaychStateConfig {
    /// Create a new configuration with the given base directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            keystore_dir: None,
            database_path: None,
        }
    }

    /// Set the keystore directory.
    pub fn with_keystore_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.keystore_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the database path.
    pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Get the keystore directory.
    pub fn keystore_dir(&self) -> PathBuf {
        self.keystore_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("keystore"))
    }

    /// Get the database path.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join("paych.db"))
    }
}

/// Channel registry and voucher store sharing one SQLite connection.
pub struct PaychState {
    /// Channel registry (SQLite).
    pub channels: SqliteChannelStore,
    /// Voucher store (SQLite).
    pub vouchers: SqliteVoucherStore,
    /// Configuration used to open this state.
    config: PaychStateConfig,
}

impl PaychState {
    /// Open local state, creating directories and the schema as needed.
    pub fn open(config: PaychStateConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.base_dir)?;

        let db_path = config.database_path();
        tracing::info!(db_path = %db_path.display(), "Opening paych database");
        let conn = Connection::open(&db_path)?;
        schema::initialize_schema(&conn)?;

        let conn = Arc::new(Mutex::new(conn));

        Ok(Self {
            channels: SqliteChannelStore::new(Arc::clone(&conn)),
            vouchers: SqliteVoucherStore::new(conn),
            config,
        })
    }

    /// Open the keystore configured for this state.
    pub fn open_keystore(&self) -> Result<KeyStore> {
        KeyStore::new(self.config.keystore_dir())
    }

    /// The configuration used to open this state.
    pub fn config(&self) -> &PaychStateConfig {
        &self.config
    }
}
