//! CLI configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use paych_chain::{ChainConfig, WaitConfig, CHAIN_DB_FILE};
use paych_store::default_data_dir;
use paych_types::{
    Epoch, DEFAULT_POLL_BASE_MS, DEFAULT_POLL_MAX_MS, DEFAULT_SETTLE_DELAY,
    DEFAULT_WAIT_TIMEOUT_MS,
};

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

const ENV_VAR_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Expand `${VAR_NAME}` references in a string using `lookup`.
/// Unresolved variables are left as-is.
fn expand_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let Ok(re) = Regex::new(ENV_VAR_PATTERN) else {
        return input.to_string();
    };
    re.replace_all(input, |caps: &regex::Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .to_string()
}

fn expand_path(path: &Path, lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    PathBuf::from(expand_vars(&path.to_string_lossy(), lookup))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Chain configuration.
    pub chain: ChainSection,
    /// Display configuration.
    pub display: DisplayConfig,
}

impl CliConfig {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults. `${VAR}` references in paths are
    /// expanded.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, &env_lookup)
    }

    /// Parse TOML, resolving `${VAR}` references in paths through `lookup`.
    fn parse(contents: &str, lookup: &impl Fn(&str) -> Option<String>) -> CliResult<Self> {
        let mut config: Self = toml::from_str(contents)?;

        config.storage.base_dir = expand_path(&config.storage.base_dir, lookup);
        config.chain.database = config
            .chain
            .database
            .as_deref()
            .map(|path| expand_path(path, lookup));

        Ok(config)
    }

    /// Config rooted at `base_dir`, otherwise default.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            storage: StorageConfig {
                base_dir: base_dir.as_ref().to_path_buf(),
            },
            ..Self::default()
        }
    }

    /// Get the base directory for all paych data.
    pub fn base_dir(&self) -> PathBuf {
        self.storage.base_dir.clone()
    }

    /// Path of the devnet database.
    pub fn chain_database(&self) -> PathBuf {
        self.chain
            .database
            .clone()
            .unwrap_or_else(|| self.base_dir().join(CHAIN_DB_FILE))
    }

    /// Devnet parameters.
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            settle_delay: self.chain.settle_delay,
        }
    }

    /// Message wait parameters.
    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig::from_millis(
            self.chain.wait_timeout_ms,
            self.chain.poll_base_ms,
            self.chain.poll_max_ms,
        )
    }

    /// Output format used when `--format` is not given.
    pub fn default_format(&self) -> CliResult<OutputFormat> {
        self.display
            .default_format
            .parse()
            .map_err(CliError::config)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the database, keystore and devnet.
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_data_dir(),
        }
    }
}

/// Chain configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSection {
    /// Devnet database (default: `<base_dir>/chain.db`).
    pub database: Option<PathBuf>,
    /// Epochs between settle and collect.
    pub settle_delay: Epoch,
    /// Give up waiting for a message after this long.
    pub wait_timeout_ms: u64,
    /// First delay between message polls.
    pub poll_base_ms: u64,
    /// Maximum delay between message polls.
    pub poll_max_ms: u64,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            database: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_base_ms: DEFAULT_POLL_BASE_MS,
            poll_max_ms: DEFAULT_POLL_MAX_MS,
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Default output format.
    pub default_format: String,
    /// Whether to color human output.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_format: "human".to_string(),
            color: true,
        }
    }
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.toml")
}
