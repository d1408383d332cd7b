//! Helper functions for creating test fixtures.
//!
//! Provides an in-memory devnet, funded wallets and pre-configured
//! `PaychManager`s backed by a temporary data directory.

use std::sync::Arc;

use paych_chain::{Chain, ChainConfig, Faucet, LocalChain, WaitConfig};
use paych_crypto::{account_address, generate_identity, Address, PrivateKey};
use paych_ops::{MemoryWallet, OpsConfig, PaychManager};
use paych_store::{PaychState, PaychStateConfig};
use paych_types::{Amount, SignedVoucher};
use paych_wire::sign_voucher;
use tempfile::TempDir;

/// Settle delay used by [`test_chain`].
pub const TEST_SETTLE_DELAY: u64 = 5;

/// Fresh in-memory devnet.
pub fn test_chain() -> Arc<LocalChain> {
    Arc::new(
        LocalChain::in_memory(ChainConfig {
            settle_delay: TEST_SETTLE_DELAY,
        })
        .expect("in-memory chain"),
    )
}

/// Wait settings short enough for tests.
pub fn test_wait_config() -> WaitConfig {
    WaitConfig::from_millis(2_000, 1, 10)
}

/// A random account address with no key kept.
pub fn test_address() -> Address {
    let (_, public_key) = generate_identity();
    account_address(&public_key)
}

/// Wallet holding one new key whose account is funded with `amount`.
pub async fn funded_wallet<F: Faucet + ?Sized>(
    faucet: &F,
    amount: Amount,
) -> (MemoryWallet, Address) {
    let mut wallet = MemoryWallet::new();
    let (key, _) = generate_identity();
    let address = wallet.insert(key);
    if amount > 0 {
        faucet.fund(&address, amount).await.expect("faucet");
    }
    (wallet, address)
}

/// Manager over `chain` with a temporary data directory.
///
/// The directory is removed when the returned `TempDir` is dropped; keep
/// it alive for the duration of the test.
pub fn create_test_manager(
    chain: Arc<LocalChain>,
    wallet: MemoryWallet,
) -> (PaychManager, TempDir) {
    let (manager, temp_dir) = create_test_manager_with_chain(chain.clone(), wallet);
    (manager.with_faucet(chain), temp_dir)
}

/// Manager over any chain implementation, without a faucet.
pub fn create_test_manager_with_chain(
    chain: Arc<dyn Chain>,
    wallet: MemoryWallet,
) -> (PaychManager, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let state = PaychState::open(PaychStateConfig::new(temp_dir.path())).expect("open state");
    let config = OpsConfig::default().with_wait(test_wait_config());
    let manager = PaychManager::new(state, chain, Box::new(wallet), config);
    (manager, temp_dir)
}

/// Sign a voucher for `channel` with `key`.
pub fn signed_voucher(
    key: &PrivateKey,
    channel: Address,
    lane: u64,
    nonce: u64,
    amount: Amount,
) -> SignedVoucher {
    sign_voucher(SignedVoucher::new(channel, lane, nonce, amount), key).expect("sign voucher")
}

/// Payer and payee managers sharing one chain, with a funded channel
/// between them.
pub struct ChannelFixture {
    /// Shared devnet.
    pub chain: Arc<LocalChain>,
    /// Manager holding the payer key.
    pub payer: PaychManager,
    /// Manager holding the payee key.
    pub payee: PaychManager,
    /// Payer account.
    pub from: Address,
    /// Payee account.
    pub to: Address,
    /// Channel address.
    pub channel: Address,
    _dirs: (TempDir, TempDir),
}

impl ChannelFixture {
    /// Fund the payer with `funds` and open a channel of `amount`.
    pub async fn new(funds: Amount, amount: Amount) -> Self {
        let chain = test_chain();
        let (payer_wallet, from) = funded_wallet(&*chain, funds).await;
        let (payee_wallet, to) = funded_wallet(&*chain, 0).await;

        let (mut payer, payer_dir) = create_test_manager(Arc::clone(&chain), payer_wallet);
        let (payee, payee_dir) = create_test_manager(Arc::clone(&chain), payee_wallet);

        let channel = payer
            .create_channel(&from, &to, amount)
            .await
            .expect("create channel");

        Self {
            chain,
            payer,
            payee,
            from,
            to,
            channel,
            _dirs: (payer_dir, payee_dir),
        }
    }
}
