//! Channel lifecycle and voucher submission against the local devnet.

use std::sync::Arc;

use paych_chain::{Chain, ChainError, WaitConfig};
use paych_ops::OpsError;
use paych_test_utils::{
    create_test_manager, create_test_manager_with_chain, funded_wallet, test_address,
    test_chain, ChannelFixture, MockChain, TEST_SETTLE_DELAY,
};
use paych_types::{ChannelStatus, ExitCode};

fn exit_code(err: &OpsError) -> Option<ExitCode> {
    match err {
        OpsError::ExecutionFailed { exit_code } => Some(*exit_code),
        _ => None,
    }
}

#[tokio::test]
async fn test_create_channel_moves_funds() {
    let f = ChannelFixture::new(1_000, 400).await;

    assert_eq!(f.payer.balance(&f.from).await.unwrap(), 600);
    assert_eq!(f.payer.list_channels().unwrap(), vec![f.channel]);

    let status = f.payer.channel_status(&f.channel).await.unwrap();
    assert_eq!(status.info.amount, 400);
    assert!(status.info.create_message.is_some());
    assert_eq!(status.status, Some(ChannelStatus::Active));
    let on_chain = status.on_chain.unwrap();
    assert_eq!(on_chain.balance, 400);
    assert_eq!(on_chain.from, f.from);
    assert_eq!(on_chain.to, f.to);
}

#[tokio::test]
async fn test_create_channel_insufficient_balance() {
    let chain = test_chain();
    let (wallet, from) = funded_wallet(&*chain, 100).await;
    let (mut manager, _dir) = create_test_manager(Arc::clone(&chain), wallet);

    let err = manager
        .create_channel(&from, &test_address(), 500)
        .await
        .unwrap_err();
    assert_eq!(exit_code(&err), Some(ExitCode::INSUFFICIENT_FUNDS));
    assert!(manager.list_channels().unwrap().is_empty());
    assert_eq!(manager.balance(&from).await.unwrap(), 100);
}

#[tokio::test]
async fn test_create_channel_unknown_key() {
    let chain = test_chain();
    let (wallet, _) = funded_wallet(&*chain, 100).await;
    let (mut manager, _dir) = create_test_manager(Arc::clone(&chain), wallet);

    let stranger = test_address();
    let err = manager
        .create_channel(&stranger, &test_address(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, OpsError::KeyNotFound(addr) if addr == stranger));
}

#[tokio::test]
async fn test_submit_voucher_marks_submitted() {
    let mut f = ChannelFixture::new(1_000, 500).await;
    let v = f.payer.create_voucher(&f.channel, 200, 0, 0).await.unwrap();
    f.payee.add_voucher(&f.channel, &v).await.unwrap();

    let lookup = f.payee.submit_voucher(&f.channel, &v).await.unwrap();
    assert!(lookup.receipt.exit_code.is_success());
    assert_eq!(lookup.message.from, f.to);

    let stored = f.payee.list_vouchers(&f.channel).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].submitted);
    assert_eq!(stored[0].submit_message, Some(lookup.id));

    let state = f.chain.channel_state(&f.channel).await.unwrap().unwrap();
    assert_eq!(state.to_send, 200);
    assert_eq!(state.lane(0).nonce, 1);
}

#[tokio::test]
async fn test_submit_unknown_voucher_stores_it() {
    let mut f = ChannelFixture::new(1_000, 500).await;
    let v = f.payer.create_voucher(&f.channel, 75, 2, 0).await.unwrap();

    // Never added: the payee learns the channel from the submission.
    f.payee.submit_voucher(&f.channel, &v).await.unwrap();

    assert_eq!(f.payee.list_channels().unwrap(), vec![f.channel]);
    let stored = f.payee.list_vouchers(&f.channel).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].voucher, v);
    assert!(stored[0].submitted);
}

#[tokio::test]
async fn test_submit_stale_voucher_fails_execution() {
    let mut f = ChannelFixture::new(1_000, 500).await;
    let v1 = f.payer.create_voucher(&f.channel, 100, 0, 0).await.unwrap();
    let v2 = f.payer.create_voucher(&f.channel, 200, 0, 0).await.unwrap();
    f.payee.add_voucher(&f.channel, &v1).await.unwrap();
    f.payee.add_voucher(&f.channel, &v2).await.unwrap();

    f.payee.submit_voucher(&f.channel, &v2).await.unwrap();
    let err = f.payee.submit_voucher(&f.channel, &v1).await.unwrap_err();
    assert_eq!(exit_code(&err), Some(ExitCode::ILLEGAL_ARGUMENT));
    assert!(!err.is_transient());

    let stored = f.payee.list_vouchers(&f.channel).unwrap();
    assert!(!stored[0].submitted);
    assert!(stored[1].submitted);
}

#[tokio::test]
async fn test_submit_voucher_wrong_channel() {
    let mut f = ChannelFixture::new(1_000, 500).await;
    let v = f.payer.create_voucher(&f.channel, 10, 0, 0).await.unwrap();
    let other = paych_crypto::actor_address(&f.from, 77);

    let err = f.payee.submit_voucher(&other, &v).await.unwrap_err();
    assert!(matches!(err, OpsError::Validation(_)));
}

#[tokio::test]
async fn test_settle_and_collect() {
    let mut f = ChannelFixture::new(1_000, 500).await;
    let v = f.payer.create_voucher(&f.channel, 300, 0, 0).await.unwrap();
    f.payee.submit_voucher(&f.channel, &v).await.unwrap();

    let settling_at = f.payer.settle(&f.channel).await.unwrap();
    let status = f.payer.channel_status(&f.channel).await.unwrap();
    assert_eq!(status.status, Some(ChannelStatus::Settling { settling_at }));

    // Only an active channel can start settling.
    let err = f.payee.settle(&f.channel).await.unwrap_err();
    assert_eq!(exit_code(&err), Some(ExitCode::ILLEGAL_STATE));

    let err = f.payer.collect(&f.channel).await.unwrap_err();
    assert_eq!(exit_code(&err), Some(ExitCode::ILLEGAL_STATE));

    f.chain.mine(TEST_SETTLE_DELAY).unwrap();
    let err = f.payer.create_voucher(&f.channel, 400, 0, 0).await.unwrap_err();
    assert!(matches!(err, OpsError::ChannelNotActive(_)));

    let payout = f.payer.collect(&f.channel).await.unwrap();
    assert_eq!(payout.to_payee, 300);
    assert_eq!(payout.to_payer, 200);
    assert_eq!(f.payer.balance(&f.to).await.unwrap(), 300);
    assert_eq!(f.payer.balance(&f.from).await.unwrap(), 700);

    let status = f.payee.channel_status(&f.channel).await;
    assert!(status.is_ok());
    assert_eq!(status.unwrap().status, Some(ChannelStatus::Collected));
}

#[tokio::test]
async fn test_settle_requires_party_key() {
    let f = ChannelFixture::new(1_000, 500).await;
    let chain = Arc::clone(&f.chain);
    let (wallet, _) = funded_wallet(&*chain, 0).await;
    let (mut outsider, _dir) = create_test_manager(chain, wallet);

    let err = outsider.settle(&f.channel).await.unwrap_err();
    assert!(matches!(err, OpsError::NotAParty(_)));
}

#[tokio::test]
async fn test_submit_transport_failure() {
    let chain = test_chain();
    let (payer_wallet, from) = funded_wallet(&*chain, 1_000).await;
    let (payee_wallet, to) = funded_wallet(&*chain, 0).await;
    let (mut payer, _payer_dir) = create_test_manager(Arc::clone(&chain), payer_wallet);

    let mock = MockChain::new(chain.clone());
    let (mut payee, _payee_dir) =
        create_test_manager_with_chain(Arc::new(mock.clone()), payee_wallet);

    let channel = payer.create_channel(&from, &to, 500).await.unwrap();
    let v = payer.create_voucher(&channel, 100, 0, 0).await.unwrap();
    payee.add_voucher(&channel, &v).await.unwrap();

    mock.set_unavailable(true);
    let err = payee.submit_voucher(&channel, &v).await.unwrap_err();
    assert!(matches!(err, OpsError::Chain(ChainError::Unavailable(_))));
    assert!(err.is_transient());
    assert_eq!(mock.push_count(), 0);
    assert!(!payee.list_vouchers(&channel).unwrap()[0].submitted);

    // Lookups that fail transiently are retried.
    mock.set_unavailable(false);
    mock.fail_next_lookups(2);
    payee.submit_voucher(&channel, &v).await.unwrap();
    assert_eq!(mock.push_count(), 1);
    assert!(payee.list_vouchers(&channel).unwrap()[0].submitted);
}

#[tokio::test]
async fn test_submit_wait_timeout() {
    let chain = test_chain();
    let (payer_wallet, from) = funded_wallet(&*chain, 1_000).await;
    let (payee_wallet, to) = funded_wallet(&*chain, 0).await;
    let (mut payer, _payer_dir) = create_test_manager(Arc::clone(&chain), payer_wallet);

    let mock = MockChain::new(chain.clone());
    let (mut payee, _payee_dir) =
        create_test_manager_with_chain(Arc::new(mock.clone()), payee_wallet);
    payee.config.wait = WaitConfig::from_millis(50, 1, 5);

    let channel = payer.create_channel(&from, &to, 500).await.unwrap();
    let v = payer.create_voucher(&channel, 100, 0, 0).await.unwrap();
    payee.add_voucher(&channel, &v).await.unwrap();

    mock.set_hide_receipts(true);
    let err = payee.submit_voucher(&channel, &v).await.unwrap_err();
    assert!(matches!(err, OpsError::Chain(ChainError::Timeout(_))));
    assert!(!payee.list_vouchers(&channel).unwrap()[0].submitted);
}

#[tokio::test]
async fn test_fund_requires_faucet() {
    let chain = test_chain();
    let (wallet, from) = funded_wallet(&*chain, 0).await;
    let (manager, _dir) = create_test_manager_with_chain(chain.clone(), wallet);

    let err = manager.fund(&from, 10).await.unwrap_err();
    assert!(matches!(err, OpsError::FaucetUnavailable));
}

#[tokio::test]
async fn test_wallet_new_and_list() {
    let chain = test_chain();
    let (wallet, first) = funded_wallet(&*chain, 0).await;
    let (mut manager, _dir) = create_test_manager(chain, wallet);

    let second = manager.new_address().unwrap();
    let mut listed = manager.wallet_list().unwrap();
    listed.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(listed, expected);

    assert_eq!(manager.fund(&second, 42).await.unwrap(), 42);
    assert_eq!(manager.balance(&second).await.unwrap(), 42);
}
