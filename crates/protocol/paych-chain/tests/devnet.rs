//! Integration tests for the file-backed devnet.

use paych_chain::{
    wait_message, Chain, ChainConfig, ChainError, Faucet, LocalChain, WaitConfig, CHAIN_DB_FILE,
};
use paych_crypto::{account_address, generate_identity, Address};
use paych_types::{ExitCode, Message, Method};
use paych_wire::{decode_payload, sign_message};
use tempfile::TempDir;

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CHAIN_DB_FILE);
    let (key, public_key) = generate_identity();
    let alice = account_address(&public_key);
    let (_, bob_key) = generate_identity();
    let bob = account_address(&bob_key);

    let channel = {
        let chain = LocalChain::open(&path, ChainConfig::default()).unwrap();
        chain.fund(&alice, 500).await.unwrap();

        let message = Message::new(alice, bob, 0, Method::CreateChannel).with_value(200);
        let id = chain
            .push_message(sign_message(message, &key).unwrap())
            .await
            .unwrap();
        let lookup = wait_message(&chain, &id, &WaitConfig::default())
            .await
            .unwrap();
        assert_eq!(lookup.receipt.exit_code, ExitCode::OK);
        decode_payload::<Address>(&lookup.receipt.return_value).unwrap()
    };

    let chain = LocalChain::open(&path, ChainConfig::default()).unwrap();
    assert_eq!(chain.epoch().await.unwrap(), 1);
    let account = chain.account(&alice).await.unwrap();
    assert_eq!((account.balance, account.nonce), (300, 1));
    let state = chain.channel_state(&channel).await.unwrap().unwrap();
    assert_eq!(state.balance, 200);
    assert_eq!(state.to, bob);
}

#[tokio::test]
async fn test_clones_share_state() {
    let chain = LocalChain::in_memory(ChainConfig::default()).unwrap();
    let other = chain.clone();
    let (_, public_key) = generate_identity();
    let address = account_address(&public_key);

    chain.fund(&address, 7).await.unwrap();
    assert_eq!(other.account(&address).await.unwrap().balance, 7);
    other.mine(4).unwrap();
    assert_eq!(chain.epoch().await.unwrap(), 4);
}

#[tokio::test]
async fn test_faucet_rejects_actor_address() {
    let chain = LocalChain::in_memory(ChainConfig::default()).unwrap();
    let (_, public_key) = generate_identity();
    let actor = paych_crypto::actor_address(&account_address(&public_key), 0);
    assert!(matches!(
        chain.fund(&actor, 1).await,
        Err(ChainError::Rejected(_))
    ));
}
