//! End-to-end protocol tests: ledger, coprocessor, relayer, and client
//! flows wired together the way a deployment runs them.
//!
//! Every test here generates real TFHE keys and is slow. Run with:
//! cargo test --release --test grid_protocol -- --ignored

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use umbra::client::{
    EncryptionSession, IdentityKeypair, InputEncryptor, PositionDecryption, TypedSigner,
    WalletSigner,
};
use umbra::fhe::{Address, Coprocessor};
use umbra::ledger::{GridLedger, LedgerEvent, GRID_MAX, GRID_MIN};
use umbra::relayer::{DecryptionRelayer, HandleContractPair};

struct TestBed {
    ledger: GridLedger,
    relayer: DecryptionRelayer,
    session: EncryptionSession,
    signer: Arc<dyn TypedSigner>,
    identity: Address,
}

fn testbed() -> TestBed {
    let coprocessor = Arc::new(RwLock::new(Coprocessor::new().unwrap()));
    let session = EncryptionSession::connect(&coprocessor.read());
    let ledger = GridLedger::new(Arc::clone(&coprocessor));
    let relayer = DecryptionRelayer::new(coprocessor);

    let signer: Arc<dyn TypedSigner> = Arc::new(WalletSigner::new(IdentityKeypair::generate()));
    let identity = signer.address();

    TestBed {
        ledger,
        relayer,
        session,
        signer,
        identity,
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Decrypt the bed identity's current position through the full
/// authorization protocol.
async fn decrypt_position(bed: &TestBed) -> (u8, u8) {
    let (handle_x, handle_y) = bed.ledger.position(&bed.identity).unwrap();
    PositionDecryption::new()
        .session(bed.session.clone())
        .identity(bed.identity)
        .contract(bed.ledger.address())
        .handles(handle_x, handle_y)
        .signer(Arc::clone(&bed.signer))
        .run(&bed.relayer)
        .await
        .unwrap()
}

fn encryptor(bed: &TestBed) -> InputEncryptor {
    let mut encryptor = InputEncryptor::new();
    encryptor.attach(bed.session.clone());
    encryptor
}

fn submit_move(bed: &mut TestBed, x: u8, y: u8) {
    let input = encryptor(bed)
        .encrypt_pair(bed.ledger.address(), bed.identity, x, y)
        .unwrap();
    bed.ledger.move_to(bed.identity, &input).unwrap();
}

fn clamp(v: u8) -> u8 {
    v.clamp(GRID_MIN, GRID_MAX)
}

#[tokio::test]
#[ignore]
async fn join_spawns_in_bounds_and_owner_can_decrypt() {
    let mut bed = testbed();

    bed.ledger.join(bed.identity).unwrap();
    assert!(bed.ledger.has_joined(&bed.identity));
    assert_eq!(
        bed.ledger.events(),
        &[LedgerEvent::Joined {
            identity: bed.identity
        }]
    );

    let (x, y) = decrypt_position(&bed).await;
    assert!((GRID_MIN..=GRID_MAX).contains(&x));
    assert!((GRID_MIN..=GRID_MAX).contains(&y));
}

#[tokio::test]
#[ignore]
async fn moves_round_trip_exactly_regardless_of_history() {
    let mut bed = testbed();
    bed.ledger.join(bed.identity).unwrap();

    submit_move(&mut bed, 7, 8);
    assert_eq!(decrypt_position(&bed).await, (7, 8));

    // A later move fully replaces the earlier one
    submit_move(&mut bed, 3, 9);
    assert_eq!(decrypt_position(&bed).await, (3, 9));
}

#[tokio::test]
#[ignore]
async fn out_of_range_moves_land_on_the_boundaries() {
    let mut bed = testbed();
    bed.ledger.join(bed.identity).unwrap();

    // One below the grid, one above
    submit_move(&mut bed, 0, 42);
    assert_eq!(decrypt_position(&bed).await, (GRID_MIN, GRID_MAX));
}

#[tokio::test]
#[ignore]
async fn stored_positions_match_clamped_submissions() {
    let mut bed = testbed();
    bed.ledger.join(bed.identity).unwrap();

    for (x, y) in [(0u8, 0u8), (5, 200), (10, 11), (1, 10)] {
        submit_move(&mut bed, x, y);
        assert_eq!(decrypt_position(&bed).await, (clamp(x), clamp(y)));
    }
}

#[tokio::test]
#[ignore]
async fn signature_over_a_different_ephemeral_key_never_yields_plaintext() {
    let mut bed = testbed();
    bed.ledger.join(bed.identity).unwrap();
    let (handle_x, handle_y) = bed.ledger.position(&bed.identity).unwrap();
    let contract = bed.ledger.address();

    // Sign a grant over keypair A, then attempt the request with keypair B
    let keypair_a = bed.session.generate_keypair();
    let keypair_b = bed.session.generate_keypair();

    let valid_from = unix_now();
    let message =
        bed.session
            .authorization_message(&keypair_a.public_key, vec![contract], valid_from);
    let signature = bed.signer.sign_authorization(&message).await.unwrap();

    let pairs = vec![
        HandleContractPair {
            handle: handle_x,
            contract,
        },
        HandleContractPair {
            handle: handle_y,
            contract,
        },
    ];
    let result = bed
        .session
        .user_decrypt(
            &bed.relayer,
            pairs,
            &keypair_b.secret_key,
            &keypair_b.public_key,
            &signature,
            bed.signer.verifying_key(),
            vec![contract],
            bed.identity,
            valid_from,
            message.valid_duration,
        )
        .await;

    assert!(matches!(
        result,
        Err(umbra::client::ClientError::DecryptionFailed(_))
    ));
}

#[tokio::test]
#[ignore]
async fn strangers_cannot_decrypt_someone_elses_position() {
    let mut bed = testbed();
    bed.ledger.join(bed.identity).unwrap();
    let (handle_x, handle_y) = bed.ledger.position(&bed.identity).unwrap();

    // A different identity with a perfectly valid signer and grant, asking
    // for handles it was never granted
    let stranger: Arc<dyn TypedSigner> = Arc::new(WalletSigner::new(IdentityKeypair::generate()));
    let result = PositionDecryption::new()
        .session(bed.session.clone())
        .identity(stranger.address())
        .contract(bed.ledger.address())
        .handles(handle_x, handle_y)
        .signer(stranger)
        .run(&bed.relayer)
        .await;

    assert!(matches!(
        result,
        Err(umbra::client::ClientError::DecryptionFailed(_))
    ));
}
