use std::sync::Arc;
use std::time::Duration;

use idproof_flow::{
    ChallengePolicy, FlowConfig, FlowError, FlowStep, IdentityProofFlow, Loading, SessionState,
    WalletProvider,
};
use idproof_nullables::{NullClock, NullWallet, WalletCall, WalletOutcome};
use idproof_types::{NetworkId, WalletAddress};

const T0: u64 = 1_704_164_645;

fn flow_with(wallet: &Arc<NullWallet>, clock: &Arc<NullClock>) -> IdentityProofFlow {
    let provider: Arc<dyn WalletProvider> = wallet.clone();
    IdentityProofFlow::new(Some(provider)).with_clock(clock.clone())
}

fn setup() -> (Arc<NullWallet>, Arc<NullClock>, IdentityProofFlow) {
    let wallet = Arc::new(NullWallet::new());
    let clock = Arc::new(NullClock::new(T0));
    let flow = flow_with(&wallet, &clock);
    (wallet, clock, flow)
}

#[tokio::test]
async fn full_flow_verifies_connected_address() {
    let (wallet, _clock, flow) = setup();
    let mut state = flow.start_session();
    assert_eq!(
        state.challenge().as_str(),
        "I visited this site on 2024-01-02 03:04:05 UTC"
    );

    let accounts = flow.connect(&mut state).await.unwrap();
    assert_eq!(&accounts.address, wallet.address());
    assert_eq!(state.step(), FlowStep::Connected);
    assert_eq!(state.network().map(|n| n.to_string()).as_deref(), Some("mainnet (1)"));

    let sig = flow.sign(&mut state).await.unwrap();
    assert_eq!(state.step(), FlowStep::Signed);
    assert_eq!(state.signature(), Some(sig.as_str()));

    let verification = flow.verify(&mut state).unwrap();
    assert!(verification.is_verified);
    assert_eq!(state.step(), FlowStep::Verified);
    assert_eq!(state.is_verified(), Some(true));
    assert!(state.recovered_address().unwrap().matches(wallet.address()));
    assert_eq!(state.error(), None);

    // The wallet signed exactly the displayed challenge.
    assert_eq!(
        wallet.calls(),
        vec![
            WalletCall::RequestAccounts,
            WalletCall::SignMessage(state.challenge().as_str().to_string()),
        ]
    );
}

#[tokio::test]
async fn upper_case_claimed_address_still_verifies() {
    let signer = NullWallet::new().signer_address();
    let upper = WalletAddress::parse(format!("0x{}", signer.as_str()[2..].to_uppercase())).unwrap();
    let wallet = Arc::new(NullWallet::new().claiming(upper.clone()));
    let clock = Arc::new(NullClock::new(T0));
    let flow = flow_with(&wallet, &clock);

    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    let v = flow.verify(&mut state).unwrap();

    assert!(v.is_verified);
    assert_ne!(v.recovered_address.as_str(), upper.as_str());
    assert_eq!(v.recovered_address.to_lowercase(), upper.to_lowercase());
}

#[tokio::test]
async fn signature_over_other_message_is_not_verified() {
    let (wallet, _clock, flow) = setup();
    let foreign = idproof_crypto::sign_message(
        b"I visited this site on some other day",
        &idproof_types::PrivateKey([7u8; 32]),
    )
    .unwrap()
    .to_hex();
    wallet.script(WalletOutcome::Approve);
    wallet.script(WalletOutcome::Signature(foreign));

    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    let v = flow.verify(&mut state).unwrap();

    assert!(!v.is_verified);
    assert_eq!(state.step(), FlowStep::Verified);
    assert_eq!(state.is_verified(), Some(false));
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn different_claimed_address_is_not_verified() {
    let other = WalletAddress::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
    let wallet = Arc::new(NullWallet::new().claiming(other));
    let clock = Arc::new(NullClock::new(T0));
    let flow = flow_with(&wallet, &clock);

    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    let v = flow.verify(&mut state).unwrap();
    assert!(!v.is_verified);
    assert!(v.recovered_address.matches(&wallet.signer_address()));
}

#[tokio::test]
async fn sign_before_connect_makes_no_call() {
    let (wallet, _clock, flow) = setup();
    let mut state = flow.start_session();
    let err = flow.sign(&mut state).await.unwrap_err();
    assert_eq!(err, FlowError::NotConnected);
    assert!(wallet.calls().is_empty());
    assert!(state.is_idle());
}

#[tokio::test]
async fn rejected_connect_stays_idle_with_message() {
    let (wallet, _clock, flow) = setup();
    wallet.script(WalletOutcome::Reject("User rejected the request.".into()));

    let mut state = flow.start_session();
    let err = flow.connect(&mut state).await.unwrap_err();
    assert_eq!(err, FlowError::UserRejected("User rejected the request.".into()));
    assert_eq!(state.step(), FlowStep::Idle);
    assert_eq!(state.address(), None);
    assert_eq!(state.error(), Some("User rejected the request."));
    assert!(state.loading().is_idle());

    // Retrying is up to the user and clears the overlay on success.
    flow.connect(&mut state).await.unwrap();
    assert_eq!(state.step(), FlowStep::Connected);
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn empty_provider_message_uses_fallback() {
    let (wallet, _clock, flow) = setup();
    wallet.script(WalletOutcome::Fail(String::new()));
    let mut state = flow.start_session();
    let err = flow.connect(&mut state).await.unwrap_err();
    assert_eq!(err, FlowError::ProviderError("Failed to connect wallet".into()));
    assert_eq!(state.error(), Some("Failed to connect wallet"));
}

#[tokio::test]
async fn vanished_provider_reports_unavailable() {
    let (wallet, _clock, flow) = setup();
    wallet.script(WalletOutcome::Unavailable);
    let mut state = flow.start_session();
    assert_eq!(
        flow.connect(&mut state).await.unwrap_err(),
        FlowError::ProviderUnavailable
    );
}

#[tokio::test]
async fn no_provider_installed() {
    let flow = IdentityProofFlow::new(None);
    let mut state = flow.start_session();
    assert_eq!(
        flow.connect(&mut state).await.unwrap_err(),
        FlowError::ProviderUnavailable
    );
    assert_eq!(
        state.error(),
        Some("No wallet provider found. Please install a wallet.")
    );
    assert!(flow.provider_name().is_none());
}

#[tokio::test]
async fn failed_sign_leaves_state_unchanged() {
    let (wallet, _clock, flow) = setup();
    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    let before = state.clone();

    wallet.script(WalletOutcome::Reject("User denied message signature.".into()));
    let err = flow.sign(&mut state).await.unwrap_err();
    assert_eq!(err, FlowError::SignRejected("User denied message signature.".into()));
    assert_eq!(state.step(), FlowStep::Connected);
    assert_eq!(state.signature(), None);
    assert_eq!(state.error(), Some("User denied message signature."));

    wallet.script(WalletOutcome::Fail("device disconnected".into()));
    let err = flow.sign(&mut state).await.unwrap_err();
    assert_eq!(err, FlowError::SignerError("device disconnected".into()));
    // The newer failure replaces the older message.
    assert_eq!(state.error(), Some("device disconnected"));

    flow.sign(&mut state).await.unwrap();
    assert_eq!(state.error(), None);
    assert_eq!(state.address(), before.address());
}

#[tokio::test]
async fn resign_clears_previous_verification() {
    let (_wallet, _clock, flow) = setup();
    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    flow.verify(&mut state).unwrap();
    assert_eq!(state.is_verified(), Some(true));

    flow.sign(&mut state).await.unwrap();
    assert_eq!(state.step(), FlowStep::Signed);
    assert_eq!(state.is_verified(), None);
    assert_eq!(state.recovered_address(), None);
}

#[tokio::test]
async fn reset_from_every_state_is_idle() {
    let (wallet, clock, flow) = setup();
    let fresh = flow.start_session();
    clock.advance(3600);

    let assert_reset = |state: &mut SessionState| {
        flow.reset(state);
        assert!(state.is_idle());
        assert_eq!(*state, fresh);
    };

    let mut state = fresh.clone();
    assert_reset(&mut state);

    flow.connect(&mut state).await.unwrap();
    assert_reset(&mut state);

    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    assert_reset(&mut state);

    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    flow.verify(&mut state).unwrap();
    assert_reset(&mut state);

    wallet.script(WalletOutcome::Reject("no".into()));
    let _ = flow.connect(&mut state).await;
    assert!(state.error().is_some());
    assert_reset(&mut state);
}

#[tokio::test]
async fn reset_keeps_challenge_by_default() {
    let (_wallet, clock, flow) = setup();
    let mut state = flow.start_session();
    let original = state.challenge().clone();
    clock.advance(60);
    flow.reset(&mut state);
    assert_eq!(state.challenge(), &original);
}

#[tokio::test]
async fn reset_can_regenerate_challenge() {
    let wallet = Arc::new(NullWallet::new());
    let clock = Arc::new(NullClock::new(T0));
    let flow = flow_with(&wallet, &clock).with_config(FlowConfig {
        challenge_policy: ChallengePolicy::RegenerateOnReset,
        ..FlowConfig::default()
    });

    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    flow.sign(&mut state).await.unwrap();
    let old_signature = state.signature().unwrap().to_string();
    let old_challenge = state.challenge().clone();

    clock.advance(60);
    flow.reset(&mut state);
    assert!(state.is_idle());
    assert_ne!(state.challenge(), &old_challenge);
    assert_eq!(
        state.challenge().as_str(),
        "I visited this site on 2024-01-02 03:05:05 UTC"
    );

    // A signature over the old challenge does not verify against the new one.
    let v = idproof_flow::verify(state.challenge().as_str(), &old_signature, wallet.address())
        .unwrap();
    assert!(!v.is_verified);
}

#[tokio::test]
async fn custom_prefix_is_used() {
    let wallet = Arc::new(NullWallet::new());
    let clock = Arc::new(NullClock::new(0));
    let flow = flow_with(&wallet, &clock).with_config(FlowConfig {
        challenge_prefix: "Proving key control at".into(),
        ..FlowConfig::default()
    });
    let state = flow.start_session();
    assert_eq!(
        state.challenge().as_str(),
        "Proving key control at 1970-01-01 00:00:00 UTC"
    );
}

#[tokio::test]
async fn abandoned_call_blocks_until_reset() {
    let (wallet, _clock, flow) = setup();
    wallet.script(WalletOutcome::Pending);

    let mut state = flow.start_session();
    let timed_out = tokio::time::timeout(Duration::from_millis(20), flow.connect(&mut state)).await;
    assert!(timed_out.is_err());
    assert_eq!(state.loading(), Loading::Connecting);

    // While the guard is up no step runs and no call is issued.
    let calls_before = wallet.calls().len();
    assert_eq!(
        flow.connect(&mut state).await.unwrap_err(),
        FlowError::Busy(Loading::Connecting)
    );
    assert_eq!(wallet.calls().len(), calls_before);

    flow.reset(&mut state);
    assert!(state.loading().is_idle());
    flow.connect(&mut state).await.unwrap();
    assert_eq!(state.step(), FlowStep::Connected);
}

#[tokio::test]
async fn network_is_reported() {
    let wallet = Arc::new(NullWallet::new().on_network(NetworkId::new("sepolia", 11155111)));
    let clock = Arc::new(NullClock::new(T0));
    let flow = flow_with(&wallet, &clock);
    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    assert_eq!(state.network(), Some(&NetworkId::new("sepolia", 11155111)));
    assert_eq!(flow.provider_name(), Some("null-wallet"));
}

#[tokio::test]
async fn session_serializes_for_reports() {
    let (_wallet, _clock, flow) = setup();
    let mut state = flow.start_session();
    flow.connect(&mut state).await.unwrap();
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["step"], "connected");
    assert_eq!(json["loading"], "idle");
    assert!(json["is_verified"].is_null());
}
