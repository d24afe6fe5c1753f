mod common;

use cardito_bridge::domain::payment::PaymentRequest;
use cardito_bridge::error::PaymentError;
use cardito_bridge::infrastructure::in_memory::StaticConfigSource;
use common::*;
use std::sync::Arc;

#[tokio::test]
async fn test_mobile_uses_connector_in_deep_link_mode() {
    let wallet = Arc::new(FakeWallet::new("0xabc", "0x89"));
    let environment = FakeEnvironment::mobile(Arc::clone(&wallet));
    let inits = Arc::clone(&environment.connector_inits);
    let h = harness(environment, StaticConfigSource::new(payment_config()));

    h.session
        .pay(PaymentRequest::new("gems", "1", None, Some(137)))
        .await
        .unwrap();

    let inits = inits.lock().unwrap().clone();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].chains, vec![137]);
    assert_eq!(inits[0].optional_chains, vec![137]);
    assert!(!inits[0].show_qr_modal);
    assert_eq!(wallet.transfers().len(), 1);
}

#[tokio::test]
async fn test_mobile_ignores_injected_wallet_without_connector() {
    let wallet = Arc::new(FakeWallet::new("0xabc", "0x89"));
    let mut environment = FakeEnvironment::desktop(Arc::clone(&wallet));
    environment.user_agent = MOBILE_UA.to_string();
    let h = harness(environment, StaticConfigSource::new(payment_config()));

    let result = h
        .session
        .pay(PaymentRequest::new("gems", "1", None, Some(137)))
        .await;

    assert_eq!(result, Err(PaymentError::NoProviderAvailable));
    assert!(wallet.transfers().is_empty());
    assert_eq!(
        store_errors(&h.host),
        vec!["Payment failed. Please try again.".to_string()]
    );
}

#[tokio::test]
async fn test_desktop_without_injected_wallet_has_no_provider() {
    let wallet = Arc::new(FakeWallet::new("0xabc", "0x89"));
    let mut environment = FakeEnvironment::mobile(Arc::clone(&wallet));
    environment.user_agent = DESKTOP_UA.to_string();
    let inits = Arc::clone(&environment.connector_inits);
    let h = harness(environment, StaticConfigSource::new(payment_config()));

    let result = h
        .session
        .pay(PaymentRequest::new("gems", "1", None, Some(137)))
        .await;

    assert_eq!(result, Err(PaymentError::NoProviderAvailable));
    assert!(inits.lock().unwrap().is_empty());
    // Nothing else is attempted once discovery fails.
    assert_eq!(h.source.fetch_count(), 0);
}
