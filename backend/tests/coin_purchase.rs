mod common;

use backend::{axum_http::error_responses::ApiError, usecases::payment_webhook::WebhookError};
use chrono::{Duration, Utc};
use common::{InMemoryCoinStore, charge_complete, charge_complete_at, checkout, sign, wallet, webhooks};
use crates::domain::value_objects::{
    checkout::CreateCheckoutRequest, enums::user_roles::UserRole,
};
use uuid::Uuid;

fn promptpay(coin_pack_id: Uuid) -> CreateCheckoutRequest {
    CreateCheckoutRequest {
        coin_pack_id,
        payment_method: "promptpay".to_string(),
        return_uri: None,
        token: None,
        phone_number: None,
    }
}

#[tokio::test]
async fn checkout_then_successful_webhook_credits_the_pack() {
    let store = InMemoryCoinStore::new();
    let user_id = store.add_user(UserRole::Reader, 0);
    let starter = store.add_pack("Starter", 2900, 30, 0);

    let artifact = checkout(&store)
        .create_checkout(user_id, promptpay(starter))
        .await
        .unwrap();
    assert_eq!(artifact.coins_granted, 30);
    assert!(artifact.qr_code_url.is_some());

    let pending = store.transaction(&artifact.charge_id).unwrap();
    assert_eq!(pending.status, "PENDING");
    assert_eq!(pending.coins_granted, 30);
    assert_eq!(pending.paid_amount, 2900);
    assert_eq!(store.balance_of(user_id), 0);

    let body = charge_complete(&artifact.charge_id, "successful");
    let ack = webhooks(&store)
        .handle_gateway_event(&body, Some(&sign(&body)))
        .await
        .unwrap();
    assert!(ack.received);
    assert!(!ack.duplicate);

    assert_eq!(store.balance_of(user_id), 30);
    let completed = store.transaction(&artifact.charge_id).unwrap();
    assert_eq!(completed.status, "COMPLETED");
    assert!(completed.completed_at.is_some());

    let balance = wallet(&store).get_balance(user_id).await.unwrap();
    assert_eq!(balance.balance, 30);
    assert_eq!(balance.total_purchased, 30);
}

#[tokio::test]
async fn repeated_deliveries_credit_exactly_once() {
    let store = InMemoryCoinStore::new();
    let user_id = store.add_user(UserRole::Reader, 0);
    let reader_pack = store.add_pack("Reader", 9900, 100, 10);

    let artifact = checkout(&store)
        .create_checkout(user_id, promptpay(reader_pack))
        .await
        .unwrap();

    let body = charge_complete(&artifact.charge_id, "successful");
    let signature = sign(&body);
    let reconciler = webhooks(&store);

    let mut duplicates = 0;
    for _ in 0..5 {
        let ack = reconciler
            .handle_gateway_event(&body, Some(&signature))
            .await
            .unwrap();
        if ack.duplicate {
            duplicates += 1;
        }
    }

    assert_eq!(duplicates, 4);
    assert_eq!(store.balance_of(user_id), 110);
    assert_eq!(store.ledger_entries(user_id).len(), 1);
    assert_eq!(store.ledger_sum(user_id), 110);
}

#[tokio::test]
async fn concurrent_deliveries_credit_exactly_once() {
    let store = InMemoryCoinStore::new();
    let user_id = store.add_user(UserRole::Reader, 0);
    let starter = store.add_pack("Starter", 2900, 30, 0);

    let artifact = checkout(&store)
        .create_checkout(user_id, promptpay(starter))
        .await
        .unwrap();

    let body = charge_complete(&artifact.charge_id, "successful");
    let signature = sign(&body);
    let reconciler = webhooks(&store);

    let deliveries = (0..8).map(|_| reconciler.handle_gateway_event(&body, Some(&signature)));
    let results = futures::future::join_all(deliveries).await;

    assert!(results.iter().all(|result| result.is_ok()));
    assert_eq!(store.balance_of(user_id), 30);
    assert_eq!(store.ledger_entries(user_id).len(), 1);
}

#[tokio::test]
async fn failed_charge_records_metadata_and_never_moves_again() {
    let store = InMemoryCoinStore::new();
    let user_id = store.add_user(UserRole::Reader, 0);
    let starter = store.add_pack("Starter", 2900, 30, 0);

    let artifact = checkout(&store)
        .create_checkout(user_id, promptpay(starter))
        .await
        .unwrap();
    let reconciler = webhooks(&store);

    let failed = charge_complete(&artifact.charge_id, "failed");
    reconciler
        .handle_gateway_event(&failed, Some(&sign(&failed)))
        .await
        .unwrap();

    let row = store.transaction(&artifact.charge_id).unwrap();
    assert_eq!(row.status, "FAILED");
    assert_eq!(row.failure_code.as_deref(), Some("insufficient_fund"));
    assert_eq!(
        row.failure_message.as_deref(),
        Some("insufficient funds in the account")
    );
    assert_eq!(store.balance_of(user_id), 0);

    let late_success = charge_complete(&artifact.charge_id, "successful");
    let ack = reconciler
        .handle_gateway_event(&late_success, Some(&sign(&late_success)))
        .await
        .unwrap();

    assert!(ack.duplicate);
    assert_eq!(store.transaction(&artifact.charge_id).unwrap().status, "FAILED");
    assert_eq!(store.balance_of(user_id), 0);
}

#[tokio::test]
async fn expired_charge_stays_expired() {
    let store = InMemoryCoinStore::new();
    let user_id = store.add_user(UserRole::Reader, 0);
    let starter = store.add_pack("Starter", 2900, 30, 0);

    let artifact = checkout(&store)
        .create_checkout(user_id, promptpay(starter))
        .await
        .unwrap();
    let reconciler = webhooks(&store);

    for status in ["expired", "successful", "failed"] {
        let body = charge_complete(&artifact.charge_id, status);
        reconciler
            .handle_gateway_event(&body, Some(&sign(&body)))
            .await
            .unwrap();
    }

    let row = store.transaction(&artifact.charge_id).unwrap();
    assert_eq!(row.status, "EXPIRED");
    assert!(row.expired_at.is_some());
    assert_eq!(store.balance_of(user_id), 0);
}

#[tokio::test]
async fn altered_payload_is_rejected_before_any_storage_access() {
    let store = InMemoryCoinStore::new();
    let reconciler = webhooks(&store);

    let body = charge_complete("chrg_test_1", "successful");
    let signature = sign(&body);
    let mut tampered = body.clone();
    let idx = tampered.iter().position(|byte| *byte == b'1').unwrap();
    tampered[idx] = b'2';

    let calls_before = store.calls();
    let err = reconciler
        .handle_gateway_event(&tampered, Some(&signature))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::Rejected(_)));
    assert_eq!(err.error_code(), "INVALID_SIGNATURE");
    assert_eq!(store.calls(), calls_before);
}

#[tokio::test]
async fn stale_and_future_deliveries_are_rejected() {
    let store = InMemoryCoinStore::new();
    let reconciler = webhooks(&store);
    let calls_before = store.calls();

    for created_at in [Utc::now() - Duration::minutes(6), Utc::now() + Duration::minutes(6)] {
        let body = charge_complete_at("chrg_test_1", "successful", created_at);
        let err = reconciler
            .handle_gateway_event(&body, Some(&sign(&body)))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "STALE_EVENT");
    }

    assert_eq!(store.calls(), calls_before);
}

#[tokio::test]
async fn unknown_charge_is_acknowledged_without_side_effects() {
    let store = InMemoryCoinStore::new();
    let user_id = store.add_user(UserRole::Reader, 0);

    let body = charge_complete("chrg_never_created", "successful");
    let ack = webhooks(&store)
        .handle_gateway_event(&body, Some(&sign(&body)))
        .await
        .unwrap();

    assert!(ack.received);
    assert_eq!(ack.status, None);
    assert_eq!(store.balance_of(user_id), 0);
}
