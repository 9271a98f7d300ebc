use httpmock::prelude::*;
use sample_app::domain::model::PaymentStatus;
use sample_app::services::{AuthService, EmailService, NewUser, PaymentService};
use sample_app::{AppConfig, AppError, HttpGateway, LocalStorage, OutboxTransport};
use tempfile::TempDir;

const VALID_CARD: &str = "4532015112830366";

fn dev_config() -> AppConfig {
    AppConfig {
        debug: true,
        ..AppConfig::default()
    }
}

fn unreachable_gateway() -> Box<HttpGateway> {
    Box::new(HttpGateway::new("http://127.0.0.1:9", "").unwrap())
}

// ------------------------------------------------------------------ //
// AuthService
// ------------------------------------------------------------------ //

#[test]
fn test_register_and_login() {
    let mut auth = AuthService::new(&dev_config());
    auth.register(NewUser::new("alice", "alice@example.com", "Password1"))
        .unwrap();
    let token = auth.login("alice", "Password1").unwrap();
    assert!(token.len() > 10);
}

#[test]
fn test_login_wrong_password() {
    let mut auth = AuthService::new(&dev_config());
    auth.register(NewUser::new("bob", "bob@example.com", "Password1"))
        .unwrap();
    let err = auth.login("bob", "wrongpassword").unwrap_err();
    assert!(matches!(err, AppError::AuthenticationError(_)));
}

#[test]
fn test_login_unknown_user() {
    let mut auth = AuthService::new(&dev_config());
    let err = auth.login("nobody", "Password1").unwrap_err();
    assert_eq!(
        err.user_friendly_message(),
        "Invalid username or password."
    );
}

#[test]
fn test_get_user_from_valid_token() {
    let mut auth = AuthService::new(&dev_config());
    auth.register(NewUser::new("carol", "carol@example.com", "Password1"))
        .unwrap();
    let token = auth.login("carol", "Password1").unwrap();
    let user = auth.get_user_from_token(&token).unwrap();
    assert_eq!(user.username, "carol");
}

#[test]
fn test_get_user_from_invalid_token() {
    let mut auth = AuthService::new(&dev_config());
    assert!(auth.get_user_from_token("fake-token").is_none());
}

#[test]
fn test_logout_invalidates_token() {
    let mut auth = AuthService::new(&dev_config());
    auth.register(NewUser::new("dave", "dave@example.com", "Password1"))
        .unwrap();
    let token = auth.login("dave", "Password1").unwrap();
    auth.logout(&token);
    assert!(auth.get_user_from_token(&token).is_none());

    // unknown tokens are ignored
    auth.logout("never-issued");
}

#[test]
fn test_duplicate_registration_rejected() {
    let mut auth = AuthService::new(&dev_config());
    auth.register(NewUser::new("eve", "eve@example.com", "Password1"))
        .unwrap();
    let err = auth
        .register(NewUser::new("eve", "eve2@example.com", "Password1"))
        .unwrap_err();
    assert!(matches!(err, AppError::ConflictError(_)));
    assert_eq!(auth.user_count(), 1);
}

#[test]
fn test_register_rejects_bad_input() {
    let mut auth = AuthService::new(&dev_config());
    assert!(auth
        .register(NewUser::new("x", "not-an-email", "Password1"))
        .is_err());
    assert!(auth
        .register(NewUser::new("y", "y@example.com", "weak"))
        .is_err());
    assert_eq!(auth.user_count(), 0);
}

#[test]
fn test_deactivated_user_cannot_login() {
    let mut auth = AuthService::new(&dev_config());
    auth.register(NewUser::new("hal", "hal@example.com", "Password1"))
        .unwrap();
    let token = auth.login("hal", "Password1").unwrap();

    auth.deactivate("hal").unwrap();
    assert!(auth.get_user_from_token(&token).is_none());

    let err = auth.login("hal", "Password1").unwrap_err();
    assert_eq!(err.user_friendly_message(), "Account is deactivated.");
    assert!(auth.deactivate("ghost").is_err());
}

// ------------------------------------------------------------------ //
// EmailService
// ------------------------------------------------------------------ //

#[tokio::test]
async fn test_send_welcome_email_in_debug_mode() {
    let temp_dir = TempDir::new().unwrap();
    let mut email = EmailService::new(
        &dev_config(),
        OutboxTransport::new(LocalStorage::new(temp_dir.path())),
    );

    assert!(email.send_welcome_email("test@example.com", "frank", "Frank").await);
    assert_eq!(email.sent_count(), 1);
    // debug mode never touches the outbox
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_send_order_confirmation_to_outbox() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        debug: false,
        email_username: "shop@example.com".to_string(),
        ..AppConfig::default()
    };
    let mut email = EmailService::new(
        &config,
        OutboxTransport::new(LocalStorage::new(temp_dir.path())),
    );

    assert!(
        email
            .send_order_confirmation("test@example.com", "Gina", "ORD-001", 149.99)
            .await
    );
    assert_eq!(email.sent_count(), 1);

    let entry = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let content = std::fs::read_to_string(entry.path()).unwrap();
    assert!(content.contains("From: shop@example.com"));
    assert!(content.contains("Subject: Order Confirmation - ORD-001"));
    assert!(content.contains("$149.99"));
}

#[tokio::test]
async fn test_order_id_cannot_add_headers_to_outbox_mail() {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        debug: false,
        ..AppConfig::default()
    };
    let mut email = EmailService::new(
        &config,
        OutboxTransport::new(LocalStorage::new(temp_dir.path())),
    );

    assert!(
        email
            .send_order_confirmation("test@example.com", "Gina", "ORD-1\r\nBcc: x@evil.test", 5.0)
            .await
    );

    let entry = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let content = std::fs::read_to_string(entry.path()).unwrap();
    let (headers, _body) = content.split_once("\r\n\r\n").unwrap();
    assert!(!headers.lines().any(|line| line.starts_with("Bcc:")));
    assert!(headers.contains("Subject: Order Confirmation - ORD-1Bcc: x@evil.test"));
}

// ------------------------------------------------------------------ //
// PaymentService
// ------------------------------------------------------------------ //

#[tokio::test]
async fn test_successful_charge() {
    let mut payment = PaymentService::new(&dev_config(), unreachable_gateway());
    let tx = payment.charge(50.0, VALID_CARD, "USD").await.unwrap();
    assert_eq!(tx.status, PaymentStatus::Success);
    assert_eq!(tx.amount, 50.0);
    assert_eq!(tx.card, "****-****-****-0366");
    assert_eq!(tx.formatted_amount, "$50.00");
}

#[tokio::test]
async fn test_charge_invalid_amount() {
    let mut payment = PaymentService::new(&dev_config(), unreachable_gateway());
    assert!(payment.charge(-10.0, VALID_CARD, "USD").await.is_err());
    assert!(payment.charge(0.0, VALID_CARD, "USD").await.is_err());
    assert!(payment.charge(f64::NAN, VALID_CARD, "USD").await.is_err());
}

#[tokio::test]
async fn test_charge_invalid_card() {
    let mut payment = PaymentService::new(&dev_config(), unreachable_gateway());
    let err = payment
        .charge(10.0, "1234567890123456", "USD")
        .await
        .unwrap_err();
    assert_eq!(err.user_friendly_message(), "Invalid card number.");
}

#[tokio::test]
async fn test_refund_success() {
    let mut payment = PaymentService::new(&dev_config(), unreachable_gateway());
    let tx = payment.charge(75.0, VALID_CARD, "USD").await.unwrap();
    let refunded = payment.refund(&tx.transaction_id).unwrap().unwrap();
    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert!(refunded.refunded_at.is_some());

    // already refunded
    assert!(payment.refund(&tx.transaction_id).is_err());
}

#[tokio::test]
async fn test_refund_unknown_transaction() {
    let mut payment = PaymentService::new(&dev_config(), unreachable_gateway());
    assert!(payment.refund("nonexistent-id").unwrap().is_none());
}

#[tokio::test]
async fn test_get_transaction() {
    let mut payment = PaymentService::new(&dev_config(), unreachable_gateway());
    let tx = payment.charge(20.0, VALID_CARD, "EUR").await.unwrap();
    let fetched = payment.get_transaction(&tx.transaction_id).unwrap();
    assert_eq!(fetched.amount, 20.0);
    assert_eq!(fetched.formatted_amount, "€20.00");
    assert!(payment.get_transaction("missing").is_none());
}

#[tokio::test]
async fn test_live_charge_uses_gateway_status() {
    let server = MockServer::start();
    let gateway_mock = server.mock(|when, then| {
        when.method(POST).path("/charges");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"status": "failed"}));
    });

    let config = AppConfig {
        debug: false,
        payment_gateway_url: server.base_url(),
        ..AppConfig::default()
    };
    let gateway = HttpGateway::from_config(&config).unwrap();
    let mut payment = PaymentService::new(&config, Box::new(gateway));

    let tx = payment.charge(30.0, VALID_CARD, "USD").await.unwrap();
    gateway_mock.assert();
    assert_eq!(tx.status, PaymentStatus::Failed);

    let err = payment.refund(&tx.transaction_id).unwrap_err();
    assert_eq!(
        err.user_friendly_message(),
        "Only successful transactions can be refunded."
    );
}

#[tokio::test]
async fn test_live_charge_gateway_down_records_nothing() {
    let server = MockServer::start();
    let gateway_mock = server.mock(|when, then| {
        when.method(POST).path("/charges");
        then.status(502);
    });

    let config = AppConfig {
        debug: false,
        payment_gateway_url: server.base_url(),
        ..AppConfig::default()
    };
    let mut payment =
        PaymentService::new(&config, Box::new(HttpGateway::from_config(&config).unwrap()));

    let err = payment.charge(30.0, VALID_CARD, "USD").await.unwrap_err();
    gateway_mock.assert();
    assert!(matches!(err, AppError::PaymentError { .. }));
    assert_eq!(payment.transactions().count(), 0);
}
