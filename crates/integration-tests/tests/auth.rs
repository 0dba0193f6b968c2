//! Login, registration and session lifecycle against the mock backend.
//!
//! Run with: cargo test -p fruity-integration-tests --test auth

#![allow(clippy::unwrap_used)]

use fruity_integration_tests::{EMAIL, MockBackend, PASSWORD};
use fruity_storefront::services::auth::AuthError;
use reqwest::StatusCode;
use secrecy::SecretString;

#[tokio::test]
async fn test_login_sets_token_and_user() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    assert!(!storefront.auth().is_logged_in());

    let user = storefront
        .auth()
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.email, EMAIL);
    assert!(storefront.auth().is_logged_in());
    assert!(storefront.api().has_token());
    assert_eq!(storefront.current_user().unwrap().unwrap().name, "Nguyễn Thị Lan");
}

#[tokio::test]
async fn test_wrong_password_is_rejected_with_backend_message() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();

    let result = storefront
        .auth()
        .login(EMAIL, &SecretString::from("sai-mat-khau"))
        .await;

    let Err(AuthError::Rejected(message)) = result else {
        panic!("expected rejection");
    };
    assert_eq!(message, "Email hoặc mật khẩu không đúng");
    assert!(!storefront.auth().is_logged_in());
}

#[tokio::test]
async fn test_invalid_email_never_reaches_backend() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();

    let result = storefront
        .auth()
        .login("khong-phai-email", &SecretString::from(PASSWORD))
        .await;

    assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
}

#[tokio::test]
async fn test_register() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    let auth = storefront.auth();

    let message = auth
        .register("Trần Minh", "minh@example.com", &SecretString::from("matkhau456"))
        .await
        .unwrap();
    assert_eq!(message, "Đăng ký thành công! Vui lòng đăng nhập.");

    let taken = auth
        .register("Lan", EMAIL, &SecretString::from("matkhau456"))
        .await;
    assert!(matches!(taken, Err(AuthError::Rejected(_))));

    let blank = auth
        .register("  ", "minh@example.com", &SecretString::from("matkhau456"))
        .await;
    assert!(matches!(blank, Err(AuthError::MissingName)));
}

#[tokio::test]
async fn test_password_reset() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    let auth = storefront.auth();

    assert!(auth.forgot_password(EMAIL).await.is_ok());

    let bad = auth
        .reset_password(&SecretString::from("het-han"), &SecretString::from("matkhau789"))
        .await;
    assert!(matches!(bad, Err(AuthError::Rejected(_))));

    assert!(
        auth.reset_password(
            &SecretString::from("valid-reset-token"),
            &SecretString::from("matkhau789"),
        )
        .await
        .is_ok()
    );
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.logged_in().await;

    storefront.logout().await.unwrap();

    assert!(!storefront.auth().is_logged_in());
    assert!(!storefront.api().has_token());
    assert!(storefront.current_user().unwrap().is_none());
}

#[tokio::test]
async fn test_backend_requires_bearer_token() {
    let backend = MockBackend::spawn().await;

    let response = reqwest::get(format!("{}/api/v1/cart", backend.base_url()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
