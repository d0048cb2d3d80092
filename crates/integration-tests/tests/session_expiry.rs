//! Token refresh and forced sign-out on an expired session.

#![allow(clippy::unwrap_used)]

use httpmock::Method::{GET, POST};
use pocketshop_client::session::AuthStatus;
use pocketshop_integration_tests::{TestContext, login_json, user_json};
use secrecy::SecretString;
use serde_json::json;

async fn signed_in(ctx: &TestContext) -> pocketshop_client::Storefront {
    let mut login = ctx
        .server
        .mock_async(|when, then| {
            when.method(POST).path("/user/login");
            then.status(200).json_body(login_json("u7", "stale", "refresh-7"));
        })
        .await;
    let storefront = ctx.launch().await;
    storefront
        .auth()
        .login("+15550123", &SecretString::from("hunter22".to_string()))
        .await
        .unwrap();
    login.delete_async().await;
    storefront
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_persisted() {
    let ctx = TestContext::new().await;
    let storefront = signed_in(&ctx).await;

    let rejected = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/get-one/u7")
                .header("authorization", "Bearer stale");
            then.status(401).json_body(json!({"message": "jwt expired"}));
        })
        .await;
    let refresh = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/refresh/refresh-7")
                .header_missing("authorization");
            then.status(200).json_body(json!({"accessToken": "fresh"}));
        })
        .await;
    let accepted = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/user/get-one/u7")
                .header("authorization", "Bearer fresh");
            then.status(200).json_body(user_json("u7"));
        })
        .await;

    storefront.auth().refresh_user().await.unwrap();

    rejected.assert_calls_async(1).await;
    refresh.assert_calls_async(1).await;
    accepted.assert_calls_async(1).await;
    assert!(storefront.auth().is_authenticated());

    let persisted = ctx.persisted_session().unwrap();
    assert_eq!(persisted["tokens"]["accessToken"], json!("fresh"));
    assert_eq!(persisted["tokens"]["refreshToken"], json!("refresh-7"));
}

#[tokio::test]
async fn test_rejected_refresh_forces_sign_out() {
    let ctx = TestContext::new().await;
    let storefront = signed_in(&ctx).await;
    let status = storefront.auth().subscribe();

    ctx.server
        .mock_async(|when, then| {
            when.method(GET).path("/user/get-one/u7");
            then.status(401).json_body(json!({"message": "jwt expired"}));
        })
        .await;
    let refresh = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/user/refresh/refresh-7");
            then.status(401).json_body(json!({"message": "refresh token revoked"}));
        })
        .await;

    let err = storefront.auth().refresh_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    refresh.assert_calls_async(1).await;

    assert!(status.has_changed().unwrap());
    assert_eq!(storefront.auth().snapshot().status(), AuthStatus::Anonymous);
    assert_eq!(ctx.persisted_session().unwrap()["isAuthenticated"], json!(false));
    assert!(!ctx.launch().await.auth().is_authenticated());
}

#[tokio::test]
async fn test_concurrent_expired_requests_refresh_once() {
    let ctx = TestContext::new().await;
    let storefront = signed_in(&ctx).await;

    ctx.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/product/popular")
                .header("authorization", "Bearer stale");
            then.status(401);
        })
        .await;
    ctx.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/category/get-all")
                .header("authorization", "Bearer stale");
            then.status(401);
        })
        .await;
    let refresh = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/user/refresh/refresh-7");
            then.status(200)
                .delay(std::time::Duration::from_millis(50))
                .json_body(json!({"accessToken": "fresh"}));
        })
        .await;
    ctx.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/product/popular")
                .header("authorization", "Bearer fresh");
            then.status(200).json_body(json!([]));
        })
        .await;
    ctx.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/category/get-all")
                .header("authorization", "Bearer fresh");
            then.status(200)
                .json_body(json!([{"_id": "c1", "name": "Shoes", "slug": "shoes"}]));
        })
        .await;

    let catalog = storefront.catalog();
    tokio::join!(catalog.fetch_popular_products(), catalog.fetch_categories());

    refresh.assert_calls_async(1).await;
    assert_eq!(catalog.snapshot().categories.len(), 1);
    assert!(storefront.auth().is_authenticated());
}
