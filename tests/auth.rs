mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, post_json, seed_customer, seed_staff, test_app};

#[tokio::test]
async fn health_check_responds() {
    let (app, _db) = test_app().await;

    let (status, _body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_registration_returns_record_and_token_pair() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Grace Hopper",
            "contact": "0700000002",
            "email": "grace@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["email"], "grace@example.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
}

#[tokio::test]
async fn registration_rejects_missing_fields_for_all_principals() {
    let (app, _db) = test_app().await;

    // admin: no contact
    let (status, _) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({"full_name": "X", "email": "x@example.com", "password": "LongEnough1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // customer: no address
    let (status, _) = post_json(
        &app,
        "/api/v1/customer/register",
        json!({
            "full_name": "X",
            "contact": "070",
            "email": "x@example.com",
            "password": "LongEnough1",
            "customer_type": "individual",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // staff: no password
    let (status, _) = post_json(
        &app,
        "/api/v1/users/",
        json!({"full_name": "X", "contact": "070", "email": "x@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_rejects_short_password_and_bad_email() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "X",
            "contact": "0700000010",
            "email": "x@example.com",
            "password": "short",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters");

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "X",
            "contact": "0700000010",
            "email": "not-an-email",
            "password": "LongEnough1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");

    let (status, _) = post_json(
        &app,
        "/api/v1/customer/register",
        json!({
            "full_name": "X",
            "contact": "0700000011",
            "email": "bad@@example",
            "password": "LongEnough1",
            "address": "Somewhere",
            "customer_type": "individual",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/api/v1/users/",
        json!({
            "full_name": "X",
            "contact": "0700000012",
            "email": "y@example.com",
            "password": "tiny",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_or_contact_conflicts() {
    let (app, _db) = test_app().await;

    let payload = json!({
        "full_name": "Grace Hopper",
        "contact": "0700000002",
        "email": "grace@example.com",
        "password": "FlowMatic1",
    });
    let (status, _) = post_json(&app, "/api/v1/auth/register", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    // same email, different contact
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Other",
            "contact": "0700000099",
            "email": "grace@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // same contact, different email
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Other",
            "contact": "0700000002",
            "email": "other@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // customers share the same rules
    seed_customer(&app).await;
    let (status, _) = post_json(
        &app,
        "/api/v1/customer/register",
        json!({
            "full_name": "Other",
            "contact": "0700999999",
            "email": "ada@example.com",
            "password": "S3curePass",
            "address": "Elsewhere",
            "customer_type": "individual",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_does_not_reveal_which_credential_was_wrong() {
    let (app, _db) = test_app().await;

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Grace Hopper",
            "contact": "0700000002",
            "email": "grace@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (wrong_pw_status, wrong_pw_body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"email": "grace@example.com", "password": "WrongPassword"}),
    )
    .await;
    let (unknown_status, unknown_body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"email": "nobody@example.com", "password": "WrongPassword"}),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);
}

#[tokio::test]
async fn each_principal_kind_can_log_in() {
    let (app, _db) = test_app().await;

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Grace Hopper",
            "contact": "0700000002",
            "email": "grace@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    seed_customer(&app).await;
    seed_staff(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({"email": "grace@example.com", "password": "FlowMatic1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["role"], "admin");

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/customer-login",
        json!({"email": "ada@example.com", "password": "S3curePass"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["access_token"].is_string());

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/user-login",
        json!({"email": "joe@example.com", "password": "LetItCrash"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["role"], "staff");
}

#[tokio::test]
async fn back_office_customers_cannot_log_in() {
    let (app, _db) = test_app().await;

    let (status, _) = post_json(
        &app,
        "/api/v1/customer/",
        json!({
            "full_name": "Walk In",
            "contact": "0700001234",
            "email": "walkin@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/customer-login",
        json!({"email": "walkin@example.com", "password": "anything1"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_issues_new_access_token_for_refresh_tokens_only() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Grace Hopper",
            "contact": "0700000002",
            "email": "grace@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let access_token = body["access_token"].as_str().unwrap().to_owned();
    let refresh_token = body["refresh_token"].as_str().unwrap().to_owned();

    let (status, body) = common::request(
        &app,
        "POST",
        "/api/v1/auth/refresh",
        None,
        Some(&refresh_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["access_token"].is_string());

    // an access token is the wrong kind
    let (status, _) = common::request(
        &app,
        "POST",
        "/api/v1/auth/refresh",
        None,
        Some(&access_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        common::request(&app, "POST", "/api/v1/auth/refresh", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::request(&app, "POST", "/api/v1/auth/refresh", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
