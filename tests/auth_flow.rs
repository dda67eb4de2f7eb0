mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, TestApp};
use greenpulse_backend::models::Role;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Deserialize)]
struct RegisterResponse {
    success: bool,
    token: String,
    user: UserSummary,
}

#[derive(Deserialize)]
struct UserSummary {
    id: Uuid,
    email: String,
    role: Role,
}

#[tokio::test]
async fn register_login_and_me_round_trip() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let response = app
        .post_json(
            "/api/auth/register",
            &json!({
                "name": "Asha Verma",
                "email": "Asha.Verma@example.com",
                "phone": "9812345678",
                "password": "plantmore",
                "role": "volunteer"
            }),
            None,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    let registered: RegisterResponse = serde_json::from_slice(&body)?;
    assert!(registered.success);
    assert_eq!(registered.user.role, Role::Volunteer);
    // Emails are stored lowercased.
    assert_eq!(registered.user.email, "asha.verma@example.com");

    let me = app.get("/api/auth/me", Some(&registered.token)).await?;
    assert_eq!(me.status(), StatusCode::OK);
    let me_body = body_to_vec(me.into_body()).await?;
    let me_json: serde_json::Value = serde_json::from_slice(&me_body)?;
    assert_eq!(
        me_json["user"]["user_id"].as_str(),
        Some(registered.user.id.to_string().as_str())
    );

    let token = app.login_token("asha.verma@example.com", "plantmore").await?;
    assert!(!token.is_empty());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let payload = json!({
        "name": "Ravi Kumar",
        "email": "ravi@example.com",
        "phone": "9876501234",
        "password": "secret123",
        "role": "volunteer"
    });

    let first = app.post_json("/api/auth/register", &payload, None).await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.post_json("/api/auth/register", &payload, None).await?;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_to_vec(second.into_body()).await?;
    let parsed: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(parsed["success"].as_bool(), Some(false));
    assert_eq!(
        parsed["message"].as_str(),
        Some("User with this email already exists")
    );

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn invalid_registration_payloads_are_rejected() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    // Phone numbers must be ten digits starting with 6-9.
    let bad_phone = app
        .post_json(
            "/api/auth/register",
            &json!({
                "name": "Test User",
                "email": "phone@example.com",
                "phone": "1234567890",
                "password": "secret123",
                "role": "volunteer"
            }),
            None,
        )
        .await?;
    assert_eq!(bad_phone.status(), StatusCode::BAD_REQUEST);

    let bad_role = app
        .post_json(
            "/api/auth/register",
            &json!({
                "name": "Test User",
                "email": "role@example.com",
                "phone": "9876543210",
                "password": "secret123",
                "role": "superuser"
            }),
            None,
        )
        .await?;
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);

    let short_password = app
        .post_json(
            "/api/auth/register",
            &json!({
                "name": "Test User",
                "email": "pass@example.com",
                "phone": "9876543210",
                "password": "tiny",
                "role": "volunteer"
            }),
            None,
        )
        .await?;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn wrong_credentials_and_missing_token() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("meena@example.com", "rightpass", Role::Volunteer)
        .await?;

    let login = app
        .post_json(
            "/api/auth/login",
            &json!({ "email": "meena@example.com", "password": "wrongpass" }),
            None,
        )
        .await?;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    let unknown = app
        .post_json(
            "/api/auth/login",
            &json!({ "email": "nobody@example.com", "password": "whatever" }),
            None,
        )
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    let me = app.get("/api/auth/me", None).await?;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let garbage = app.get("/api/auth/me", Some("not-a-jwt")).await?;
    assert_eq!(garbage.status(), StatusCode::FORBIDDEN);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn unknown_routes_fall_through_to_not_found() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let response = app.get("/api/no-such-route", None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_to_vec(response.into_body()).await?;
    let parsed: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(parsed["message"].as_str(), Some("Route not found"));

    app.cleanup().await?;
    Ok(())
}
