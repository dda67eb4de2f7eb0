mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, TestApp};
use greenpulse_backend::models::Role;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Deserialize)]
struct DonationCreatedResponse {
    success: bool,
    donation: DonationReference,
}

#[derive(Deserialize)]
struct DonationReference {
    #[allow(dead_code)]
    id: Uuid,
    transaction_id: String,
    receipt_url: String,
}

#[tokio::test]
async fn anonymous_donation_produces_receipt() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let response = app
        .post_json(
            "/api/donations",
            &json!({
                "name": "Well Wisher",
                "email": "wisher@example.com",
                "phone": "9123456780",
                "amount": 501.0
            }),
            None,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_vec(response.into_body()).await?;
    let created: DonationCreatedResponse = serde_json::from_slice(&body)?;
    assert!(created.success);

    assert!(created.donation.transaction_id.starts_with("TXN-"));
    assert!(created
        .donation
        .receipt_url
        .starts_with("/uploads/receipts/receipt-TXN-"));
    assert!(created.donation.receipt_url.ends_with(".pdf"));

    // The receipt is a real PDF on disk under the upload root.
    let relative = created
        .donation
        .receipt_url
        .strip_prefix("/uploads/")
        .expect("receipt under uploads");
    let pdf = std::fs::read(app.upload_root().join(relative))?;
    assert!(pdf.starts_with(b"%PDF"));

    // And reachable over the static route.
    let served = app.get(&created.donation.receipt_url, None).await?;
    assert_eq!(served.status(), StatusCode::OK);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn donation_validation_rejects_bad_payloads() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let zero_amount = app
        .post_json(
            "/api/donations",
            &json!({
                "name": "Well Wisher",
                "email": "wisher@example.com",
                "phone": "9123456780",
                "amount": 0.0
            }),
            None,
        )
        .await?;
    assert_eq!(zero_amount.status(), StatusCode::BAD_REQUEST);

    let bad_email = app
        .post_json(
            "/api/donations",
            &json!({
                "name": "Well Wisher",
                "email": "not-an-email",
                "phone": "9123456780",
                "amount": 100.0
            }),
            None,
        )
        .await?;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn logged_in_donations_appear_in_history_and_admin_totals() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("donor@example.com", "donorpass", Role::Volunteer)
        .await?;
    let donor_token = app.login_token("donor@example.com", "donorpass").await?;
    app.insert_user("admin@example.com", "adminpass", Role::Admin)
        .await?;
    let admin_token = app.login_token("admin@example.com", "adminpass").await?;

    for amount in [150.0, 200.0] {
        let response = app
            .post_json(
                "/api/donations",
                &json!({
                    "name": "Donor",
                    "email": "donor@example.com",
                    "phone": "9123456780",
                    "amount": amount
                }),
                Some(&donor_token),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let mine = app
        .get("/api/donations/my-donations", Some(&donor_token))
        .await?;
    assert_eq!(mine.status(), StatusCode::OK);
    let mine_body = body_to_vec(mine.into_body()).await?;
    let mine_json: serde_json::Value = serde_json::from_slice(&mine_body)?;
    assert_eq!(mine_json["count"].as_u64(), Some(2));

    let all = app.get("/api/donations", Some(&admin_token)).await?;
    assert_eq!(all.status(), StatusCode::OK);
    let all_body = body_to_vec(all.into_body()).await?;
    let all_json: serde_json::Value = serde_json::from_slice(&all_body)?;
    assert_eq!(all_json["count"].as_u64(), Some(2));
    assert_eq!(all_json["total"].as_f64(), Some(350.0));
    assert_eq!(all_json["donations"][0]["user_name"].as_str(), Some("donor"));

    let forbidden = app.get("/api/donations", Some(&donor_token)).await?;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    app.cleanup().await?;
    Ok(())
}
