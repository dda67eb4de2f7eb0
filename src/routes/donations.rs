use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::sum;
use diesel::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    activity,
    auth::{AuthenticatedUser, MaybeUser},
    error::{AppError, AppResult},
    models::{Donation, NewDonation, Role},
    receipts::{generate_receipt, ReceiptData},
    schema::{donations, users},
    state::AppState,
    validate,
};

/// `TXN-<unix millis>-<9 uppercase alphanumerics>`.
fn generate_transaction_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[derive(Deserialize)]
pub struct CreateDonationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Option<String>,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct DonationReference {
    pub id: Uuid,
    pub transaction_id: String,
    pub receipt_url: String,
}

#[derive(Serialize)]
pub struct DonationCreatedResponse {
    pub success: bool,
    pub message: String,
    pub donation: DonationReference,
}

pub async fn create_donation(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<CreateDonationRequest>,
) -> AppResult<(StatusCode, Json<DonationCreatedResponse>)> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.phone.trim().is_empty()
    {
        return Err(AppError::bad_request("All fields are required"));
    }
    if !validate::is_valid_email(payload.email.trim()) {
        return Err(AppError::bad_request("Invalid email address"));
    }
    if !(payload.amount.is_finite() && payload.amount > 0.0) {
        return Err(AppError::bad_request("Amount must be greater than zero"));
    }

    let user_id = user.as_ref().map(|u| u.user_id);
    let transaction_id = generate_transaction_id();

    let new_donation = NewDonation {
        id: Uuid::new_v4(),
        user_id,
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone.trim().to_string(),
        donor_role: payload.role.unwrap_or_else(|| "public".to_string()),
        amount: payload.amount,
        transaction_id: transaction_id.clone(),
    };

    let mut conn = state.db()?;
    let donation: Donation = diesel::insert_into(donations::table)
        .values(&new_donation)
        .get_result(&mut conn)?;

    // The response carries the receipt path, so generation has to finish
    // (or fail the request) before we reply.
    let receipt_url = generate_receipt(
        &state.files.receipts_dir(),
        &ReceiptData {
            receipt_no: donation.id,
            donor_name: donation.name.clone(),
            donor_email: donation.email.clone(),
            amount: donation.amount,
            transaction_id: transaction_id.clone(),
            issued_at: donation.donated_at,
        },
    )
    .map_err(AppError::internal)?;

    diesel::update(donations::table.find(donation.id))
        .set(donations::receipt_url.eq(&receipt_url))
        .execute(&mut conn)?;

    if let Some(actor) = user_id {
        activity::record(
            &mut conn,
            Some(actor),
            "Donation made",
            "donation",
            Some(donation.id),
            Some(format!("Amount: INR {}/-", donation.amount)),
        );
    }

    info!(donation_id = %donation.id, transaction_id = %transaction_id, "donation recorded");

    Ok((
        StatusCode::CREATED,
        Json(DonationCreatedResponse {
            success: true,
            message: "Donation successful! Thank you for your contribution.".to_string(),
            donation: DonationReference {
                id: donation.id,
                transaction_id,
                receipt_url,
            },
        }),
    ))
}

#[derive(Serialize)]
pub struct DonationRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub donor_role: String,
    pub amount: f64,
    pub transaction_id: String,
    pub receipt_url: Option<String>,
    pub donated_at: NaiveDateTime,
}

impl From<Donation> for DonationRecord {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            name: d.name,
            email: d.email,
            phone: d.phone,
            donor_role: d.donor_role,
            amount: d.amount,
            transaction_id: d.transaction_id,
            receipt_url: d.receipt_url,
            donated_at: d.donated_at,
        }
    }
}

#[derive(Serialize)]
pub struct MyDonationsResponse {
    pub success: bool,
    pub count: usize,
    pub donations: Vec<DonationRecord>,
}

pub async fn my_donations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<MyDonationsResponse>> {
    let mut conn = state.db()?;

    let rows: Vec<Donation> = donations::table
        .filter(donations::user_id.eq(user.user_id))
        .order(donations::donated_at.desc())
        .load(&mut conn)?;

    Ok(Json(MyDonationsResponse {
        success: true,
        count: rows.len(),
        donations: rows.into_iter().map(DonationRecord::from).collect(),
    }))
}

#[derive(Serialize)]
pub struct DonationWithDonor {
    #[serde(flatten)]
    pub donation: DonationRecord,
    pub user_name: Option<String>,
}

#[derive(Serialize)]
pub struct AllDonationsResponse {
    pub success: bool,
    pub count: usize,
    pub total: f64,
    pub donations: Vec<DonationWithDonor>,
}

pub async fn list_donations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<AllDonationsResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let rows: Vec<(Donation, Option<String>)> = donations::table
        .left_join(users::table)
        .select((donations::all_columns, users::name.nullable()))
        .order(donations::donated_at.desc())
        .load(&mut conn)?;

    let total: f64 = donations::table
        .select(sum(donations::amount))
        .first::<Option<f64>>(&mut conn)?
        .unwrap_or(0.0);

    let donations: Vec<DonationWithDonor> = rows
        .into_iter()
        .map(|(donation, user_name)| DonationWithDonor {
            donation: donation.into(),
            user_name,
        })
        .collect();

    Ok(Json(AllDonationsResponse {
        success: true,
        count: donations.len(),
        total,
        donations,
    }))
}
