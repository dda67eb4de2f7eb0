use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    activity,
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{NewRecyclingRequest, RecyclingRequest, RequestStatus, Role, User},
    schema::{recycling_requests, users},
    state::AppState,
    validate,
};

/// `REQ-<year>-<last six digits of unix millis>`.
fn generate_request_id() -> String {
    let now = Utc::now();
    let millis = now.timestamp_millis().unsigned_abs();
    format!("REQ-{}-{:06}", now.year(), millis % 1_000_000)
}

#[derive(Deserialize)]
pub struct CreateRecyclingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub item_type: String,
    pub pickup_date: String,
}

#[derive(Serialize)]
pub struct RequestReference {
    pub id: Uuid,
    pub request_id: String,
}

#[derive(Serialize)]
pub struct RequestCreatedResponse {
    pub success: bool,
    pub message: String,
    pub request: RequestReference,
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecyclingRequest>,
) -> AppResult<(StatusCode, Json<RequestCreatedResponse>)> {
    if payload.name.trim().is_empty()
        || payload.address.trim().is_empty()
        || payload.item_type.trim().is_empty()
    {
        return Err(AppError::bad_request("All fields are required"));
    }
    if !validate::is_valid_email(payload.email.trim()) {
        return Err(AppError::bad_request("Valid email is required"));
    }
    if !validate::is_valid_phone(&payload.phone) {
        return Err(AppError::bad_request("Valid Indian phone number required"));
    }
    let pickup_date = NaiveDate::parse_from_str(payload.pickup_date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("pickup_date must be formatted YYYY-MM-DD"))?;

    let new_request = NewRecyclingRequest {
        id: Uuid::new_v4(),
        request_id: generate_request_id(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone,
        address: payload.address.trim().to_string(),
        item_type: payload.item_type.trim().to_string(),
        pickup_date,
        status: RequestStatus::Pending,
    };

    let mut conn = state.db()?;
    diesel::insert_into(recycling_requests::table)
        .values(&new_request)
        .execute(&mut conn)?;

    info!(request_id = %new_request.request_id, "recycling pickup requested");

    Ok((
        StatusCode::CREATED,
        Json(RequestCreatedResponse {
            success: true,
            message: "Recycling request submitted successfully! We will contact you soon."
                .to_string(),
            request: RequestReference {
                id: new_request.id,
                request_id: new_request.request_id,
            },
        }),
    ))
}

#[derive(Serialize)]
pub struct RecyclingRecord {
    pub id: Uuid,
    pub request_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub item_type: String,
    pub pickup_date: NaiveDate,
    pub status: RequestStatus,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub created_at: NaiveDateTime,
}

fn to_record(request: RecyclingRequest, assigned_to_name: Option<String>) -> RecyclingRecord {
    RecyclingRecord {
        id: request.id,
        request_id: request.request_id,
        name: request.name,
        email: request.email,
        phone: request.phone,
        address: request.address,
        item_type: request.item_type,
        pickup_date: request.pickup_date,
        status: request.status,
        assigned_to: request.assigned_to,
        assigned_to_name,
        created_at: request.created_at,
    }
}

#[derive(Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub count: usize,
    pub requests: Vec<RecyclingRecord>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<Json<RequestListResponse>> {
    user.require_role(&[Role::Admin])?;

    let status = query
        .status
        .as_deref()
        .map(|value| {
            value
                .parse::<RequestStatus>()
                .map_err(|err| AppError::bad_request(err.to_string()))
        })
        .transpose()?;

    let mut conn = state.db()?;

    let mut query = recycling_requests::table
        .left_join(users::table)
        .select((recycling_requests::all_columns, users::name.nullable()))
        .order(recycling_requests::created_at.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(recycling_requests::status.eq(status));
    }

    let rows: Vec<(RecyclingRequest, Option<String>)> = query.load(&mut conn)?;
    let requests: Vec<RecyclingRecord> = rows
        .into_iter()
        .map(|(request, name)| to_record(request, name))
        .collect();

    Ok(Json(RequestListResponse {
        success: true,
        count: requests.len(),
        requests,
    }))
}

#[derive(Deserialize)]
pub struct AssignRequestBody {
    pub delivery_boy_id: Uuid,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn assign_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    Json(body): Json<AssignRequestBody>,
) -> AppResult<Json<MessageResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let request: RecyclingRequest = recycling_requests::table
        .find(request_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Recycling request not found"))?;

    // pending -> assigned only; re-assignment is rejected rather than
    // silently overwriting the current assignee.
    if request.status != RequestStatus::Pending {
        return Err(AppError::conflict("Request has already been assigned"));
    }

    let assignee: User = users::table
        .find(body.delivery_boy_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Delivery person not found"))?;
    if assignee.role != Role::DeliveryBoy {
        return Err(AppError::bad_request("User is not a delivery person"));
    }

    diesel::update(recycling_requests::table.find(request_id))
        .set((
            recycling_requests::assigned_to.eq(Some(assignee.id)),
            recycling_requests::status.eq(RequestStatus::Assigned),
        ))
        .execute(&mut conn)?;

    activity::record(
        &mut conn,
        Some(user.user_id),
        "Recycling request assigned",
        "recycling_request",
        Some(request_id),
        None,
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Request assigned successfully".to_string(),
    }))
}
