use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    activity,
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{RecyclingRequest, RequestStatus, Role},
    schema::recycling_requests,
    state::AppState,
};

#[derive(Serialize)]
pub struct AssignedPickup {
    pub id: Uuid,
    pub request_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub item_type: String,
    pub pickup_date: NaiveDate,
    pub status: RequestStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct MyPickupsResponse {
    pub success: bool,
    pub count: usize,
    pub requests: Vec<AssignedPickup>,
}

pub async fn my_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<MyPickupsResponse>> {
    user.require_role(&[Role::DeliveryBoy])?;

    let mut conn = state.db()?;

    let rows: Vec<RecyclingRequest> = recycling_requests::table
        .filter(recycling_requests::assigned_to.eq(user.user_id))
        .order(recycling_requests::pickup_date.asc())
        .load(&mut conn)?;

    let requests: Vec<AssignedPickup> = rows
        .into_iter()
        .map(|r| AssignedPickup {
            id: r.id,
            request_id: r.request_id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            item_type: r.item_type,
            pickup_date: r.pickup_date,
            status: r.status,
            created_at: r.created_at,
        })
        .collect();

    Ok(Json(MyPickupsResponse {
        success: true,
        count: requests.len(),
        requests,
    }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn complete_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    user.require_role(&[Role::DeliveryBoy])?;

    let mut conn = state.db()?;

    let request: RecyclingRequest = recycling_requests::table
        .find(request_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Recycling request not found"))?;

    if request.assigned_to != Some(user.user_id) {
        return Err(AppError::forbidden("You are not assigned to this pickup"));
    }
    if request.status != RequestStatus::Assigned {
        return Err(AppError::conflict("Pickup has already been completed"));
    }

    diesel::update(recycling_requests::table.find(request_id))
        .set(recycling_requests::status.eq(RequestStatus::Completed))
        .execute(&mut conn)?;

    activity::record(
        &mut conn,
        Some(user.user_id),
        "Recycling pickup completed",
        "recycling_request",
        Some(request_id),
        None,
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Pickup completed successfully".to_string(),
    }))
}
