use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{ContactMessage, NewContactMessage, Role},
    schema::contact_messages,
    state::AppState,
    validate,
};

#[derive(Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ContactCreatedResponse {
    pub success: bool,
    pub message: String,
    pub contact_id: Uuid,
}

pub async fn create_message(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> AppResult<(StatusCode, Json<ContactCreatedResponse>)> {
    if payload.name.trim().is_empty() || payload.message.trim().is_empty() {
        return Err(AppError::bad_request("All fields are required"));
    }
    if !validate::is_valid_email(payload.email.trim()) {
        return Err(AppError::bad_request("Valid email is required"));
    }
    if !validate::is_valid_phone(&payload.phone) {
        return Err(AppError::bad_request("Valid Indian phone number required"));
    }

    let new_message = NewContactMessage {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        phone: payload.phone,
        message: payload.message.trim().to_string(),
    };

    let mut conn = state.db()?;
    diesel::insert_into(contact_messages::table)
        .values(&new_message)
        .execute(&mut conn)?;

    Ok((
        StatusCode::CREATED,
        Json(ContactCreatedResponse {
            success: true,
            message: "Message sent successfully! We will contact you soon.".to_string(),
            contact_id: new_message.id,
        }),
    ))
}

#[derive(Serialize)]
pub struct ContactRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct ContactListResponse {
    pub success: bool,
    pub count: usize,
    pub contacts: Vec<ContactRecord>,
}

pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<ContactListResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let rows: Vec<ContactMessage> = contact_messages::table
        .order(contact_messages::created_at.desc())
        .load(&mut conn)?;

    let contacts = rows
        .into_iter()
        .map(|m| ContactRecord {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            message: m.message,
            created_at: m.created_at,
        })
        .collect::<Vec<_>>();

    Ok(Json(ContactListResponse {
        success: true,
        count: contacts.len(),
        contacts,
    }))
}
