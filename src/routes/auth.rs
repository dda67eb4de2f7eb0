use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    activity,
    auth::{password, AuthenticatedUser},
    error::{AppError, AppResult},
    models::{NewUser, Role, User},
    schema::users::dsl,
    state::AppState,
    validate,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: String,
    pub vehicle_type: Option<String>,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let name = payload.name.trim().to_string();
    if name.len() < 2 {
        return Err(AppError::bad_request("Name must be at least 2 characters"));
    }
    let email = payload.email.trim().to_lowercase();
    if !validate::is_valid_email(&email) {
        return Err(AppError::bad_request("Invalid email address"));
    }
    if !validate::is_valid_phone(&payload.phone) {
        return Err(AppError::bad_request("Invalid Indian phone number"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    let role: Role = payload
        .role
        .parse()
        .map_err(|_| AppError::bad_request("Invalid role"))?;

    let mut conn = state.db()?;

    let existing = dsl::users
        .filter(dsl::email.eq(&email))
        .select(dsl::id)
        .first::<Uuid>(&mut conn)
        .optional()?;
    if existing.is_some() {
        return Err(AppError::conflict("User with this email already exists"));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let new_user = NewUser {
        id: Uuid::new_v4(),
        name: name.clone(),
        email: email.clone(),
        phone: payload.phone.clone(),
        password_hash,
        role,
        vehicle_type: payload.vehicle_type.clone(),
    };

    match diesel::insert_into(dsl::users)
        .values(&new_user)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return Err(AppError::conflict("User with this email already exists"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    activity::record(
        &mut conn,
        Some(new_user.id),
        "User registered",
        "user",
        Some(new_user.id),
        None,
    );

    let token = state.jwt.issue_token(new_user.id, role)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token,
            user: UserSummary {
                id: new_user.id,
                name,
                email,
                role,
            },
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: String,
    pub vehicle_type: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("Email and password are required"));
    }

    let mut conn = state.db()?;

    let user: User = dsl::users
        .filter(dsl::email.eq(payload.email.trim().to_lowercase()))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|_| AppError::unauthorized("Invalid email or password"))?;
    if !valid {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let token = state.jwt.issue_token(user.id, user.role)?;

    activity::record(&mut conn, Some(user.id), "User logged in", "user", None, None);

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            vehicle_type: user.vehicle_type,
        },
    }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: AuthenticatedUser,
}

pub async fn me(user: AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user,
    })
}
