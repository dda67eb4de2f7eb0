use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Nullable, Text, Timestamptz, Uuid as SqlUuid};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{ActivityLog, EventRegistration, RegistrationStatus, Role},
    schema::{activity_logs, donations, event_registrations, events, recycling_requests, users},
    state::AppState,
};

#[derive(Serialize)]
pub struct DashboardStats {
    pub total_volunteers: i64,
    pub total_delivery_boys: i64,
    pub total_events: i64,
    pub total_donations: i64,
    pub total_donation_amount: f64,
    pub total_recycling_requests: i64,
}

#[derive(Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub stats: DashboardStats,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Fixed set of independent aggregates, recomputed on every call. Reads are
/// snapshot-style; concurrent writes may land between the counts.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<DashboardResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let total_volunteers: i64 = users::table
        .filter(users::role.eq(Role::Volunteer))
        .select(count_star())
        .first(&mut conn)?;

    let total_delivery_boys: i64 = users::table
        .filter(users::role.eq(Role::DeliveryBoy))
        .select(count_star())
        .first(&mut conn)?;

    let total_events: i64 = events::table.select(count_star()).first(&mut conn)?;

    let (total_donations, donation_sum): (i64, Option<f64>) = donations::table
        .select((count_star(), sum(donations::amount)))
        .first(&mut conn)?;

    let total_recycling_requests: i64 = recycling_requests::table
        .select(count_star())
        .first(&mut conn)?;

    let recent: Vec<(ActivityLog, Option<String>)> = activity_logs::table
        .left_join(users::table)
        .select((activity_logs::all_columns, users::name.nullable()))
        .order(activity_logs::created_at.desc())
        .limit(10)
        .load(&mut conn)?;

    let recent_activity: Vec<ActivityEntry> = recent
        .into_iter()
        .map(|(entry, user_name)| ActivityEntry {
            id: entry.id,
            user_id: entry.user_id,
            user_name,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            details: entry.details,
            created_at: entry.created_at,
        })
        .collect();

    Ok(Json(DashboardResponse {
        success: true,
        stats: DashboardStats {
            total_volunteers,
            total_delivery_boys,
            total_events,
            total_donations,
            total_donation_amount: donation_sum.unwrap_or(0.0),
            total_recycling_requests,
        },
        recent_activity,
    }))
}

#[derive(Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub vehicle_type: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<UserRecord>,
}

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<Json<UserListResponse>> {
    user.require_role(&[Role::Admin])?;

    let role = query
        .role
        .as_deref()
        .map(|value| {
            value
                .parse::<Role>()
                .map_err(|err| AppError::bad_request(err.to_string()))
        })
        .transpose()?;

    let mut conn = state.db()?;

    // Password hashes never leave the handler.
    let mut query = users::table
        .select((
            users::id,
            users::name,
            users::email,
            users::phone,
            users::role,
            users::vehicle_type,
            users::created_at,
        ))
        .order(users::created_at.desc())
        .into_boxed();
    if let Some(role) = role {
        query = query.filter(users::role.eq(role));
    }

    let rows: Vec<(
        Uuid,
        String,
        String,
        String,
        Role,
        Option<String>,
        NaiveDateTime,
    )> = query.load(&mut conn)?;

    let users: Vec<UserRecord> = rows
        .into_iter()
        .map(
            |(id, name, email, phone, role, vehicle_type, created_at)| UserRecord {
                id,
                name,
                email,
                phone,
                role,
                vehicle_type,
                created_at,
            },
        )
        .collect();

    Ok(Json(UserListResponse {
        success: true,
        count: users.len(),
        users,
    }))
}

#[derive(Serialize, QueryableByName)]
pub struct VolunteerStatsRow {
    #[diesel(sql_type = SqlUuid)]
    pub volunteer_id: Uuid,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub email: String,
    #[diesel(sql_type = Text)]
    pub phone: String,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = BigInt)]
    pub events_participated: i64,
    #[diesel(sql_type = BigInt)]
    pub certificates_earned: i64,
    #[diesel(sql_type = Double)]
    pub total_donated: f64,
}

#[derive(Serialize)]
pub struct VolunteerStatsResponse {
    pub success: bool,
    pub count: usize,
    pub volunteers: Vec<VolunteerStatsRow>,
}

pub async fn volunteer_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<VolunteerStatsResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let volunteers: Vec<VolunteerStatsRow> = sql_query(
        "SELECT u.id AS volunteer_id, u.name, u.email, u.phone, u.created_at, \
                COUNT(DISTINCT er.event_id) AS events_participated, \
                COUNT(DISTINCT c.id) AS certificates_earned, \
                COALESCE(SUM(d.amount), 0) AS total_donated \
         FROM users u \
         LEFT JOIN event_registrations er ON u.id = er.volunteer_id \
         LEFT JOIN certificates c ON u.id = c.volunteer_id \
         LEFT JOIN donations d ON u.id = d.user_id \
         WHERE u.role = 'volunteer' \
         GROUP BY u.id, u.name, u.email, u.phone, u.created_at \
         ORDER BY u.created_at DESC",
    )
    .load(&mut conn)?;

    Ok(Json(VolunteerStatsResponse {
        success: true,
        count: volunteers.len(),
        volunteers,
    }))
}

#[derive(Serialize, QueryableByName)]
pub struct DeliveryBoyStatsRow {
    #[diesel(sql_type = SqlUuid)]
    pub delivery_boy_id: Uuid,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub email: String,
    #[diesel(sql_type = Text)]
    pub phone: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub vehicle_type: Option<String>,
    #[diesel(sql_type = Timestamptz)]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = BigInt)]
    pub completed_tasks: i64,
    #[diesel(sql_type = BigInt)]
    pub active_tasks: i64,
    #[diesel(sql_type = BigInt)]
    pub completed_pickups: i64,
}

#[derive(Serialize)]
pub struct DeliveryBoyStatsResponse {
    pub success: bool,
    pub count: usize,
    pub delivery_boys: Vec<DeliveryBoyStatsRow>,
}

pub async fn delivery_boy_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<DeliveryBoyStatsResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let delivery_boys: Vec<DeliveryBoyStatsRow> = sql_query(
        "SELECT u.id AS delivery_boy_id, u.name, u.email, u.phone, u.vehicle_type, u.created_at, \
                COUNT(DISTINCT CASE WHEN t.status = 'completed' THEN t.id END) AS completed_tasks, \
                COUNT(DISTINCT CASE WHEN t.status IN ('assigned', 'in-progress') THEN t.id END) AS active_tasks, \
                COUNT(DISTINCT CASE WHEN rr.status = 'completed' THEN rr.id END) AS completed_pickups \
         FROM users u \
         LEFT JOIN tasks t ON u.id = t.assigned_to AND t.assigned_role = 'delivery_boy' \
         LEFT JOIN recycling_requests rr ON u.id = rr.assigned_to \
         WHERE u.role = 'delivery_boy' \
         GROUP BY u.id, u.name, u.email, u.phone, u.vehicle_type, u.created_at \
         ORDER BY u.created_at DESC",
    )
    .load(&mut conn)?;

    Ok(Json(DeliveryBoyStatsResponse {
        success: true,
        count: delivery_boys.len(),
        delivery_boys,
    }))
}

#[derive(Serialize, QueryableByName)]
pub struct AvailableDeliveryBoyRow {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub email: String,
    #[diesel(sql_type = Text)]
    pub phone: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub vehicle_type: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub active_tasks: i64,
}

#[derive(Serialize)]
pub struct AvailableDeliveryBoysResponse {
    pub success: bool,
    pub count: usize,
    pub delivery_boys: Vec<AvailableDeliveryBoyRow>,
}

/// Least-loaded first, for the assignment picker.
pub async fn available_delivery_boys(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<AvailableDeliveryBoysResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let delivery_boys: Vec<AvailableDeliveryBoyRow> = sql_query(
        "SELECT u.id, u.name, u.email, u.phone, u.vehicle_type, \
                COUNT(t.id) AS active_tasks \
         FROM users u \
         LEFT JOIN tasks t ON u.id = t.assigned_to AND t.status IN ('assigned', 'in-progress') \
         WHERE u.role = 'delivery_boy' \
         GROUP BY u.id, u.name, u.email, u.phone, u.vehicle_type \
         ORDER BY active_tasks ASC, u.name ASC",
    )
    .load(&mut conn)?;

    Ok(Json(AvailableDeliveryBoysResponse {
        success: true,
        count: delivery_boys.len(),
        delivery_boys,
    }))
}

#[derive(Serialize)]
pub struct RegistrationRecord {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub event_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub volunteer_name: String,
    pub volunteer_email: String,
    pub volunteer_phone: String,
}

#[derive(Serialize)]
pub struct RegistrationListResponse {
    pub success: bool,
    pub count: usize,
    pub registrations: Vec<RegistrationRecord>,
}

pub async fn event_registrations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<RegistrationListResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let rows: Vec<(EventRegistration, String, String, String)> = event_registrations::table
        .inner_join(users::table)
        .filter(event_registrations::event_id.eq(event_id))
        .select((
            event_registrations::all_columns,
            users::name,
            users::email,
            users::phone,
        ))
        .order(event_registrations::registered_at.desc())
        .load(&mut conn)?;

    let registrations: Vec<RegistrationRecord> = rows
        .into_iter()
        .map(|(r, name, email, phone)| RegistrationRecord {
            id: r.id,
            volunteer_id: r.volunteer_id,
            event_id: r.event_id,
            status: r.status,
            registered_at: r.registered_at,
            completed_at: r.completed_at,
            volunteer_name: name,
            volunteer_email: email,
            volunteer_phone: phone,
        })
        .collect();

    Ok(Json(RegistrationListResponse {
        success: true,
        count: registrations.len(),
        registrations,
    }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn complete_registration(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(registration_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let registration: EventRegistration = event_registrations::table
        .find(registration_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Registration not found"))?;

    // registered -> completed is terminal.
    if registration.status == RegistrationStatus::Completed {
        return Err(AppError::conflict(
            "Participation already marked as completed",
        ));
    }

    diesel::update(event_registrations::table.find(registration_id))
        .set((
            event_registrations::status.eq(RegistrationStatus::Completed),
            event_registrations::completed_at.eq(Some(Utc::now().naive_utc())),
        ))
        .execute(&mut conn)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Participation marked as completed".to_string(),
    }))
}
