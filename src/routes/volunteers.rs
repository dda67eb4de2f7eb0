use axum::{
    extract::{Path, State},
    http::StatusCode,
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
    models::{Event, EventStatus, NewEventRegistration, RegistrationStatus, Role},
    schema::{event_registrations, events},
    state::AppState,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn register_for_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    user.require_role(&[Role::Volunteer])?;

    let mut conn = state.db()?;

    let event_exists = events::table
        .find(event_id)
        .select(events::id)
        .first::<Uuid>(&mut conn)
        .optional()?;
    if event_exists.is_none() {
        return Err(AppError::not_found("Event not found"));
    }

    let existing = event_registrations::table
        .filter(event_registrations::volunteer_id.eq(user.user_id))
        .filter(event_registrations::event_id.eq(event_id))
        .select(event_registrations::id)
        .first::<Uuid>(&mut conn)
        .optional()?;
    if existing.is_some() {
        return Err(AppError::conflict("Already registered for this event"));
    }

    let registration = NewEventRegistration {
        id: Uuid::new_v4(),
        volunteer_id: user.user_id,
        event_id,
        status: RegistrationStatus::Registered,
    };

    // Unique (volunteer_id, event_id) index backstops the pre-check under
    // concurrent retries.
    match diesel::insert_into(event_registrations::table)
        .values(&registration)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return Err(AppError::conflict("Already registered for this event"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    activity::record(
        &mut conn,
        Some(user.user_id),
        "Registered for event",
        "event",
        Some(event_id),
        None,
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            success: true,
            message: "Successfully registered for event".to_string(),
        }),
    ))
}

#[derive(Serialize)]
pub struct RegisteredEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub registration_status: RegistrationStatus,
    pub registered_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Serialize)]
pub struct MyEventsResponse {
    pub success: bool,
    pub count: usize,
    pub events: Vec<RegisteredEvent>,
}

pub async fn my_events(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<MyEventsResponse>> {
    user.require_role(&[Role::Volunteer])?;

    let mut conn = state.db()?;

    let rows: Vec<(
        Event,
        RegistrationStatus,
        NaiveDateTime,
        Option<NaiveDateTime>,
    )> = event_registrations::table
        .inner_join(events::table)
        .filter(event_registrations::volunteer_id.eq(user.user_id))
        .select((
            events::all_columns,
            event_registrations::status,
            event_registrations::registered_at,
            event_registrations::completed_at,
        ))
        .order(events::date.desc())
        .load(&mut conn)?;

    let events: Vec<RegisteredEvent> = rows
        .into_iter()
        .map(
            |(event, registration_status, registered_at, completed_at)| RegisteredEvent {
                id: event.id,
                title: event.title,
                description: event.description,
                date: event.date,
                location: event.location,
                image_url: event.image_url,
                status: event.status,
                registration_status,
                registered_at,
                completed_at,
            },
        )
        .collect();

    Ok(Json(MyEventsResponse {
        success: true,
        count: events.len(),
        events,
    }))
}
