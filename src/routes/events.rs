use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    activity,
    auth::AuthenticatedUser,
    error::{AppError, AppResult},
    models::{Event, EventStatus, NewEvent, Role},
    schema::{event_registrations, events, users},
    state::AppState,
    uploads::{image_extension, MAX_IMAGE_BYTES},
};

#[derive(Serialize)]
pub struct EventWithCreator {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn to_event_with_creator(event: Event, creator_name: String) -> EventWithCreator {
    EventWithCreator {
        id: event.id,
        title: event.title,
        description: event.description,
        date: event.date,
        location: event.location,
        image_url: event.image_url,
        status: event.status,
        created_by: event.created_by,
        created_by_name: creator_name,
        created_at: event.created_at,
        updated_at: event.updated_at,
    }
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct EventListResponse {
    pub success: bool,
    pub count: usize,
    pub events: Vec<EventWithCreator>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> AppResult<Json<EventListResponse>> {
    let status = query
        .status
        .as_deref()
        .map(|value| {
            value
                .parse::<EventStatus>()
                .map_err(|err| AppError::bad_request(err.to_string()))
        })
        .transpose()?;

    let mut conn = state.db()?;

    let mut query = events::table
        .inner_join(users::table)
        .select((events::all_columns, users::name))
        .order(events::date.desc())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(events::status.eq(status));
    }

    let rows: Vec<(Event, String)> = query.load(&mut conn)?;
    let events: Vec<EventWithCreator> = rows
        .into_iter()
        .map(|(event, name)| to_event_with_creator(event, name))
        .collect();

    Ok(Json(EventListResponse {
        success: true,
        count: events.len(),
        events,
    }))
}

#[derive(Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: EventWithCreator,
    pub registration_count: i64,
}

#[derive(Serialize)]
pub struct EventDetailResponse {
    pub success: bool,
    pub event: EventDetail,
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventDetailResponse>> {
    let mut conn = state.db()?;

    let (event, creator_name): (Event, String) = events::table
        .inner_join(users::table)
        .filter(events::id.eq(event_id))
        .select((events::all_columns, users::name))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let registration_count: i64 = event_registrations::table
        .filter(event_registrations::event_id.eq(event_id))
        .select(count_star())
        .first(&mut conn)?;

    Ok(Json(EventDetailResponse {
        success: true,
        event: EventDetail {
            event: to_event_with_creator(event, creator_name),
            registration_count,
        },
    }))
}

#[derive(Default)]
struct EventForm {
    title: Option<String>,
    description: Option<String>,
    date: Option<NaiveDate>,
    location: Option<String>,
    status: Option<EventStatus>,
    image: Option<(Vec<u8>, String)>,
}

async fn read_event_form(mut multipart: Multipart) -> AppResult<EventForm> {
    let mut form = EventForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::bad_request(format!("invalid multipart data: {err}"))
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field
                    .file_name()
                    .map(|n| n.to_string())
                    .ok_or_else(|| AppError::bad_request("image filename is required"))?;
                let declared_mime = field.content_type().map(|mime| mime.to_string());
                let extension = image_extension(&filename)
                    .ok_or_else(|| AppError::bad_request("Only image files are allowed"))?;
                if let Some(mime) = declared_mime {
                    if !mime.starts_with("image/") {
                        return Err(AppError::bad_request("Only image files are allowed"));
                    }
                }
                let data = field.bytes().await.map_err(|err| {
                    error!(error = %err, "failed to read image bytes");
                    AppError::bad_request(format!("failed to read image bytes: {err}"))
                })?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::bad_request("Image must be 5MB or smaller"));
                }
                form.image = Some((data.to_vec(), extension));
            }
            Some("title") => form.title = Some(read_text(field).await?),
            Some("description") => form.description = Some(read_text(field).await?),
            Some("location") => form.location = Some(read_text(field).await?),
            Some("date") => {
                let value = read_text(field).await?;
                let parsed = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|_| AppError::bad_request("date must be formatted YYYY-MM-DD"))?;
                form.date = Some(parsed);
            }
            Some("status") => {
                let value = read_text(field).await?;
                let parsed = value
                    .trim()
                    .parse::<EventStatus>()
                    .map_err(|err| AppError::bad_request(err.to_string()))?;
                form.status = Some(parsed);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid form field: {err}")))
}

fn require_field<T>(value: Option<T>, name: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::bad_request(format!("{name} is required")))
}

#[derive(Serialize)]
pub struct EventCreatedResponse {
    pub success: bool,
    pub message: String,
    pub event_id: Uuid,
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<EventCreatedResponse>)> {
    user.require_role(&[Role::Admin])?;

    let form = read_event_form(multipart).await?;
    let title = require_field(form.title, "title")?;
    let description = require_field(form.description, "description")?;
    let date = require_field(form.date, "date")?;
    let location = require_field(form.location, "location")?;

    if title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }

    let image_url = match form.image {
        Some((bytes, extension)) => Some(state.files.save_event_image(&bytes, &extension).await?),
        None => None,
    };

    let new_event = NewEvent {
        id: Uuid::new_v4(),
        title: title.clone(),
        description,
        date,
        location,
        image_url,
        status: EventStatus::Upcoming,
        created_by: user.user_id,
    };

    let mut conn = state.db()?;
    diesel::insert_into(events::table)
        .values(&new_event)
        .execute(&mut conn)?;

    activity::record(
        &mut conn,
        Some(user.user_id),
        "Event created",
        "event",
        Some(new_event.id),
        Some(title),
    );

    info!(event_id = %new_event.id, "event created");

    Ok((
        StatusCode::CREATED,
        Json(EventCreatedResponse {
            success: true,
            message: "Event created successfully".to_string(),
            event_id: new_event.id,
        }),
    ))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<MessageResponse>> {
    user.require_role(&[Role::Admin])?;

    let form = read_event_form(multipart).await?;
    let title = require_field(form.title, "title")?;
    let description = require_field(form.description, "description")?;
    let date = require_field(form.date, "date")?;
    let location = require_field(form.location, "location")?;
    let status = require_field(form.status, "status")?;

    let new_image_url = match form.image {
        Some((bytes, extension)) => Some(state.files.save_event_image(&bytes, &extension).await?),
        None => None,
    };

    let mut conn = state.db()?;

    let existing: Event = events::table
        .find(event_id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let now = Utc::now().naive_utc();
    // A fresh upload replaces the stored image; otherwise the old one stays.
    let image_url = new_image_url.or(existing.image_url);

    diesel::update(events::table.find(event_id))
        .set((
            events::title.eq(&title),
            events::description.eq(&description),
            events::date.eq(date),
            events::location.eq(&location),
            events::status.eq(status),
            events::image_url.eq(image_url),
            events::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    activity::record(
        &mut conn,
        Some(user.user_id),
        "Event updated",
        "event",
        Some(event_id),
        Some(title),
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Event updated successfully".to_string(),
    }))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    user.require_role(&[Role::Admin])?;

    let mut conn = state.db()?;

    let deleted = diesel::delete(events::table.find(event_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found("Event not found"));
    }

    activity::record(
        &mut conn,
        Some(user.user_id),
        "Event deleted",
        "event",
        Some(event_id),
        None,
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Event deleted successfully".to_string(),
    }))
}
