use axum::http::{HeaderValue, StatusCode};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod contact;
pub mod delivery;
pub mod donations;
pub mod events;
pub mod health;
pub mod recycling;
pub mod volunteers;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let events_routes = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        );

    let donations_routes = Router::new()
        .route(
            "/",
            post(donations::create_donation).get(donations::list_donations),
        )
        .route("/my-donations", get(donations::my_donations));

    let contact_routes = Router::new().route(
        "/",
        post(contact::create_message).get(contact::list_messages),
    );

    let recycling_routes = Router::new()
        .route(
            "/",
            post(recycling::create_request).get(recycling::list_requests),
        )
        .route("/:id/assign", put(recycling::assign_request));

    let volunteers_routes = Router::new()
        .route(
            "/events/:event_id/register",
            post(volunteers::register_for_event),
        )
        .route("/my-events", get(volunteers::my_events));

    let delivery_routes = Router::new()
        .route("/recycling-requests", get(delivery::my_requests))
        .route(
            "/recycling-requests/:id/complete",
            put(delivery::complete_request),
        );

    let admin_routes = Router::new()
        .route("/dashboard-stats", get(admin::dashboard_stats))
        .route("/users", get(admin::list_users))
        .route("/volunteers", get(admin::volunteer_stats))
        .route("/delivery-boys", get(admin::delivery_boy_stats))
        .route(
            "/available-delivery-boys",
            get(admin::available_delivery_boys),
        )
        .route(
            "/events/:event_id/registrations",
            get(admin::event_registrations),
        )
        .route(
            "/event-registrations/:id/complete",
            put(admin::complete_registration),
        );

    let uploads_dir = state.files.root().to_path_buf();

    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/events", events_routes)
        .nest("/api/donations", donations_routes)
        .nest("/api/contact", contact_routes)
        .nest("/api/recycling", recycling_routes)
        .nest("/api/volunteers", volunteers_routes)
        .nest("/api/delivery-boys", delivery_routes)
        .nest("/api/admin", admin_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
}

async fn route_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}
