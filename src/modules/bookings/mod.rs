//! Booking intake: the public booking form and the back office booking desk.

pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};
use savanna_db::Database;
use savanna_http::{
    extract::{Json, Path, Query},
    openapi, AppError, Flash,
};
use savanna_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::modules::preferences::{AdminPage, Listing, PreferenceStore};
use crate::utils::{clock, filter::ListFilter};

pub use models::{Booking, BookingStatus, NewBooking, UpdateBookingStatus};
pub use store::BookingStore;

#[derive(Clone)]
struct BookingsState {
    store: BookingStore,
    layouts: PreferenceStore,
}

pub struct BookingsModule {
    state: BookingsState,
}

impl BookingsModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: BookingsState {
                store: BookingStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for BookingsModule {
    fn name(&self) -> &'static str {
        "bookings"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "bookings module initialized"
        );
        Ok(())
    }

    fn site_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/bookings", post(submit))
                .with_state(self.state.clone()),
        )
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list))
                .route("/{id}", get(show).delete(destroy))
                .route("/{id}/status", put(update_status))
                .with_state(self.state.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/bookings": {
                    "post": {
                        "summary": "Submit the public booking form",
                        "tags": ["Bookings"],
                        "requestBody": openapi::json_body("NewBooking"),
                        "responses": {
                            "201": openapi::json_response("Booking received", json!({ "type": "object" })),
                            "422": openapi::error_response("Validation error")
                        }
                    }
                },
                "/admin/bookings": {
                    "get": {
                        "summary": "All bookings with the page layout",
                        "tags": ["Bookings"],
                        "parameters": [
                            openapi::query_param("search", "Substring of name, email or destination"),
                            openapi::query_param("country", "Exact country"),
                            openapi::query_param("status", "pending, confirmed or cancelled")
                        ],
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    }
                },
                "/admin/bookings/{id}": {
                    "get": {
                        "summary": "Booking detail",
                        "tags": ["Bookings"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Booking", openapi::schema_ref("Booking")),
                            "404": openapi::error_response("Booking not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a booking",
                        "tags": ["Bookings"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Deleted", json!({ "type": "object" })),
                            "404": openapi::error_response("Booking not found")
                        }
                    }
                },
                "/admin/bookings/{id}/status": {
                    "put": {
                        "summary": "Overwrite the booking status",
                        "tags": ["Bookings"],
                        "parameters": [openapi::id_param("id")],
                        "requestBody": openapi::json_body("UpdateBookingStatus"),
                        "responses": {
                            "200": openapi::json_response("Updated", json!({ "type": "object" })),
                            "404": openapi::error_response("Booking not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "NewBooking": {
                        "type": "object",
                        "properties": {
                            "destination_id": { "type": "integer", "format": "int64", "nullable": true },
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "phone": { "type": "string" },
                            "country": { "type": "string" },
                            "travel_date": { "type": "string", "format": "date" },
                            "group_size": { "type": "integer", "minimum": 1 },
                            "special_requests": { "type": "string", "nullable": true }
                        },
                        "required": ["name", "email", "phone", "country", "travel_date", "group_size"]
                    },
                    "Booking": {
                        "allOf": [
                            openapi::schema_ref("NewBooking"),
                            {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "integer", "format": "int64" },
                                    "destination_name": { "type": "string", "nullable": true },
                                    "status": { "type": "string", "enum": ["pending", "confirmed", "cancelled"] },
                                    "created_at": { "type": "string", "format": "date-time" }
                                },
                                "required": ["id", "status", "created_at"]
                            }
                        ]
                    },
                    "UpdateBookingStatus": {
                        "type": "object",
                        "properties": {
                            "status": { "type": "string", "enum": ["pending", "confirmed", "cancelled"] }
                        },
                        "required": ["status"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE bookings (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    destination_id INTEGER,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    country TEXT NOT NULL,
                    travel_date TEXT NOT NULL,
                    group_size INTEGER NOT NULL CHECK (group_size >= 1),
                    special_requests TEXT,
                    status TEXT NOT NULL CHECK (status IN ('pending', 'confirmed', 'cancelled')),
                    created_at TEXT NOT NULL
                );
                CREATE INDEX bookings_email ON bookings(email);
            "#,
        }]
    }
}

async fn submit(
    State(state): State<BookingsState>,
    Json(booking): Json<NewBooking>,
) -> Result<Flash<Booking>, AppError> {
    booking.validate(clock::today())?;
    let booking = state.store.create(&booking).await?;
    tracing::info!(
        booking_id = booking.id,
        destination_id = ?booking.destination_id,
        group_size = booking.group_size,
        "booking received"
    );
    Ok(Flash::created(
        "Thank you! Your booking request has been received.",
        booking,
    ))
}

async fn list(
    State(state): State<BookingsState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<Booking>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Bookings).await?;
    let items = filter.apply(state.store.list().await?);
    Ok(Json(Listing::new(layout, items)))
}

async fn show(
    State(state): State<BookingsState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

async fn update_status(
    State(state): State<BookingsState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateBookingStatus>,
) -> Result<Flash<Booking>, AppError> {
    let booking = state.store.set_status(id, body.status).await?;
    tracing::info!(booking_id = id, status = %body.status, "booking status updated");
    Ok(Flash::updated("Booking status updated successfully.", booking))
}

async fn destroy(
    State(state): State<BookingsState>,
    Path(id): Path<i64>,
) -> Result<Flash<()>, AppError> {
    state.store.delete(id).await?;
    tracing::info!(booking_id = id, "booking deleted");
    Ok(Flash::message("Booking deleted successfully."))
}

/// Create a new instance of the bookings module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(BookingsModule::new(db))
}
