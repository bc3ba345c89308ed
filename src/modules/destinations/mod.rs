//! Destination catalog: public grid and detail, back office CRUD.

pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Router};
use savanna_db::Database;
use savanna_http::{
    extract::{Json, Path, Query},
    openapi, AppError, Flash,
};
use savanna_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::modules::preferences::{AdminPage, Listing, PreferenceStore};
use crate::utils::filter::ListFilter;

pub use models::{
    Destination, DestinationCard, DestinationInput, DestinationPatch, DestinationStatus, TourTags,
    CATEGORIES,
};
pub use store::DestinationStore;

#[derive(Clone)]
struct DestinationsState {
    store: DestinationStore,
    layouts: PreferenceStore,
}

/// Destinations module
pub struct DestinationsModule {
    state: DestinationsState,
}

impl DestinationsModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: DestinationsState {
                store: DestinationStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for DestinationsModule {
    fn name(&self) -> &'static str {
        "destinations"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "destinations module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list_public))
                .route("/{id}", get(show_public))
                .with_state(self.state.clone()),
        )
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list_admin).post(create))
                .route("/{id}", get(show_admin).put(update).delete(destroy))
                .with_state(self.state.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let filters = json!([
            openapi::query_param("search", "Substring of name or description, case-insensitive"),
            openapi::query_param("category", "Exact category"),
            openapi::query_param("tag", "Exact tour category tag"),
        ]);
        let mut admin_filters = filters.clone();
        if let Some(params) = admin_filters.as_array_mut() {
            params.push(openapi::query_param("status", "active or inactive"));
        }

        Some(json!({
            "paths": {
                "/api/destinations": {
                    "get": {
                        "summary": "Active destinations as grid cards",
                        "tags": ["Destinations"],
                        "parameters": filters,
                        "responses": {
                            "200": openapi::json_response("Destination cards", openapi::array_of("DestinationCard"))
                        }
                    }
                },
                "/api/destinations/{id}": {
                    "get": {
                        "summary": "Active destination detail",
                        "tags": ["Destinations"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Destination", openapi::schema_ref("Destination")),
                            "404": openapi::error_response("Destination not found")
                        }
                    }
                },
                "/admin/destinations": {
                    "get": {
                        "summary": "All destinations with the page layout",
                        "tags": ["Destinations"],
                        "parameters": admin_filters,
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    },
                    "post": {
                        "summary": "Create a destination",
                        "tags": ["Destinations"],
                        "requestBody": openapi::json_body("DestinationInput"),
                        "responses": {
                            "201": openapi::json_response("Created", json!({ "type": "object" })),
                            "422": openapi::error_response("Validation error")
                        }
                    }
                },
                "/admin/destinations/{id}": {
                    "get": {
                        "summary": "Destination detail",
                        "tags": ["Destinations"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Destination", openapi::schema_ref("Destination")),
                            "404": openapi::error_response("Destination not found")
                        }
                    },
                    "put": {
                        "summary": "Edit a destination (absent fields unchanged)",
                        "tags": ["Destinations"],
                        "parameters": [openapi::id_param("id")],
                        "requestBody": openapi::json_body("DestinationInput"),
                        "responses": {
                            "200": openapi::json_response("Updated", json!({ "type": "object" })),
                            "404": openapi::error_response("Destination not found"),
                            "422": openapi::error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a destination",
                        "tags": ["Destinations"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Deleted", json!({ "type": "object" })),
                            "404": openapi::error_response("Destination not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "DestinationInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "location": { "type": "string" },
                            "type": { "type": "string" },
                            "category": { "type": "string", "enum": CATEGORIES },
                            "tour": {
                                "oneOf": [
                                    { "type": "string" },
                                    { "type": "array", "items": { "type": "string" } }
                                ]
                            },
                            "description": { "type": "string" },
                            "info": { "type": "string" },
                            "rating": { "type": "number", "minimum": 0, "maximum": 5 },
                            "duration": { "type": "string" },
                            "group_size": { "type": "string" },
                            "status": { "type": "string", "enum": ["active", "inactive"] },
                            "image": { "type": "string" }
                        },
                        "required": ["name", "location", "type", "category", "tour", "description", "rating", "duration", "group_size", "image"]
                    },
                    "Destination": {
                        "allOf": [
                            openapi::schema_ref("DestinationInput"),
                            { "type": "object", "properties": { "id": { "type": "integer", "format": "int64" } }, "required": ["id"] }
                        ]
                    },
                    "DestinationCard": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "location": { "type": "string" },
                            "category": { "type": "string" },
                            "tour": {},
                            "rating": { "type": "number" },
                            "duration": { "type": "string" },
                            "image": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE destinations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (name != ''),
                    location TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    category TEXT NOT NULL,
                    tour TEXT NOT NULL,
                    description TEXT NOT NULL,
                    info TEXT NOT NULL DEFAULT '',
                    rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 5),
                    duration TEXT NOT NULL,
                    group_size TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('active', 'inactive')),
                    image TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX destinations_category ON destinations(category);
            "#,
        }]
    }
}

async fn list_public(
    State(state): State<DestinationsState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<DestinationCard>>, AppError> {
    let filter = filter.status(DestinationStatus::Active.as_str());
    let cards = filter
        .apply(state.store.list().await?)
        .iter()
        .map(DestinationCard::from)
        .collect();
    Ok(Json(cards))
}

async fn show_public(
    State(state): State<DestinationsState>,
    Path(id): Path<i64>,
) -> Result<Json<Destination>, AppError> {
    let destination = state.store.get(id).await?;
    if destination.status != DestinationStatus::Active {
        return Err(AppError::not_found(format!("destination {id} not found")));
    }
    Ok(Json(destination))
}

async fn list_admin(
    State(state): State<DestinationsState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<Destination>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Destinations).await?;
    let items = filter.apply(state.store.list().await?);
    Ok(Json(Listing::new(layout, items)))
}

async fn show_admin(
    State(state): State<DestinationsState>,
    Path(id): Path<i64>,
) -> Result<Json<Destination>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

async fn create(
    State(state): State<DestinationsState>,
    Json(input): Json<DestinationInput>,
) -> Result<Flash<Destination>, AppError> {
    input.validate()?;
    let destination = state.store.create(&input).await?;
    tracing::info!(destination_id = destination.id, name = %destination.name, "destination created");
    Ok(Flash::created("Destination created successfully.", destination))
}

async fn update(
    State(state): State<DestinationsState>,
    Path(id): Path<i64>,
    Json(patch): Json<DestinationPatch>,
) -> Result<Flash<Destination>, AppError> {
    let current = state.store.get(id).await?;
    let input = patch.apply(current.input());
    input.validate()?;
    let destination = state.store.update(id, &input).await?;
    tracing::info!(destination_id = id, "destination updated");
    Ok(Flash::updated("Destination updated successfully.", destination))
}

async fn destroy(
    State(state): State<DestinationsState>,
    Path(id): Path<i64>,
) -> Result<Flash<()>, AppError> {
    state.store.delete(id).await?;
    tracing::info!(destination_id = id, "destination deleted");
    Ok(Flash::message("Destination deleted successfully."))
}

/// Create a new instance of the destinations module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(DestinationsModule::new(db))
}
