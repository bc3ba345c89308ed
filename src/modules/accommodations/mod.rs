//! Accommodation directory linked to destinations.

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

pub use models::{Accommodation, AccommodationInput, AccommodationPatch};
pub use store::AccommodationStore;

#[derive(Clone)]
struct AccommodationsState {
    store: AccommodationStore,
    layouts: PreferenceStore,
}

impl AccommodationsState {
    /// Field checks plus a lookup of every linked destination.
    async fn validate(&self, input: &AccommodationInput) -> Result<(), AppError> {
        let mut errors = input.check();
        let unknown = self
            .store
            .unknown_destinations(&input.destination_ids())
            .await?;
        if !unknown.is_empty() {
            let ids: Vec<String> = unknown.iter().map(i64::to_string).collect();
            errors.add(
                "destination_ids",
                format!("Unknown destination ids: {}.", ids.join(", ")),
            );
        }
        errors.finish()
    }
}

pub struct AccommodationsModule {
    state: AccommodationsState,
}

impl AccommodationsModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: AccommodationsState {
                store: AccommodationStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for AccommodationsModule {
    fn name(&self) -> &'static str {
        "accommodations"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "accommodations module initialized");
        Ok(())
    }

    fn routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list_public))
                .route("/destination/{id}", get(for_destination))
                .with_state(self.state.clone()),
        )
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list_admin).post(create))
                .route("/{id}", get(show).put(update).delete(destroy))
                .with_state(self.state.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/api/accommodations": {
                    "get": {
                        "summary": "All accommodations",
                        "tags": ["Accommodations"],
                        "parameters": [openapi::query_param("search", "Substring of name, location or description")],
                        "responses": {
                            "200": openapi::json_response("Accommodations", openapi::array_of("Accommodation"))
                        }
                    }
                },
                "/api/accommodations/destination/{id}": {
                    "get": {
                        "summary": "Accommodations serving one destination",
                        "tags": ["Accommodations"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Accommodations", openapi::array_of("Accommodation"))
                        }
                    }
                },
                "/admin/accommodations": {
                    "get": {
                        "summary": "All accommodations with the page layout",
                        "tags": ["Accommodations"],
                        "parameters": [openapi::query_param("search", "Substring of name, location or description")],
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    },
                    "post": {
                        "summary": "Create an accommodation",
                        "tags": ["Accommodations"],
                        "requestBody": openapi::json_body("AccommodationInput"),
                        "responses": {
                            "201": openapi::json_response("Created", json!({ "type": "object" })),
                            "422": openapi::error_response("Validation error")
                        }
                    }
                },
                "/admin/accommodations/{id}": {
                    "get": {
                        "summary": "Accommodation detail",
                        "tags": ["Accommodations"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Accommodation", openapi::schema_ref("Accommodation")),
                            "404": openapi::error_response("Accommodation not found")
                        }
                    },
                    "put": {
                        "summary": "Edit an accommodation; absent fields are unchanged",
                        "tags": ["Accommodations"],
                        "parameters": [openapi::id_param("id")],
                        "requestBody": openapi::json_body("AccommodationInput"),
                        "responses": {
                            "200": openapi::json_response("Updated", json!({ "type": "object" })),
                            "404": openapi::error_response("Accommodation not found"),
                            "422": openapi::error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete an accommodation",
                        "tags": ["Accommodations"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Deleted", json!({ "type": "object" })),
                            "404": openapi::error_response("Accommodation not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "AccommodationInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "location": { "type": "string" },
                            "rating": { "type": "number", "minimum": 0, "maximum": 5 },
                            "description": { "type": "string" },
                            "website": { "type": "string" },
                            "image_url": { "type": "string", "nullable": true },
                            "destination_ids": { "type": "array", "items": { "type": "integer", "format": "int64" } }
                        },
                        "required": ["name", "location", "rating", "description", "website"]
                    },
                    "Accommodation": {
                        "allOf": [
                            openapi::schema_ref("AccommodationInput"),
                            {
                                "type": "object",
                                "properties": { "id": { "type": "integer", "format": "int64" } },
                                "required": ["id"]
                            }
                        ]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE accommodations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (name != ''),
                    location TEXT NOT NULL,
                    rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 5),
                    description TEXT NOT NULL,
                    website TEXT NOT NULL,
                    image_url TEXT
                );
                CREATE TABLE destination_accommodations (
                    destination_id INTEGER NOT NULL REFERENCES destinations(id) ON DELETE CASCADE,
                    accommodation_id INTEGER NOT NULL REFERENCES accommodations(id) ON DELETE CASCADE,
                    PRIMARY KEY (destination_id, accommodation_id)
                );
                CREATE INDEX destination_accommodations_accommodation
                    ON destination_accommodations(accommodation_id);
            "#,
        }]
    }
}

async fn list_public(
    State(state): State<AccommodationsState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Accommodation>>, AppError> {
    Ok(Json(filter.apply(state.store.list().await?)))
}

async fn for_destination(
    State(state): State<AccommodationsState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Accommodation>>, AppError> {
    Ok(Json(state.store.for_destination(id).await?))
}

async fn list_admin(
    State(state): State<AccommodationsState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<Accommodation>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Accommodations).await?;
    let items = filter.apply(state.store.list().await?);
    Ok(Json(Listing::new(layout, items)))
}

async fn show(
    State(state): State<AccommodationsState>,
    Path(id): Path<i64>,
) -> Result<Json<Accommodation>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

async fn create(
    State(state): State<AccommodationsState>,
    Json(input): Json<AccommodationInput>,
) -> Result<Flash<Accommodation>, AppError> {
    state.validate(&input).await?;
    let accommodation = state.store.create(&input).await?;
    tracing::info!(
        accommodation_id = accommodation.id,
        destinations = accommodation.destination_ids.len(),
        "accommodation created"
    );
    Ok(Flash::created("Accommodation created successfully.", accommodation))
}

async fn update(
    State(state): State<AccommodationsState>,
    Path(id): Path<i64>,
    Json(patch): Json<AccommodationPatch>,
) -> Result<Flash<Accommodation>, AppError> {
    let current = state.store.get(id).await?;
    let input = patch.apply(current.input());
    state.validate(&input).await?;
    let accommodation = state.store.update(id, &input).await?;
    tracing::info!(accommodation_id = id, "accommodation updated");
    Ok(Flash::updated("Accommodation updated successfully.", accommodation))
}

async fn destroy(
    State(state): State<AccommodationsState>,
    Path(id): Path<i64>,
) -> Result<Flash<()>, AppError> {
    state.store.delete(id).await?;
    tracing::info!(accommodation_id = id, "accommodation deleted");
    Ok(Flash::message("Accommodation deleted successfully."))
}

/// Create a new instance of the accommodations module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(AccommodationsModule::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{
        accommodations::models::sample_lodge, destinations::models::sample_input,
        test_support::TestApp,
    };
    use axum::http::StatusCode;

    async fn destination(app: &TestApp, name: &str) -> i64 {
        let (_, body) = app
            .post("/admin/destinations", &sample_input(name, "Wildlife"))
            .await;
        body["data"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn destination_lookup_returns_linked_lodges_only() {
        let app = TestApp::new().await;
        let serengeti = destination(&app, "Serengeti").await;
        let ngorongoro = destination(&app, "Ngorongoro").await;
        app.post("/admin/accommodations", &sample_lodge("Kati Kati", vec![serengeti]))
            .await;
        app.post("/admin/accommodations", &sample_lodge("Crater Lodge", vec![ngorongoro]))
            .await;

        let (status, body) = app
            .get(&format!("/api/accommodations/destination/{serengeti}"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Kati Kati");

        let (_, all) = app.get("/api/accommodations").await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_destination_is_a_field_error() {
        let app = TestApp::new().await;
        let (status, body) = app
            .post("/admin/accommodations", &sample_lodge("Ghost Camp", vec![999]))
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["field"], "destination_ids");
        let (_, listing) = app.get("/admin/accommodations").await;
        assert_eq!(listing["total"], 0);
    }

    #[tokio::test]
    async fn edit_and_delete_round_trip() {
        let app = TestApp::new().await;
        let (_, created) = app
            .post("/admin/accommodations", &sample_lodge("Kati Kati", vec![]))
            .await;
        let id = created["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .put(&format!("/admin/accommodations/{id}"), &json!({ "rating": 3.5 }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rating"], 3.5);
        assert_eq!(body["data"]["name"], "Kati Kati");

        let (status, body) = app.delete(&format!("/admin/accommodations/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flash"], "Accommodation deleted successfully.");

        let (status, _) = app.delete(&format!("/admin/accommodations/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
