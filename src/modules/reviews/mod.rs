//! Testimonials: public submission, featured list, back office moderation.

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
use savanna_kernel::{Migration, Module};
use serde_json::json;

use crate::modules::preferences::{AdminPage, Listing, PreferenceStore};
use crate::utils::filter::ListFilter;

pub use models::{NewReview, Review, SetFeatured};
pub use store::ReviewStore;

#[derive(Clone)]
struct ReviewsState {
    store: ReviewStore,
    layouts: PreferenceStore,
}

pub struct ReviewsModule {
    state: ReviewsState,
}

impl ReviewsModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: ReviewsState {
                store: ReviewStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/featured", get(featured))
                .with_state(self.state.clone()),
        )
    }

    fn site_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/reviews", post(submit))
                .with_state(self.state.clone()),
        )
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list))
                .route("/{id}", get(show).delete(destroy))
                .route("/{id}/featured", put(set_featured))
                .with_state(self.state.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/reviews": {
                    "post": {
                        "summary": "Submit a testimonial",
                        "tags": ["Reviews"],
                        "requestBody": openapi::json_body("NewReview"),
                        "responses": {
                            "201": openapi::json_response("Review received", json!({ "type": "object" })),
                            "422": openapi::error_response("Validation error")
                        }
                    }
                },
                "/api/reviews/featured": {
                    "get": {
                        "summary": "Featured testimonials",
                        "tags": ["Reviews"],
                        "responses": {
                            "200": openapi::json_response("Reviews", openapi::array_of("Review"))
                        }
                    }
                },
                "/admin/reviews": {
                    "get": {
                        "summary": "All reviews with the page layout",
                        "tags": ["Reviews"],
                        "parameters": [
                            openapi::query_param("search", "Substring of name, email or review text"),
                            openapi::query_param("status", "featured or regular")
                        ],
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    }
                },
                "/admin/reviews/{id}": {
                    "get": {
                        "summary": "Review detail",
                        "tags": ["Reviews"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Review", openapi::schema_ref("Review")),
                            "404": openapi::error_response("Review not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a review",
                        "tags": ["Reviews"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Deleted", json!({ "type": "object" })),
                            "404": openapi::error_response("Review not found")
                        }
                    }
                },
                "/admin/reviews/{id}/featured": {
                    "put": {
                        "summary": "Set the featured flag; no other field changes",
                        "tags": ["Reviews"],
                        "parameters": [openapi::id_param("id")],
                        "requestBody": openapi::json_body("SetFeatured"),
                        "responses": {
                            "200": openapi::json_response("Updated", json!({ "type": "object" })),
                            "404": openapi::error_response("Review not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "NewReview": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "review": { "type": "string" }
                        },
                        "required": ["name", "email", "rating", "review"]
                    },
                    "Review": {
                        "allOf": [
                            openapi::schema_ref("NewReview"),
                            {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "integer", "format": "int64" },
                                    "is_featured": { "type": "boolean" },
                                    "created_at": { "type": "string", "format": "date-time" }
                                },
                                "required": ["id", "is_featured", "created_at"]
                            }
                        ]
                    },
                    "SetFeatured": {
                        "type": "object",
                        "properties": { "is_featured": { "type": "boolean" } },
                        "required": ["is_featured"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE reviews (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    review TEXT NOT NULL,
                    is_featured BOOLEAN NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );
            "#,
        }]
    }
}

async fn submit(
    State(state): State<ReviewsState>,
    Json(review): Json<NewReview>,
) -> Result<Flash<Review>, AppError> {
    review.validate()?;
    let review = state.store.create(&review).await?;
    tracing::info!(review_id = review.id, rating = review.rating, "review received");
    Ok(Flash::created("Thank you for sharing your experience!", review))
}

async fn featured(State(state): State<ReviewsState>) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.store.featured().await?))
}

async fn list(
    State(state): State<ReviewsState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<Review>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Reviews).await?;
    let items = filter.apply(state.store.list().await?);
    Ok(Json(Listing::new(layout, items)))
}

async fn show(
    State(state): State<ReviewsState>,
    Path(id): Path<i64>,
) -> Result<Json<Review>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

async fn set_featured(
    State(state): State<ReviewsState>,
    Path(id): Path<i64>,
    Json(body): Json<SetFeatured>,
) -> Result<Flash<Review>, AppError> {
    let review = state.store.set_featured(id, body.is_featured).await?;
    tracing::info!(review_id = id, is_featured = body.is_featured, "review featured flag set");
    let message = if review.is_featured {
        "Review featured successfully."
    } else {
        "Review unfeatured successfully."
    };
    Ok(Flash::updated(message, review))
}

async fn destroy(
    State(state): State<ReviewsState>,
    Path(id): Path<i64>,
) -> Result<Flash<()>, AppError> {
    state.store.delete(id).await?;
    tracing::info!(review_id = id, "review deleted");
    Ok(Flash::message("Review deleted successfully."))
}

/// Create a new instance of the reviews module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(db))
}
