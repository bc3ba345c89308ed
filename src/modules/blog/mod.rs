//! Blog: published posts on the public site, authoring in the back office.

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

pub use models::{BlogPost, BlogPostInput, BlogPostPatch, PostStatus, PostTags};
pub use store::BlogStore;

#[derive(Clone)]
struct BlogState {
    store: BlogStore,
    layouts: PreferenceStore,
}

pub struct BlogModule {
    state: BlogState,
}

impl BlogModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: BlogState {
                store: BlogStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for BlogModule {
    fn name(&self) -> &'static str {
        "blog"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "blog module initialized");
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
            openapi::query_param("search", "Substring of title or excerpt"),
            openapi::query_param("category", "Exact category"),
            openapi::query_param("tag", "Exact tag")
        ]);
        Some(json!({
            "paths": {
                "/api/blog": {
                    "get": {
                        "summary": "Published posts",
                        "tags": ["Blog"],
                        "parameters": filters.clone(),
                        "responses": {
                            "200": openapi::json_response("Posts", openapi::array_of("BlogPost"))
                        }
                    }
                },
                "/api/blog/{id}": {
                    "get": {
                        "summary": "One published post",
                        "tags": ["Blog"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Post", openapi::schema_ref("BlogPost")),
                            "404": openapi::error_response("Post not found or not published")
                        }
                    }
                },
                "/admin/blog": {
                    "get": {
                        "summary": "All posts with the page layout",
                        "tags": ["Blog"],
                        "parameters": filters,
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    },
                    "post": {
                        "summary": "Create a post",
                        "tags": ["Blog"],
                        "requestBody": openapi::json_body("BlogPostInput"),
                        "responses": {
                            "201": openapi::json_response("Created", json!({ "type": "object" })),
                            "422": openapi::error_response("Validation error")
                        }
                    }
                },
                "/admin/blog/{id}": {
                    "get": {
                        "summary": "Post detail, drafts included",
                        "tags": ["Blog"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Post", openapi::schema_ref("BlogPost")),
                            "404": openapi::error_response("Post not found")
                        }
                    },
                    "put": {
                        "summary": "Edit a post; absent fields are unchanged",
                        "tags": ["Blog"],
                        "parameters": [openapi::id_param("id")],
                        "requestBody": openapi::json_body("BlogPostInput"),
                        "responses": {
                            "200": openapi::json_response("Updated", json!({ "type": "object" })),
                            "404": openapi::error_response("Post not found"),
                            "422": openapi::error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a post",
                        "tags": ["Blog"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Deleted", json!({ "type": "object" })),
                            "404": openapi::error_response("Post not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BlogPostInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "excerpt": { "type": "string" },
                            "content": { "type": "string", "description": "HTML" },
                            "category": { "type": "string" },
                            "author": { "type": "string" },
                            "read_time": { "type": "string", "description": "Estimated from content when blank" },
                            "status": { "type": "string", "enum": ["draft", "published"] },
                            "image_url": { "type": "string", "nullable": true },
                            "tags": {
                                "oneOf": [
                                    { "type": "array", "items": { "type": "string" } },
                                    { "type": "string", "description": "Comma-separated" }
                                ]
                            }
                        },
                        "required": ["title", "excerpt", "content", "category", "author"]
                    },
                    "BlogPost": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "excerpt": { "type": "string" },
                            "content": { "type": "string" },
                            "category": { "type": "string" },
                            "author": { "type": "string" },
                            "read_time": { "type": "string" },
                            "status": { "type": "string", "enum": ["draft", "published"] },
                            "image_url": { "type": "string", "nullable": true },
                            "tags": { "type": "array", "items": { "type": "string" } },
                            "created_at": { "type": "string", "format": "date-time" }
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
                CREATE TABLE blog_posts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL CHECK (title != ''),
                    excerpt TEXT NOT NULL,
                    content TEXT NOT NULL,
                    category TEXT NOT NULL,
                    author TEXT NOT NULL,
                    read_time TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('draft', 'published')),
                    image_url TEXT,
                    tags TEXT NOT NULL DEFAULT '[]',
                    created_at TEXT NOT NULL
                );
                CREATE INDEX blog_posts_status ON blog_posts(status);
            "#,
        }]
    }
}

async fn list_public(
    State(state): State<BlogState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<BlogPost>>, AppError> {
    let filter = filter.status(PostStatus::Published.as_str());
    Ok(Json(filter.apply(state.store.list().await?)))
}

async fn show_public(
    State(state): State<BlogState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, AppError> {
    let post = state.store.get(id).await?;
    if post.status != PostStatus::Published {
        return Err(AppError::not_found(format!("blog post {id} not found")));
    }
    Ok(Json(post))
}

async fn list_admin(
    State(state): State<BlogState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<BlogPost>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Blog).await?;
    let items = filter.apply(state.store.list().await?);
    Ok(Json(Listing::new(layout, items)))
}

async fn show_admin(
    State(state): State<BlogState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

async fn create(
    State(state): State<BlogState>,
    Json(input): Json<BlogPostInput>,
) -> Result<Flash<BlogPost>, AppError> {
    input.validate()?;
    let post = state.store.create(&input).await?;
    tracing::info!(post_id = post.id, status = %post.status, "blog post created");
    Ok(Flash::created("Blog post created successfully.", post))
}

async fn update(
    State(state): State<BlogState>,
    Path(id): Path<i64>,
    Json(patch): Json<BlogPostPatch>,
) -> Result<Flash<BlogPost>, AppError> {
    let current = state.store.get(id).await?;
    let input = patch.apply(current.input());
    input.validate()?;
    let post = state.store.update(id, &input).await?;
    tracing::info!(post_id = id, "blog post updated");
    Ok(Flash::updated("Blog post updated successfully.", post))
}

async fn destroy(
    State(state): State<BlogState>,
    Path(id): Path<i64>,
) -> Result<Flash<()>, AppError> {
    state.store.delete(id).await?;
    tracing::info!(post_id = id, "blog post deleted");
    Ok(Flash::message("Blog post deleted successfully."))
}

/// Create a new instance of the blog module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(BlogModule::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{blog::models::sample_post, test_support::TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn drafts_stay_off_the_public_site() {
        let app = TestApp::new().await;
        let (_, draft) = app
            .post("/admin/blog", &sample_post("Packing list", PostStatus::Draft))
            .await;
        app.post("/admin/blog", &sample_post("Great Migration", PostStatus::Published))
            .await;

        let (status, body) = app.get("/api/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Great Migration");

        let draft_id = draft["data"]["id"].as_i64().unwrap();
        let (status, _) = app.get(&format!("/api/blog/{draft_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.get(&format!("/admin/blog/{draft_id}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn comma_separated_tags_are_split_and_filterable() {
        let app = TestApp::new().await;
        let (status, created) = app
            .post(
                "/admin/blog",
                &json!({
                    "title": "Birding in Tarangire",
                    "excerpt": "Over 500 species",
                    "content": "<p>Hornbills everywhere.</p>",
                    "category": "Wildlife",
                    "author": "Neema",
                    "status": "published",
                    "tags": "birds, tarangire"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["flash"], "Blog post created successfully.");
        assert_eq!(created["data"]["tags"], json!(["birds", "tarangire"]));
        assert_eq!(created["data"]["read_time"], "1 min read");

        let (_, body) = app.get("/api/blog?tag=birds").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        let (_, body) = app.get("/api/blog?tag=Birds").await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publishing_an_edit_keeps_other_fields() {
        let app = TestApp::new().await;
        let (_, created) = app
            .post("/admin/blog", &sample_post("Packing list", PostStatus::Draft))
            .await;
        let id = created["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .put(&format!("/admin/blog/{id}"), &json!({ "status": "published" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "published");
        assert_eq!(body["data"]["title"], "Packing list");
        assert_eq!(body["data"]["created_at"], created["data"]["created_at"]);
    }

    #[tokio::test]
    async fn invalid_post_is_rejected_with_field_errors() {
        let app = TestApp::new().await;
        let (status, body) = app.post("/admin/blog", &json!({ "title": "" })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["field"], "title");
        let (_, listing) = app.get("/admin/blog").await;
        assert_eq!(listing["total"], 0);
    }
}
