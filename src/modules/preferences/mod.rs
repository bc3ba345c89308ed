//! Per-page layout preferences for the back office.

pub mod models;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Router};
use savanna_db::Database;
use savanna_http::{
    extract::{Json, Path},
    openapi, AppError,
};
use savanna_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use models::{AdminPage, LayoutMode, LayoutPreference, Listing};
pub use store::PreferenceStore;

use models::SetLayout;

pub struct PreferencesModule {
    store: PreferenceStore,
}

impl PreferencesModule {
    pub fn new(db: Database) -> Self {
        Self {
            store: PreferenceStore::new(db),
        }
    }
}

#[async_trait]
impl Module for PreferencesModule {
    fn name(&self) -> &'static str {
        "preferences"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "preferences module initialized");
        Ok(())
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/layout", get(list_layouts))
                .route("/layout/{page}", get(get_layout).put(set_layout))
                .with_state(self.store.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let pages: Vec<&str> = AdminPage::ALL.iter().map(|page| page.as_str()).collect();
        Some(json!({
            "paths": {
                "/admin/preferences/layout": {
                    "get": {
                        "summary": "Layout mode of every admin list page",
                        "tags": ["Preferences"],
                        "responses": {
                            "200": openapi::json_response("Layout preferences", openapi::array_of("LayoutPreference"))
                        }
                    }
                },
                "/admin/preferences/layout/{page}": {
                    "get": {
                        "summary": "Layout mode of one admin list page",
                        "tags": ["Preferences"],
                        "parameters": [{ "name": "page", "in": "path", "required": true, "schema": { "type": "string" } }],
                        "responses": {
                            "200": openapi::json_response("Layout preference", openapi::schema_ref("LayoutPreference")),
                            "404": openapi::error_response("Unknown page")
                        }
                    },
                    "put": {
                        "summary": "Persist the layout mode of one admin list page",
                        "tags": ["Preferences"],
                        "parameters": [{ "name": "page", "in": "path", "required": true, "schema": { "type": "string" } }],
                        "requestBody": openapi::json_body("SetLayout"),
                        "responses": {
                            "200": openapi::json_response("Saved preference", openapi::schema_ref("LayoutPreference")),
                            "404": openapi::error_response("Unknown page")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "LayoutPreference": {
                        "type": "object",
                        "properties": {
                            "page": { "type": "string", "enum": pages },
                            "mode": { "type": "string", "enum": ["grid", "table"] }
                        },
                        "required": ["page", "mode"]
                    },
                    "SetLayout": {
                        "type": "object",
                        "properties": { "mode": { "type": "string", "enum": ["grid", "table"] } },
                        "required": ["mode"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE layout_preferences (
                    page TEXT PRIMARY KEY NOT NULL,
                    mode TEXT NOT NULL CHECK (mode IN ('grid', 'table'))
                );
            "#,
        }]
    }
}

fn parse_page(page: &str) -> Result<AdminPage, AppError> {
    page.parse::<AdminPage>()
        .map_err(|_| AppError::not_found(format!("no admin page named '{page}'")))
}

async fn list_layouts(
    State(store): State<PreferenceStore>,
) -> Result<Json<Vec<LayoutPreference>>, AppError> {
    Ok(Json(store.all().await?))
}

async fn get_layout(
    State(store): State<PreferenceStore>,
    Path(page): Path<String>,
) -> Result<Json<LayoutPreference>, AppError> {
    let page = parse_page(&page)?;
    let mode = store.layout(page).await?;
    Ok(Json(LayoutPreference { page, mode }))
}

async fn set_layout(
    State(store): State<PreferenceStore>,
    Path(page): Path<String>,
    Json(body): Json<SetLayout>,
) -> Result<Json<LayoutPreference>, AppError> {
    let page = parse_page(&page)?;
    let saved = store.set_layout(page, body.mode).await?;
    tracing::info!(page = %page, mode = %body.mode, "layout preference saved");
    Ok(Json(saved))
}

/// Create the preferences module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(PreferencesModule::new(db))
}

#[cfg(test)]
mod tests {
    use crate::modules::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn layout_defaults_to_grid_and_persists() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/admin/preferences/layout/bookings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "page": "bookings", "mode": "grid" }));

        let (status, _) = app
            .put("/admin/preferences/layout/bookings", &json!({ "mode": "table" }))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, listing) = app.get("/admin/bookings").await;
        assert_eq!(listing["layout"], "table");
        let (_, listing) = app.get("/admin/messages").await;
        assert_eq!(listing["layout"], "grid");
    }

    #[tokio::test]
    async fn unknown_page_is_404() {
        let app = TestApp::new().await;
        let (status, _) = app.get("/admin/preferences/layout/invoices").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
