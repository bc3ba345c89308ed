//! Contact inbox: the public contact form and the back office inbox.

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

pub use models::{Message, MessageStatus, NewMessage, UpdateMessageStatus};
pub use store::MessageStore;

#[derive(Clone)]
struct MessagesState {
    store: MessageStore,
    layouts: PreferenceStore,
}

pub struct MessagesModule {
    state: MessagesState,
}

impl MessagesModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: MessagesState {
                store: MessageStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for MessagesModule {
    fn name(&self) -> &'static str {
        "messages"
    }

    fn site_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/contact", post(submit))
                .with_state(self.state.clone()),
        )
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list))
                .route("/{id}", get(open).delete(destroy))
                .route("/{id}/status", put(update_status))
                .with_state(self.state.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/contact": {
                    "post": {
                        "summary": "Submit the contact form",
                        "tags": ["Messages"],
                        "requestBody": openapi::json_body("NewMessage"),
                        "responses": {
                            "201": openapi::json_response("Message received", json!({ "type": "object" })),
                            "422": openapi::error_response("Validation error")
                        }
                    }
                },
                "/admin/messages": {
                    "get": {
                        "summary": "Inbox with the page layout",
                        "tags": ["Messages"],
                        "parameters": [
                            openapi::query_param("search", "Substring of name, email, subject or message"),
                            openapi::query_param("status", "unread, read or replied")
                        ],
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    }
                },
                "/admin/messages/{id}": {
                    "get": {
                        "summary": "Open a message; an unread message becomes read",
                        "tags": ["Messages"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Message", openapi::schema_ref("Message")),
                            "404": openapi::error_response("Message not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a message",
                        "tags": ["Messages"],
                        "parameters": [openapi::id_param("id")],
                        "responses": {
                            "200": openapi::json_response("Deleted", json!({ "type": "object" })),
                            "404": openapi::error_response("Message not found")
                        }
                    }
                },
                "/admin/messages/{id}/status": {
                    "put": {
                        "summary": "Overwrite the message status",
                        "tags": ["Messages"],
                        "parameters": [openapi::id_param("id")],
                        "requestBody": openapi::json_body("UpdateMessageStatus"),
                        "responses": {
                            "200": openapi::json_response("Updated", json!({ "type": "object" })),
                            "404": openapi::error_response("Message not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "NewMessage": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string", "format": "email" },
                            "contact_number": { "type": "string", "nullable": true },
                            "adults": { "type": "integer", "minimum": 1 },
                            "children": { "type": "integer", "minimum": 0 },
                            "subject": { "type": "string" },
                            "message": { "type": "string" }
                        },
                        "required": ["name", "email", "subject", "message"]
                    },
                    "Message": {
                        "allOf": [
                            openapi::schema_ref("NewMessage"),
                            {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "integer", "format": "int64" },
                                    "status": { "type": "string", "enum": ["unread", "read", "replied"] },
                                    "created_at": { "type": "string", "format": "date-time" }
                                },
                                "required": ["id", "status", "created_at"]
                            }
                        ]
                    },
                    "UpdateMessageStatus": {
                        "type": "object",
                        "properties": {
                            "status": { "type": "string", "enum": ["unread", "read", "replied"] }
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
                CREATE TABLE messages (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    contact_number TEXT,
                    adults INTEGER NOT NULL CHECK (adults >= 1),
                    children INTEGER NOT NULL CHECK (children >= 0),
                    subject TEXT NOT NULL,
                    message TEXT NOT NULL,
                    status TEXT NOT NULL CHECK (status IN ('unread', 'read', 'replied')),
                    created_at TEXT NOT NULL
                );
                CREATE INDEX messages_status ON messages(status);
            "#,
        }]
    }
}

async fn submit(
    State(state): State<MessagesState>,
    Json(message): Json<NewMessage>,
) -> Result<Flash<Message>, AppError> {
    message.validate()?;
    let message = state.store.create(&message).await?;
    tracing::info!(message_id = message.id, "contact message received");
    Ok(Flash::created(
        "Thank you for your message. We will get back to you soon.",
        message,
    ))
}

async fn list(
    State(state): State<MessagesState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<Message>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Messages).await?;
    let items = filter.apply(state.store.list().await?);
    Ok(Json(Listing::new(layout, items)))
}

async fn open(
    State(state): State<MessagesState>,
    Path(id): Path<i64>,
) -> Result<Json<Message>, AppError> {
    let (message, transitioned) = state.store.open(id).await?;
    if transitioned {
        tracing::info!(message_id = id, "message marked read");
    }
    Ok(Json(message))
}

async fn update_status(
    State(state): State<MessagesState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMessageStatus>,
) -> Result<Flash<Message>, AppError> {
    let message = state.store.set_status(id, body.status).await?;
    tracing::info!(message_id = id, status = %body.status, "message status updated");
    Ok(Flash::updated("Message status updated successfully.", message))
}

async fn destroy(
    State(state): State<MessagesState>,
    Path(id): Path<i64>,
) -> Result<Flash<()>, AppError> {
    state.store.delete(id).await?;
    tracing::info!(message_id = id, "message deleted");
    Ok(Flash::message("Message deleted successfully."))
}

/// Create a new instance of the messages module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(MessagesModule::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{messages::models::sample_message, test_support::TestApp};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn opening_marks_read_once() {
        let app = TestApp::new().await;
        let (status, created) = app
            .post("/contact", &sample_message("Oliver", "Family safari"))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["status"], "unread");
        let id = created["data"]["id"].as_i64().unwrap();

        let (_, unread) = app.get("/admin/messages?status=unread").await;
        assert_eq!(unread["total"], 1);

        let (status, opened) = app.get(&format!("/admin/messages/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(opened["status"], "read");

        app.put(&format!("/admin/messages/{id}/status"), &json!({ "status": "replied" }))
            .await;
        let (_, reopened) = app.get(&format!("/admin/messages/{id}")).await;
        assert_eq!(reopened["status"], "replied");

        let (_, unread) = app.get("/admin/messages?status=unread").await;
        assert_eq!(unread["total"], 0);
    }

    #[tokio::test]
    async fn contact_form_requires_an_adult() {
        let app = TestApp::new().await;
        let mut message = sample_message("Oliver", "Family safari");
        message.adults = 0;

        let (status, body) = app.post("/contact", &message).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["field"], "adults");
    }

    #[tokio::test]
    async fn missing_message_is_404() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/admin/messages/41").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }
}
