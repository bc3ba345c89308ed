//! Customer directory, computed from bookings on every read.

pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Router};
use savanna_db::Database;
use savanna_http::{
    extract::{Json, Query},
    openapi, AppError,
};
use savanna_kernel::Module;
use serde_json::json;

use crate::modules::bookings::BookingStore;
use crate::modules::preferences::{AdminPage, Listing, PreferenceStore};
use crate::utils::filter::ListFilter;

pub use models::{aggregate, Customer};

#[derive(Clone)]
struct CustomersState {
    bookings: BookingStore,
    layouts: PreferenceStore,
}

pub struct CustomersModule {
    state: CustomersState,
}

impl CustomersModule {
    pub fn new(db: Database) -> Self {
        Self {
            state: CustomersState {
                bookings: BookingStore::new(db.clone()),
                layouts: PreferenceStore::new(db),
            },
        }
    }
}

#[async_trait]
impl Module for CustomersModule {
    fn name(&self) -> &'static str {
        "customers"
    }

    fn admin_routes(&self) -> Option<Router> {
        Some(
            Router::new()
                .route("/", get(list))
                .with_state(self.state.clone()),
        )
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/admin/customers": {
                    "get": {
                        "summary": "Customers derived from bookings",
                        "tags": ["Customers"],
                        "parameters": [
                            openapi::query_param("search", "Substring of name or email"),
                            openapi::query_param("country", "Exact country")
                        ],
                        "responses": {
                            "200": openapi::json_response("Listing", json!({ "type": "object" }))
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Customer": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "email": { "type": "string" },
                            "phone": { "type": "string" },
                            "country": { "type": "string" },
                            "bookings_count": { "type": "integer" },
                            "first_booking": { "type": "string", "format": "date-time" },
                            "last_booking": { "type": "string", "format": "date-time" }
                        }
                    }
                }
            }
        }))
    }
}

async fn list(
    State(state): State<CustomersState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Listing<Customer>>, AppError> {
    let layout = state.layouts.layout(AdminPage::Customers).await?;
    let bookings = state.bookings.list().await?;
    let customers = filter.apply(aggregate(&bookings));
    Ok(Json(Listing::new(layout, customers)))
}

/// Create a new instance of the customers module
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(CustomersModule::new(db))
}

#[cfg(test)]
mod tests {
    use crate::modules::{bookings::models::sample_booking, test_support::TestApp};
    use crate::utils::clock;
    use axum::http::StatusCode;
    use chrono::Days;

    #[tokio::test]
    async fn repeat_bookers_appear_once() {
        let app = TestApp::new().await;
        let date = clock::today().checked_add_days(Days::new(10)).unwrap();
        app.post("/bookings", &sample_booking("Amina", "amina@example.com", date)).await;
        app.post("/bookings", &sample_booking("Amina J", "Amina@Example.com", date)).await;
        let mut oliver = sample_booking("Oliver", "oliver@example.co.uk", date);
        oliver.country = "United Kingdom".into();
        app.post("/bookings", &oliver).await;

        let (status, body) = app.get("/admin/customers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layout"], "grid");
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"][0]["name"], "Amina");
        assert_eq!(body["items"][0]["bookings_count"], 2);

        let (_, body) = app.get("/admin/customers?country=United%20Kingdom").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["email"], "oliver@example.co.uk");
    }
}
