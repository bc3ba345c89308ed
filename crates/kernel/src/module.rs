use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Migration definition for modules
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Core module trait that all savanna modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context
    /// Called during application startup after migrations
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Public JSON read routes, mounted under `/api/{module_name}`
    fn routes(&self) -> Option<Router> {
        None
    }

    /// Back office routes, mounted under `/admin/{module_name}`
    fn admin_routes(&self) -> Option<Router> {
        None
    }

    /// Public form submission routes, merged at the site root
    /// (e.g. `POST /bookings`)
    fn site_routes(&self) -> Option<Router> {
        None
    }

    /// Return OpenAPI fragment for this module as JSON.
    /// Paths are absolute; they are merged verbatim with other modules' specs.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Return migrations contributed by this module
    /// Migrations are executed in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Start background tasks for this module
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
