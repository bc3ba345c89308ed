//! Application bootstrap: settings, database, module registry, server.

use anyhow::Context;
use axum::Router;
use savanna_db::Database;
use savanna_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Connect to the configured database and register every module.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .await
            .with_context(|| format!("failed to open database {}", settings.database.url))?;
        Ok(Self::with_database(settings, db))
    }

    pub fn with_database(settings: Settings, db: Database) -> Self {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);
        tracing::info!(
            core = registry.core_module_count(),
            custom = registry.custom_module_count(),
            "modules registered"
        );
        Self {
            settings,
            db,
            registry,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Apply pending migrations; returns how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let applied = self
            .db
            .migrate(&self.registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "migrations complete");
        Ok(applied)
    }

    pub fn router(&self) -> Router {
        savanna_http::build_router(&self.registry, &self.settings)
    }

    /// Migrate, start every module, serve until a shutdown signal, then stop.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.migrate().await?;

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_and_start(&ctx).await?;

        let served =
            savanna_http::start_server(&self.registry, &self.settings, shutdown_signal()).await;
        let stopped = self.registry.shutdown().await;

        served?;
        stopped
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable, waiting for Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("shutdown signal received");
}
