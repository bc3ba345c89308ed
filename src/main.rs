use anyhow::Context;
use savanna_app::App;
use savanna_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load savanna settings")?;
    savanna_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "savanna-app bootstrap starting"
    );

    App::bootstrap(settings).await?.serve().await
}
