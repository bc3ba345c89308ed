use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use savanna_app::{
    console::{desk, ConfirmPrompt},
    modules::bookings::{BookingStatus, BookingStore},
    App,
};
use savanna_db::Database;
use savanna_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "savanna", version, about = "Safari site and back office")]
struct Cli {
    /// Directory holding base.toml and the per-environment overlays
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to apply (local, staging, production)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate, then serve HTTP until interrupted (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the merged OpenAPI document to stdout
    Openapi,
    /// Set a booking's status (pending, confirmed, cancelled)
    BookingStatus { id: i64, status: BookingStatus },
    /// Delete a booking after confirmation
    DeleteBooking {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl Cli {
    /// Flags override `SAVANNA_CONFIG_DIR` and `SAVANNA_ENV`.
    fn settings(&self) -> anyhow::Result<Settings> {
        if self.config_dir.is_none() && self.env.is_none() {
            return Settings::load().with_context(|| "failed to load savanna settings");
        }
        let dir = match (&self.config_dir, std::env::var("SAVANNA_CONFIG_DIR")) {
            (Some(dir), _) => dir.clone(),
            (None, Ok(dir)) => PathBuf::from(dir),
            (None, Err(_)) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };
        let env = match &self.env {
            Some(env) => env.clone(),
            None => std::env::var("SAVANNA_ENV").unwrap_or_else(|_| "local".to_string()),
        };
        Settings::load_from(&dir, &env).with_context(|| "failed to load savanna settings")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            savanna_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "savanna serve");
            App::bootstrap(settings).await?.serve().await
        }
        Command::Migrate => {
            savanna_telemetry::init(&settings.telemetry)?;
            let applied = App::bootstrap(settings).await?.migrate().await?;
            tracing::info!(applied, "savanna migrate finished");
            Ok(())
        }
        Command::Openapi => {
            // No database is touched; modules only need a handle to describe themselves.
            let db = Database::in_memory().await?;
            let app = App::with_database(settings, db);
            let document = savanna_http::openapi::document(app.registry());
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Command::BookingStatus { id, status } => {
            let store = booking_store(settings).await?;
            let (status, written) = desk::set_booking_status(&store, id, status).await?;
            if written {
                println!("Booking {id} is now {status}.");
            } else {
                println!("Booking {id} is already {status}.");
            }
            Ok(())
        }
        Command::DeleteBooking { id, yes } => {
            let store = booking_store(settings).await?;
            let deleted = desk::delete_booking(&store, id, |prompt| yes || ask(prompt)).await?;
            if deleted {
                println!("Booking deleted successfully.");
            } else {
                println!("Nothing deleted.");
            }
            Ok(())
        }
    }
}

/// Migrated store for the configured database.
async fn booking_store(settings: Settings) -> anyhow::Result<BookingStore> {
    savanna_telemetry::init(&settings.telemetry)?;
    let app = App::bootstrap(settings).await?;
    app.migrate().await?;
    Ok(BookingStore::new(app.database().clone()))
}

/// Shows the prompt on stderr and reads a yes/no answer from stdin; anything
/// but `y` or `yes` declines.
fn ask(prompt: &ConfirmPrompt) -> bool {
    let mut stderr = std::io::stderr();
    let _ = write!(
        stderr,
        "{}\n{}\n{}? [y/N] ",
        prompt.title, prompt.message, prompt.confirm_label
    );
    let _ = stderr.flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
