use std::sync::Arc;

use clap::Parser;
use migration::{Migrator, MigratorTrait};
use tokio_util::sync::CancellationToken;

mod settings;

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Telegram expense tracker")]
struct Args {
    /// Settings file (TOML, YAML, JSON...). Defaults to `settings.*` if present.
    #[arg(long, env = "TALLY_SETTINGS")]
    settings: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let settings = settings::Settings::new(args.settings.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let database = sea_orm::Database::connect(settings.database.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!(database = ?settings.database, "database ready");

    let engine = engine::Engine::builder()
        .storage(Arc::new(engine::SqliteStorage::new(database)))
        .timezone(settings.timezone()?)
        .currency(settings.app.currency)
        .build()?;

    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram.token)
        .engine(Arc::new(engine))
        .queue_capacity(settings.dispatcher.queue_capacity)
        .workers(settings.dispatcher.workers)
        .event_timeout(settings.dispatcher.event_timeout())
        .build()?;

    let cancel = CancellationToken::new();
    let handle = bot.run(cancel.clone())?;

    tokio::select! {
        _ = shutdown_signal() => tracing::info!("shutdown requested"),
        _ = handle.stopped() => tracing::warn!("dispatcher stopped on its own"),
    }
    cancel.cancel();

    let timeout = settings.dispatcher.shutdown_timeout();
    if let Err(err) = handle.shutdown(timeout).await {
        tracing::warn!("{err}, exiting with events still in flight");
    }

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
