//! # prazo — Notion deadline reminders on Telegram
//!
//! One invocation is one sync run: fetch the task database, resolve
//! relations, cache what was fetched, and replace today's reminder
//! message with a fresh one.
//!
//! Usage:
//!   prazo                     # sync and dispatch
//!   prazo --verbose           # debug logging
//!   prazo --cache-dir /var/lib/prazo --log-dir /var/log/prazo

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use prazo_channels::{TelegramChannel, dispatch, format};
use prazo_core::{Config, SyncContext};
use prazo_notion::NotionClient;

#[derive(Parser)]
#[command(name = "prazo", version, about = "⏰ prazo — Notion deadline reminders on Telegram")]
struct Cli {
    /// Cache directory
    #[arg(long, default_value = "caches")]
    cache_dir: PathBuf,

    /// Log directory
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if let Err(e) = std::fs::create_dir_all(&cli.log_dir) {
        eprintln!("cannot create log directory {}: {e}", cli.log_dir.display());
        return ExitCode::FAILURE;
    }
    let file_appender = tracing_appender::rolling::daily(&cli.log_dir, "prazo.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("run aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    tracing::info!("prazo v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    config.cache_dir = cli.cache_dir;
    config.log_dir = cli.log_dir;

    let client = NotionClient::new(&config.notion_api_key, &config.notion_database_id);
    client.ping().await?;

    // Frozen for the whole run so day counts agree across workers.
    let today = chrono::Local::now().date_naive();
    let window = config.reminder_window_days;
    let ctx = Arc::new(SyncContext::new(config, today));
    let client = Arc::new(client);

    tracing::info!("fetching task database...");
    let results = client.query_all(ctx.config.page_size).await?;
    tracing::info!("{} records fetched, processing...", results.len());

    let rows = prazo_pipeline::process_all(client, ctx.clone(), results).await;

    prune_old_logs(&ctx.config.log_dir, ctx.config.log_max_age_days);
    ctx.save_caches();

    let fragments: Vec<String> = rows
        .iter()
        .filter(|task| task.is_actionable(window))
        .filter_map(|task| format::render_task(task, window))
        .collect();

    match format::combine(&fragments) {
        Some(body) => {
            tracing::info!("{} task(s) due within {window} day(s)", fragments.len());
            let channel = TelegramChannel::new(&ctx.config.telegram_bot_token);
            dispatch::dispatch_reminder(
                &channel,
                &ctx.config.telegram_chat_id,
                &ctx.dispatch_state,
                &body,
                ctx.today,
            )
            .await;
            dispatch::broadcast_plain(&channel, &ctx.config.telegram_chat_id_wpp, &body).await;
        }
        None => tracing::info!("no task due within {window} day(s); nothing to send"),
    }

    Ok(())
}

/// Remove rotated log files older than `max_age_days`. Best-effort.
fn prune_old_logs(dir: &Path, max_age_days: u64) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let max_age = Duration::from_secs(max_age_days * 24 * 60 * 60);
    for entry in entries.flatten() {
        let path = entry.path();
        if !is_log_file(&path) {
            continue;
        }
        let age = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| SystemTime::now().duration_since(mtime).ok());
        if let Some(age) = age
            && age > max_age
        {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::info!("old log file removed: {}", path.display()),
                Err(e) => tracing::error!("could not remove log {}: {e}", path.display()),
            }
        }
    }
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with("prazo.log"))
}
