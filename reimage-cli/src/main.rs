use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;

use cli::{Args, Mode};

/// Initialize tracing with two outputs:
/// 1. stderr, so command output on stdout stays machine readable
/// 2. ~/.reimage/reimage.log, appended across runs
fn initialize_tracing() -> Result<WorkerGuard> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,reimage_orchestrations=debug".into());

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let log_dir = PathBuf::from(home).join(".reimage");
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::never(&log_dir, "reimage.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_writer(file_writer).with_ansi(false);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Dropping the guard flushes and stops file logging
    let _guard = initialize_tracing()?;

    match args.mode {
        Mode::Replace {
            identifier,
            tarball,
            disk,
            from_boot_disk,
            disk_size,
            tag,
            address,
            output,
        } => {
            let source = commands::instance::image_source(tarball, disk, from_boot_disk)?;
            commands::instance::run_replace(identifier, source, disk_size, tag, address, output).await
        }
        Mode::Delete { identifier } => commands::instance::run_delete(identifier).await,
        Mode::Disk { identifier, output } => commands::instance::run_disk(identifier, output).await,
        Mode::Find { identifier, tag, output } => commands::instance::run_find(identifier, tag, output).await,
        Mode::Flow { name } => commands::flow::run_flow(name),
    }
}
