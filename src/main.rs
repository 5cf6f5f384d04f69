mod book;
mod config;
mod errors;
mod format;
mod import;
mod models;
mod run;
mod store;
mod sync;

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::book::{BookOptions, JarBook};
use crate::config::{AppConfig, ProjectPaths, StoreKind};
use crate::store::{JarStore, JsonFileStore, KvStore};
use crate::sync::SharedContainer;

const KV_FILE: &str = "jars.db";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let paths = ProjectPaths::discover()?;
    let app_config = AppConfig::load(&paths.config_file)?;
    setup_logging(&app_config.log_level);

    let data_dir = app_config.resolve_data_dir(&paths.data_dir);
    let shared_dir = app_config.resolve_shared_dir(&data_dir);
    tracing::debug!(
        config = %paths.config_file.display(),
        data = %data_dir.display(),
        shared = %shared_dir.display(),
        "resolved paths"
    );

    // The widget side only ever sees the shared container.
    if args.get(1).map(String::as_str) == Some("widget") {
        return run::as_widget(&args[2..], &shared_dir);
    }

    let mut book = open_book(&app_config, &data_dir, &shared_dir)?;
    run::as_cli(&args, &mut book)
}

fn open_book(app_config: &AppConfig, data_dir: &Path, shared_dir: &Path) -> Result<JarBook> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let store: Box<dyn JarStore> = match app_config.store {
        StoreKind::Json => Box::new(
            JsonFileStore::open(data_dir).context("Failed to open jar file store")?,
        ),
        StoreKind::Sqlite => Box::new(
            KvStore::open(&data_dir.join(KV_FILE)).context("Failed to open jar database")?,
        ),
    };
    let container = SharedContainer::open(shared_dir).with_context(|| {
        format!("Failed to create shared directory: {}", shared_dir.display())
    })?;

    Ok(JarBook::open(
        store,
        Box::new(container),
        BookOptions {
            history_limit: app_config.history_limit,
        },
    ))
}

fn setup_logging(default_level: &str) {
    // stdout carries command output and exports, so logs go to stderr.
    let filter = EnvFilter::try_from_env(config::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
