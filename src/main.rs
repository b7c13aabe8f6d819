use std::{process, sync::Arc};

use clap::Parser;
use console::style;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use quicknotes::{App, Cli, Config, NoteStorage, Result};

pub fn initialize_logger(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_notes_dir(cli.notes_dir);

    let filter = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    initialize_logger(filter);

    match &config.source {
        Some(path) => info!("Using config file: {}", path.display()),
        None => debug!("No configuration file found, using defaults"),
    }
    debug!("Notes directory: {}", config.notes_dir.display());

    let storage = NoteStorage::open(&config.notes_dir)?;
    for (path, reason) in &storage.last_load().skipped_files {
        warn!("Skipped {}: {}", path.display(), reason);
    }

    let app = App::new(Arc::new(Mutex::new(storage)), config, cli.verbose);
    app.run(cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}
