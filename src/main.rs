mod cli;

use reelhouse::{catalog, config, server, watch};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Settings from file and environment, with CLI flags on top.
fn resolve_config(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<config::Config> {
    let mut config = config::load_config_or_default(config_path)?;
    config::apply_env_overrides(&mut config)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    config::validate_config(&config)?;
    Ok(config)
}

async fn start_server(config: config::Config) -> Result<()> {
    tracing::info!("Starting reelhouse server");
    tracing::info!(
        media_root = %config.media.root.display(),
        library = %config.media.library_config.display(),
        lan_only = config.server.lan_only,
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let store = Arc::new(catalog::CatalogStore::from_config(&config.media));

    // A broken library must not keep the server from starting; endpoints
    // report the error until the file is fixed and reloaded.
    {
        let store = store.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || store.reload())
            .await
            .context("Initial library load panicked")?
        {
            tracing::warn!("Starting without a library: {}", e);
        }
    }

    let cancel = CancellationToken::new();

    let mut watcher = watch::ConfigWatcher::new(config.watch.clone(), store.clone());
    if let Err(e) = watcher.start(cancel.clone()) {
        tracing::warn!("Library watcher not started: {:#}", e);
    }

    let server_result = server::start_server(config, store, cancel.clone()).await;

    // Cleanup
    tracing::info!("Shutting down...");
    cancel.cancel();
    watcher.stop().await;

    server_result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelhouse=trace,reelhouse_common=debug,tower_http=debug".to_string()
        } else {
            "reelhouse=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = resolve_config(cli.config.as_deref(), host, port)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(config))
        }
        Commands::Validate { library } => {
            let config = resolve_config(cli.config.as_deref(), None, None)?;
            validate_library(library.as_deref(), &config)
        }
        Commands::Version => {
            println!("reelhouse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_library(path: Option<&Path>, config: &config::Config) -> Result<()> {
    let path = path.unwrap_or(&config.media.library_config);
    println!("Validating library: {:?}", path);

    let catalog = catalog::load_catalog(path, None)
        .with_context(|| format!("Library {:?} is invalid", path))?;

    let series = catalog
        .collections()
        .iter()
        .filter(|c| matches!(c.kind, catalog::CollectionKind::Series { .. }))
        .count();
    let movies = catalog.collections().len() - series;

    println!("✓ Library is valid");
    println!("  Collections: {}", catalog.collections().len());
    println!("    Series: {}", series);
    println!("    Movies: {}", movies);
    println!("  Referenced files: {}", catalog.file_count());

    let root = &config.media.root;
    if root.is_dir() {
        let audit = catalog::audit_files(&catalog, root);
        if audit.missing.is_empty() {
            println!("  All {} files present under {:?}", audit.checked, root);
        } else {
            println!(
                "  Missing files: {} of {} under {:?}",
                audit.missing.len(),
                audit.checked,
                root
            );
            for missing in &audit.missing {
                println!("    - {}", missing);
            }
        }
    } else {
        println!("  Media root {:?} not found, skipping file check", root);
    }

    Ok(())
}
