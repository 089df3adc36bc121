// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod output;
mod progress;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result, anyhow};
use clap::Parser as _;
use indicatif::ProgressBar;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use cli::{Args, Command, build_filter};
use k8scatalog::catalog::{Parser, Resources};
use k8scatalog::config::{self, Config};
use k8scatalog::kubernetes::{ServerSnapshot, SnapshotCache, connect};
use output::CatalogTable;
use progress::create_spinner;

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate daily or at 10MB, keeping 5 files
    let log_path = log_dir.join("k8scatalog.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let (non_blocking, guard) = file_appender.get_non_blocking_appender();
    // Keep the background writer alive for the whole run
    std::mem::forget(guard);

    let filter = if verbose {
        "k8scatalog=debug"
    } else {
        "k8scatalog=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if verbose {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::load()?;
    apply_overrides(&mut config, &args);
    if args.save {
        config.save().context("Failed to save config")?;
        info!(path = ?Config::config_path().ok(), "Saved defaults");
    }

    let catalog = load_catalog(&args, &config).await?;
    let catalog = catalog.filter(&build_filter(&args));

    let table = match args.command.as_ref().unwrap_or(&Command::List) {
        Command::List => CatalogTable::list_view(&catalog),
        Command::Describe { name } => CatalogTable::describe_view(&catalog, name)?,
        Command::HasField { name, path } => CatalogTable::field_view(&catalog, name, path)?,
    };

    println!("{}", table.format(&args.output, args.no_headers));
    Ok(())
}

/// Command line values take precedence over the stored defaults
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(context) = &args.context {
        config.context = Some(context.clone());
    }
    if let Some(group) = &args.group {
        config.api_group = Some(cli::normalize_group(group).to_string());
    }
    if let Some(version) = &args.api_version {
        config.api_version = Some(version.clone());
    }
}

/// Fetch (or reuse) the cluster snapshot and index it
async fn load_catalog(args: &Args, config: &Config) -> Result<Resources> {
    let spinner = create_spinner("Connecting to Kubernetes...");
    let snapshot = fetch_snapshot(args, config, &spinner).await;
    spinner.finish_and_clear();
    let snapshot = snapshot?;

    let schemas = snapshot.schemas()?;
    let catalog = Parser::new(&snapshot, &schemas)
        .with_restriction(config.restriction())
        .discover()
        .context("Failed to discover API resources")?;

    info!(
        names = catalog.len(),
        resources = catalog.resource_count(),
        "Built resource catalog"
    );
    Ok(catalog)
}

/// Cached snapshot of the context, or a fresh one from the cluster
async fn fetch_snapshot(
    args: &Args,
    config: &Config,
    spinner: &ProgressBar,
) -> Result<ServerSnapshot> {
    let connection = connect(config.context.as_deref()).await?;
    let cache = SnapshotCache::new(config.cache_ttl())?;

    if args.refresh {
        cache.clear(&connection.context)?;
    } else if let Some(snapshot) = cache.load(&connection.context) {
        return Ok(snapshot);
    }

    spinner.set_message(format!("Discovering resources on {}...", connection.context));
    let snapshot = ServerSnapshot::fetch(&connection.client).await?;

    // A failed cache write only costs the next run a refetch
    if let Err(e) = cache.save(&connection.context, &snapshot) {
        warn!(context = %connection.context, error = %e, "Failed to cache discovery snapshot");
    }
    Ok(snapshot)
}
