//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{select_asset, Playback, PlaybackConfig};

/// Execute the `run` command
pub async fn run_playback(args: &RunArgs) -> Result<()> {
    info!(manifest = %args.manifest.display(), "Loading manifest");

    if !args.manifest.exists() {
        return Err(CliError::manifest_not_found(args.manifest.display().to_string()).into());
    }

    let manifest = config_loader::ConfigLoader::load_from_path(&args.manifest)
        .with_context(|| format!("Failed to load manifest from {}", args.manifest.display()))?;

    info!(
        assets = manifest.assets.len(),
        actuator = %manifest.actuator.name,
        poll_interval_ms = manifest.engine.poll_interval_ms,
        "Manifest loaded"
    );

    if args.dry_run {
        let entry = select_asset(&manifest, args.asset.as_deref())?;
        info!("Dry run mode - manifest is valid, exiting");
        print_run_plan(entry, args);
        return Ok(());
    }

    let config = PlaybackConfig {
        asset: args.asset.clone(),
        initial_page: args.initial_page,
        page_switches: args.page_at.clone(),
        max_duration: if args.max_duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.max_duration))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        ..PlaybackConfig::new(manifest)
    };

    let stats = Playback::new(config)
        .run(shutdown_signal())
        .await
        .context("Playback failed")?;

    stats.print_summary();
    info!("Haptic Sync finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print what would be played, for dry-run mode
fn print_run_plan(entry: &contracts::AssetManifest, args: &RunArgs) {
    println!("\n=== Run Plan ===\n");
    println!("Asset: {}", entry.locator);
    match entry.duration_ms {
        Some(ms) => println!("  Duration: {:.2}s", ms as f64 / 1000.0),
        None => println!("  Duration: unknown"),
    }
    for page in &entry.pages {
        println!("  Page {}: {} cues", page.number, page.cues.len());
    }
    if let Some(page) = args.initial_page {
        println!("\nInitial page: {}", page);
    }
    if !args.page_at.is_empty() {
        println!("\nPage switches:");
        for switch in &args.page_at {
            println!("  - at {}ms -> page {}", switch.at_ms, switch.page);
        }
    }
    println!();
}
