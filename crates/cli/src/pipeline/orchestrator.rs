//! Playback orchestrator - wires manifest, player, actuator and engine.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{
    AssetManifest, Diagnostic, HapticDispatcher, HapticManifest, MediaPlayer, PageNumber,
    PlaybackClock, PlayerState,
};
use dispatcher::MeteredDispatcher;
use media_player::SimulatedPlayer;
use sync_engine::SyncEngine;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::stats::{PlaybackStats, StopReason};
use super::tracker::{lock_aggregator, FiredTracker, SharedAggregator};
use crate::cli::PageSwitch;
use crate::error::CliError;

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    pub manifest: HapticManifest,

    /// Asset locator (None = first asset in the manifest)
    pub asset: Option<String>,

    /// Overrides `engine.initial_page`
    pub initial_page: Option<PageNumber>,

    /// Scheduled page changes
    pub page_switches: Vec<PageSwitch>,

    /// Run limit (None = until the transport halts)
    pub max_duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// How often page switches and engine state are checked
    pub status_interval: Duration,
}

impl PlaybackConfig {
    pub fn new(manifest: HapticManifest) -> Self {
        Self {
            manifest,
            asset: None,
            initial_page: None,
            page_switches: Vec::new(),
            max_duration: None,
            metrics_port: None,
            status_interval: Duration::from_millis(50),
        }
    }
}

/// Pick the asset to play
pub fn select_asset<'a>(
    manifest: &'a HapticManifest,
    requested: Option<&str>,
) -> Result<&'a AssetManifest, CliError> {
    match requested {
        Some(locator) => manifest.find_asset(locator).ok_or_else(|| {
            CliError::asset_not_found(locator, manifest.assets.iter().map(|a| a.locator.as_str()))
        }),
        None => manifest.assets.first().ok_or(CliError::NoAssets),
    }
}

/// One playback run
pub struct Playback {
    config: PlaybackConfig,
}

impl Playback {
    pub fn new(config: PlaybackConfig) -> Self {
        Self { config }
    }

    /// Play until the transport halts, the run limit passes or `shutdown` resolves
    pub async fn run<S>(self, shutdown: S) -> Result<PlaybackStats, CliError>
    where
        S: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config;

        if let Some(port) = config.metrics_port {
            observability::init_metrics_only(port)
                .map_err(|e| CliError::playback(format!("metrics exporter: {e}")))?;
            info!("Metrics endpoint available on port {}", port);
        }

        let entry = select_asset(&config.manifest, config.asset.as_deref())?;
        let asset = entry.to_asset()?;

        // The simulated library holds exactly the selected asset
        let player = SimulatedPlayer::with_library([(entry.locator.clone(), entry.duration())]);

        let actuator = dispatcher::create_actuator(&config.manifest.actuator)
            .map_err(|e| CliError::playback(e.to_string()))?;
        let aggregator = SharedAggregator::default();
        let metered = MeteredDispatcher::new(FiredTracker::new(actuator, Arc::clone(&aggregator)));
        let dispatch_metrics = metered.metrics();

        let mut engine_config = config.manifest.engine.clone();
        if let Some(page) = config.initial_page {
            engine_config.initial_page = page;
        }

        let engine = SyncEngine::new(engine_config, player, metered);
        let mut diagnostics = engine.diagnostics();

        engine.load(asset).await?;
        engine.start().await?;
        info!(
            locator = %entry.locator,
            page = engine.page_number().await,
            duration_ms = entry.duration_ms,
            "Playback started"
        );

        let mut switches: Vec<PageSwitch> = config.page_switches.clone();
        switches.sort_by_key(|s| s.at_ms);
        let mut switches = VecDeque::from(switches);
        let mut applied = 0;

        let mut status = time::interval(config.status_interval);
        status.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let limit = config.max_duration;
        let run_limit = async move {
            match limit {
                Some(limit) => time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(run_limit);
        tokio::pin!(shutdown);

        let stop_reason = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping playback...");
                    break StopReason::Signal;
                }
                _ = &mut run_limit => {
                    info!(max_duration = ?limit, "Reached max duration");
                    break StopReason::MaxDuration;
                }
                received = diagnostics.recv() => match received {
                    Ok(diagnostic) => {
                        debug!(kind = diagnostic.kind(), "diagnostic received");
                        lock_aggregator(&aggregator).update(&diagnostic);
                        if matches!(diagnostic, Diagnostic::PlaybackHalted { .. }) {
                            break StopReason::Halted;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Diagnostics lagged, summary will be incomplete");
                    }
                    Err(RecvError::Closed) => break StopReason::Halted,
                },
                _ = status.tick() => {
                    applied += apply_page_switches(&engine, &mut switches).await;
                    if engine.state().await != PlayerState::Playing {
                        break StopReason::Halted;
                    }
                }
            }
        };

        let snapshot = engine.snapshot().await;
        info!("Shutting down playback...");
        engine.shutdown().await;

        {
            let mut aggregator = lock_aggregator(&aggregator);
            loop {
                match diagnostics.try_recv() {
                    Ok(diagnostic) => aggregator.update(&diagnostic),
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Diagnostics lagged while draining");
                    }
                    Err(_) => break,
                }
            }
        }

        let summary = lock_aggregator(&aggregator).summary();
        let stats = PlaybackStats::from_snapshot(
            &snapshot,
            stop_reason,
            start_time.elapsed(),
            applied,
            summary,
            dispatch_metrics.snapshot(),
        );

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            delivered = stats.dispatch.delivered,
            dropped = stats.diagnostics.cues_dropped,
            "Playback finished"
        );
        Ok(stats)
    }
}

/// Apply every switch whose position the player has reached
async fn apply_page_switches<P, D>(
    engine: &SyncEngine<P, D>,
    pending: &mut VecDeque<PageSwitch>,
) -> usize
where
    P: MediaPlayer + 'static,
    D: HapticDispatcher + 'static,
{
    let Ok(sample) = engine.player().sample() else {
        return 0;
    };

    let mut applied = 0;
    while let Some(next) = pending.front().copied() {
        if sample.position < Duration::from_millis(next.at_ms) {
            break;
        }
        pending.pop_front();
        info!(
            at_ms = next.at_ms,
            position_ms = sample.position.as_millis() as u64,
            page = next.page,
            "Scheduled page switch"
        );
        engine.set_page_number(next.page).await;
        applied += 1;
    }
    applied
}
