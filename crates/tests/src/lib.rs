//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 清单 -> 引擎 -> 执行器的端到端测试（手动播放器，无需真实设备）

#[cfg(test)]
mod contract_tests {
    use contracts::{ManifestVersion, PlayerState, SyncEngineConfig};

    #[test]
    fn test_contract_defaults() {
        assert_eq!(ManifestVersion::default(), ManifestVersion::V1);
        assert_eq!(PlayerState::default(), PlayerState::Idle);

        let config = SyncEngineConfig::default();
        assert_eq!(config.poll_interval_ms, 16);
        assert_eq!(config.initial_page, 0);
        assert_eq!(config.regression_tolerance_ms, 0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        Diagnostic, DispatchOutcome, DropReason, HapticDispatcher, HapticManifest, PlayerState,
        TransportState,
    };
    use dispatcher::{create_actuator, MeteredDispatcher, MockActuator};
    use media_player::{ManualPlayer, TransportCommand};
    use observability::DiagnosticsAggregator;
    use sync_engine::{DiagnosticsReceiver, SyncEngine, TickOutcome};

    const MANIFEST: &str = r#"
[engine]
poll_interval_ms = 10
initial_page = 1
regression_tolerance_ms = 30

[actuator]
name = "wrist"
kind = "recording"

[[assets]]
locator = "file:///asset_x.m4a"
duration_ms = 5000

[[assets.pages]]
number = 1
cues = [
    { at_ms = 1000, pattern = "tap_a", intensity = 0.8 },
    { at_ms = 2500, pattern = "tap_b", sharpness = 0.2 },
]

[[assets.pages]]
number = 2
cues = [
    { at_ms = 500, pattern = "tap_c" },
    { at_ms = 3000, pattern = "tap_d" },
]

[[assets]]
locator = "file:///asset_y.m4a"

[[assets.pages]]
number = 1
cues = [{ at_ms = 100, pattern = "buzz" }]
"#;

    fn manifest() -> HapticManifest {
        ConfigLoader::load_from_str(MANIFEST, ConfigFormat::Toml).unwrap()
    }

    /// Engine config with the loop effectively disabled; ticks come from `poll_once`
    fn manual_config(manifest: &HapticManifest) -> contracts::SyncEngineConfig {
        contracts::SyncEngineConfig {
            poll_interval_ms: 1000,
            ..manifest.engine.clone()
        }
    }

    async fn tick_at<D: HapticDispatcher + 'static>(
        engine: &SyncEngine<Arc<ManualPlayer>, D>,
        player: &ManualPlayer,
        ms: u64,
    ) -> TickOutcome {
        player.set_position_ms(ms);
        engine.poll_once().await
    }

    fn drain_into(rx: &mut DiagnosticsReceiver, aggregator: &mut DiagnosticsAggregator) {
        while let Ok(diagnostic) = rx.try_recv() {
            aggregator.update(&diagnostic);
        }
    }

    /// Manifest -> actuator from config -> engine, cue parameters preserved
    #[tokio::test]
    async fn test_manifest_to_actuator_events() {
        let manifest = manifest();
        let actuator = create_actuator(&manifest.actuator).unwrap();
        let events = actuator.recorded_events().unwrap();

        let player = Arc::new(ManualPlayer::new());
        let engine = SyncEngine::new(manual_config(&manifest), Arc::clone(&player), actuator);

        let entry = manifest.find_asset("file:///asset_x.m4a").unwrap();
        engine.load_manifest(entry).await.unwrap();
        engine.start().await.unwrap();

        tick_at(&engine, &player, 1200).await;
        tick_at(&engine, &player, 2600).await;

        let fired = events.snapshot();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].pattern, "tap_a");
        assert_eq!(fired[0].intensity, 0.8);
        assert_eq!(fired[0].page, 1);
        assert_eq!(fired[0].lateness(), Duration::from_millis(200));
        assert_eq!(fired[1].pattern, "tap_b");
        assert_eq!(fired[1].sharpness, 0.2);

        // page 2: only cues at or after the current position remain
        engine.set_page_number(2).await;
        tick_at(&engine, &player, 3100).await;
        assert_eq!(events.patterns(), vec!["tap_a", "tap_b", "tap_d"]);

        engine.shutdown().await;
        assert_eq!(engine.state().await, PlayerState::Idle);
    }

    /// Seek back beyond the jitter tolerance replays cues, small jitter does not
    #[tokio::test]
    async fn test_seek_and_jitter_through_manifest_config() {
        let manifest = manifest();
        let actuator = create_actuator(&manifest.actuator).unwrap();
        let events = actuator.recorded_events().unwrap();
        let player = Arc::new(ManualPlayer::new());
        let engine = SyncEngine::new(manual_config(&manifest), Arc::clone(&player), actuator);
        let mut diagnostics = engine.diagnostics();

        engine
            .load(ConfigLoader::asset(&manifest, "file:///asset_x.m4a").unwrap())
            .await
            .unwrap();
        engine.start().await.unwrap();

        tick_at(&engine, &player, 1010).await;
        assert_eq!(tick_at(&engine, &player, 990).await, TickOutcome::Held);
        assert_eq!(events.len(), 1);

        assert_eq!(tick_at(&engine, &player, 200).await, TickOutcome::Rewound);
        tick_at(&engine, &player, 1100).await;
        assert_eq!(events.patterns(), vec!["tap_a", "tap_a"]);

        let mut aggregator = DiagnosticsAggregator::new();
        drain_into(&mut diagnostics, &mut aggregator);
        assert_eq!(aggregator.summary().seeks, 1);
    }

    /// Busy actuator: cue dropped, counted by metrics and diagnostics, never retried
    #[tokio::test]
    async fn test_busy_actuator_metrics_and_diagnostics() {
        let manifest = manifest();
        let mock = MockActuator::new("mock").with_outcomes([DispatchOutcome::Busy]);
        let calls = mock.calls();
        let metered = MeteredDispatcher::new(mock);
        let metrics = metered.metrics();

        let player = Arc::new(ManualPlayer::new());
        let engine = SyncEngine::new(manual_config(&manifest), Arc::clone(&player), metered);
        let mut diagnostics = engine.diagnostics();

        engine
            .load(ConfigLoader::asset(&manifest, "file:///asset_x.m4a").unwrap())
            .await
            .unwrap();
        engine.start().await.unwrap();

        assert_eq!(
            tick_at(&engine, &player, 1100).await,
            TickOutcome::Advanced { fired: 0, dropped: 1 }
        );
        assert_eq!(
            tick_at(&engine, &player, 2600).await,
            TickOutcome::Advanced { fired: 1, dropped: 0 }
        );
        tick_at(&engine, &player, 2700).await;

        assert_eq!(calls.patterns(), vec!["tap_a", "tap_b"]);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.busy, 1);
        assert_eq!(snapshot.delivered, 1);

        let dropped: Vec<_> = std::iter::from_fn(|| diagnostics.try_recv().ok()).collect();
        assert!(matches!(
            dropped.as_slice(),
            [Diagnostic::CueDropped { reason: DropReason::Busy, .. }]
        ));
    }

    /// Transport end halts the session; restart after reset plays from the top
    #[tokio::test]
    async fn test_transport_end_then_restart() {
        let manifest = manifest();
        let actuator = create_actuator(&manifest.actuator).unwrap();
        let events = actuator.recorded_events().unwrap();
        let player = Arc::new(ManualPlayer::new());
        let engine = SyncEngine::new(manual_config(&manifest), Arc::clone(&player), actuator);
        let mut diagnostics = engine.diagnostics();

        engine
            .load(ConfigLoader::asset(&manifest, "file:///asset_y.m4a").unwrap())
            .await
            .unwrap();
        engine.start().await.unwrap();
        tick_at(&engine, &player, 150).await;

        player.set_transport(TransportState::Ended);
        engine.poll_once().await;
        assert_eq!(engine.state().await, PlayerState::Stopped);

        engine.reset().await.unwrap();
        assert_eq!(engine.snapshot().await.cue_pointer, 0);
        engine.start().await.unwrap();
        tick_at(&engine, &player, 120).await;
        assert_eq!(events.patterns(), vec!["buzz", "buzz"]);

        let mut aggregator = DiagnosticsAggregator::new();
        drain_into(&mut diagnostics, &mut aggregator);
        assert_eq!(aggregator.summary().halts, 1);

        assert!(player.commands().contains(&TransportCommand::Stop));
    }

    /// Reloading a different asset replaces the session; the page survives
    #[tokio::test]
    async fn test_reload_switches_asset() {
        let manifest = manifest();
        let actuator = create_actuator(&manifest.actuator).unwrap();
        let events = actuator.recorded_events().unwrap();
        let player = Arc::new(ManualPlayer::new());
        let engine = SyncEngine::new(manual_config(&manifest), Arc::clone(&player), actuator);

        let assets = ConfigLoader::build_assets(&manifest).unwrap();
        let mut assets = assets.into_iter();
        engine.load(assets.next().unwrap()).await.unwrap();
        engine.start().await.unwrap();
        tick_at(&engine, &player, 1500).await;

        engine.load(assets.next().unwrap()).await.unwrap();
        assert_eq!(engine.state().await, PlayerState::Loaded);
        assert_eq!(
            engine.asset_locator().await.unwrap().as_str(),
            "file:///asset_y.m4a"
        );
        assert_eq!(engine.page_number().await, 1);

        engine.start().await.unwrap();
        tick_at(&engine, &player, 200).await;
        assert_eq!(events.patterns(), vec!["tap_a", "buzz"]);
    }

    /// The poll loop drives ticks on its own
    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_end_to_end() {
        let manifest = manifest();
        let actuator = create_actuator(&manifest.actuator).unwrap();
        let events = actuator.recorded_events().unwrap();
        let player = Arc::new(ManualPlayer::new());
        let engine = SyncEngine::new(manifest.engine.clone(), Arc::clone(&player), actuator);

        engine
            .load(ConfigLoader::asset(&manifest, "file:///asset_x.m4a").unwrap())
            .await
            .unwrap();
        engine.start().await.unwrap();

        player.set_position_ms(1200);
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(events.patterns(), vec!["tap_a"]);

        player.set_position_ms(2600);
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(events.patterns(), vec!["tap_a", "tap_b"]);

        // external pause halts the loop through the transport notification
        player.set_transport(TransportState::Paused);
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(engine.state().await, PlayerState::Stopped);

        player.set_position_ms(4000);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(events.len(), 2);
    }
}
