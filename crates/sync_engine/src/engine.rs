//! SyncEngine - keeps haptic cues in step with the playback clock
//!
//! All session state lives behind one async mutex. Every operation and every
//! tick takes that lock, so `stop`/`reset`/`load`/`shutdown` cannot interleave
//! with a tick: once they return, the superseded loop can no longer dispatch.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use contracts::{
    Asset, AssetHandle, AssetLocator, AssetManifest, ContractError, Diagnostic, DispatchOutcome,
    DropReason, HapticDispatcher, HapticEvent, MediaPlayer, PageNumber, PlayerState, SessionSnapshot,
    SyncEngineConfig, TransportState,
};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, trace, warn};

use crate::cursor::Advance;
use crate::diagnostics::DiagnosticsChannel;
use crate::session::{PlaybackSession, TickPlan};
use crate::state::{PlayerStateMachine, Transition};
use crate::DiagnosticsReceiver;

/// Stand-in deadline for periods too long to add to `Instant::now()`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Engine is not playing; the clock was not read
    NotPlaying,
    /// Clock read failed; no cues this tick
    ClockUnavailable,
    /// Transport has not started yet
    Waiting,
    /// Transport ended or paused; session moved to `Stopped`
    Halted,
    /// Clock jumped backwards; cue pointer re-synchronised
    Rewound,
    /// Backwards jitter within tolerance; position held
    Held,
    /// Cursor advanced over `fired + dropped` cues
    Advanced { fired: usize, dropped: usize },
}

impl TickOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotPlaying => "not_playing",
            Self::ClockUnavailable => "clock_unavailable",
            Self::Waiting => "waiting",
            Self::Halted => "halted",
            Self::Rewound => "rewound",
            Self::Held => "held",
            Self::Advanced { .. } => "advanced",
        }
    }

    fn ends_run(&self) -> bool {
        matches!(self, Self::NotPlaying | Self::Halted)
    }
}

struct Inner<D> {
    machine: PlayerStateMachine,
    /// Selected page; survives loads
    page: PageNumber,
    session: Option<PlaybackSession>,
    dispatcher: D,
    /// Identifies the current poll loop; bumped on every `start`
    run_id: u64,
}

struct Shared<P, D> {
    config: SyncEngineConfig,
    player: P,
    inner: Mutex<Inner<D>>,
    transport_tx: Arc<watch::Sender<TransportState>>,
    diagnostics: DiagnosticsChannel,
}

/// Haptic cue synchronisation engine
///
/// Generic over the media player and the actuator so it can run against
/// deterministic fakes.
pub struct SyncEngine<P, D> {
    shared: Arc<Shared<P, D>>,
    poll_task: StdMutex<Option<JoinHandle<()>>>,
}

impl<P, D> SyncEngine<P, D>
where
    P: MediaPlayer + 'static,
    D: HapticDispatcher + 'static,
{
    /// Create an engine and subscribe to the player's transport notifications
    pub fn new(config: SyncEngineConfig, player: P, dispatcher: D) -> Self {
        let (tx, _) = watch::channel(TransportState::Idle);
        let transport_tx = Arc::new(tx);

        let notify = Arc::clone(&transport_tx);
        player.on_transport_change(Arc::new(move |state| {
            notify.send_replace(state);
        }));

        let inner = Inner {
            machine: PlayerStateMachine::new(),
            page: config.initial_page,
            session: None,
            dispatcher,
            run_id: 0,
        };
        let diagnostics = DiagnosticsChannel::new(config.diagnostics_capacity);

        Self {
            shared: Arc::new(Shared {
                config,
                player,
                inner: Mutex::new(inner),
                transport_tx,
                diagnostics,
            }),
            poll_task: StdMutex::new(None),
        }
    }

    pub fn config(&self) -> &SyncEngineConfig {
        &self.shared.config
    }

    pub fn player(&self) -> &P {
        &self.shared.player
    }

    /// Subscribe to runtime diagnostics (dropped cues, stalls, seeks, halts)
    ///
    /// Each receiver gets every diagnostic published after it subscribed.
    pub fn diagnostics(&self) -> DiagnosticsReceiver {
        self.shared.diagnostics.subscribe()
    }

    /// Load an asset, replacing the current session
    ///
    /// The player loads the locator first; on failure the prior session is
    /// left untouched. On success any running loop is cancelled and a new
    /// session starts in `Loaded`.
    #[instrument(name = "sync_engine_load", skip(self, asset), fields(locator = %asset.locator()))]
    pub async fn load(&self, asset: Asset) -> Result<AssetHandle, ContractError> {
        let mut guard = self.shared.inner.lock().await;
        let handle = self.shared.player.load(asset.locator())?;
        self.cancel_poll_task();

        let inner = &mut *guard;
        let previous = inner.machine.state();
        inner.machine.load();

        let mut session = PlaybackSession::new(Arc::new(asset), handle.clone(), inner.page);
        if !inner.dispatcher.is_supported() {
            self.shared
                .report_unsupported(&mut session, inner.dispatcher.name());
        }
        info!(
            previous = %previous,
            page = inner.page,
            pages = session.asset().timelines().count(),
            cues = session.asset().cue_count(),
            "asset loaded"
        );
        inner.session = Some(session);
        observability::record_session_state(inner.machine.state(), 0);
        Ok(handle)
    }

    /// Validate a manifest entry and load it
    pub async fn load_manifest(&self, entry: &AssetManifest) -> Result<AssetHandle, ContractError> {
        let asset = entry.to_asset()?;
        self.load(asset).await
    }

    /// Start playback and the poll loop
    ///
    /// # Errors
    /// `InvalidState` from `Idle` or `Playing`; `Transport` if the player refuses.
    #[instrument(name = "sync_engine_start", skip(self))]
    pub async fn start(&self) -> Result<(), ContractError> {
        let mut guard = self.shared.inner.lock().await;
        guard.machine.can_start()?;
        self.shared.player.play()?;
        guard.machine.start()?;

        let inner = &mut *guard;
        if let Some(session) = inner.session.as_mut() {
            if session.resume() {
                debug!(
                    cue_pointer = session.cursor().next(),
                    position_ms = session.cursor().last_position().as_millis() as u64,
                    "resuming after transport halt"
                );
            }
        }

        inner.run_id += 1;
        let run_id = inner.run_id;
        let transport_rx = self.shared.transport_tx.subscribe();
        let task = tokio::spawn(poll_loop(Arc::clone(&self.shared), run_id, transport_rx));
        self.replace_poll_task(Some(task));

        info!(run_id, page = inner.page, "playback started");
        observability::record_session_state(inner.machine.state(), cue_pointer(inner));
        Ok(())
    }

    /// Stop playback; idempotent once stopped
    ///
    /// # Errors
    /// `InvalidState` from `Idle` or `Loaded`.
    #[instrument(name = "sync_engine_stop", skip(self))]
    pub async fn stop(&self) -> Result<(), ContractError> {
        let mut guard = self.shared.inner.lock().await;
        let transition = guard.machine.stop()?;
        if transition.left_playing() {
            self.cancel_poll_task();
            self.stop_transport();
        }
        if let Some(session) = guard.session.as_mut() {
            session.rewind();
        }

        if transition != Transition::Unchanged {
            info!("playback stopped");
        }
        observability::record_session_state(guard.machine.state(), 0);
        Ok(())
    }

    /// Return to `Loaded` with position and cue pointer cleared; no-op when idle
    #[instrument(name = "sync_engine_reset", skip(self))]
    pub async fn reset(&self) -> Result<(), ContractError> {
        let mut guard = self.shared.inner.lock().await;
        let transition = guard.machine.reset();
        let Transition::Entered { from, .. } = transition else {
            return Ok(());
        };

        if transition.left_playing() {
            self.cancel_poll_task();
        }
        if matches!(from, PlayerState::Playing | PlayerState::Stopped) {
            self.stop_transport();
        }
        if let Some(session) = guard.session.as_mut() {
            session.rewind();
        }

        info!(from = %from, "session reset");
        observability::record_session_state(guard.machine.state(), 0);
        Ok(())
    }

    pub async fn page_number(&self) -> PageNumber {
        self.shared.inner.lock().await.page
    }

    /// Select the active page; takes effect immediately, even while playing
    #[instrument(name = "sync_engine_set_page", skip(self))]
    pub async fn set_page_number(&self, page: PageNumber) {
        let mut guard = self.shared.inner.lock().await;
        let previous = std::mem::replace(&mut guard.page, page);
        if previous == page {
            return;
        }
        let pointer = match guard.session.as_mut() {
            Some(session) => {
                session.select_page(page);
                session.cursor().next()
            }
            None => 0,
        };
        info!(previous, page, cue_pointer = pointer, "page changed");
    }

    pub async fn asset_locator(&self) -> Option<AssetLocator> {
        let guard = self.shared.inner.lock().await;
        guard.session.as_ref().map(|s| s.locator().clone())
    }

    pub async fn state(&self) -> PlayerState {
        self.shared.inner.lock().await.machine.state()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.shared.inner.lock().await;
        let session = guard.session.as_ref();
        SessionSnapshot {
            state: guard.machine.state(),
            page: guard.page,
            cue_pointer: session.map_or(0, |s| s.cursor().next()),
            last_known_position: session.map(|s| s.cursor().last_position()).unwrap_or_default(),
            locator: session.map(|s| s.locator().clone()),
            run_id: guard.run_id,
        }
    }

    /// Run one tick now (a no-op unless playing)
    pub async fn poll_once(&self) -> TickOutcome {
        let mut guard = self.shared.inner.lock().await;
        self.shared.tick_locked(&mut guard).await
    }

    /// Tear down: cancel the loop, stop the transport and drop the session
    #[instrument(name = "sync_engine_shutdown", skip(self))]
    pub async fn shutdown(&self) {
        let mut guard = self.shared.inner.lock().await;
        self.cancel_poll_task();
        if guard.machine.is_playing() {
            self.stop_transport();
        }
        guard.machine.unload();
        guard.session = None;
        info!("sync engine shut down");
    }

    fn stop_transport(&self) {
        if let Err(e) = self.shared.player.stop() {
            warn!(error = %e, "transport stop failed");
        }
    }

    fn cancel_poll_task(&self) {
        self.replace_poll_task(None);
    }

    fn replace_poll_task(&self, task: Option<JoinHandle<()>>) {
        let mut slot = self.poll_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = std::mem::replace(&mut *slot, task) {
            previous.abort();
        }
    }
}

impl<P, D> Drop for SyncEngine<P, D> {
    fn drop(&mut self) {
        let slot = self.poll_task.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

fn cue_pointer<D>(inner: &Inner<D>) -> usize {
    inner.session.as_ref().map_or(0, |s| s.cursor().next())
}

impl<P, D> Shared<P, D>
where
    P: MediaPlayer,
    D: HapticDispatcher,
{
    /// Tick on behalf of the loop identified by `run_id`
    async fn tick(&self, run_id: u64) -> TickOutcome {
        let mut guard = self.inner.lock().await;
        if guard.run_id != run_id {
            return TickOutcome::NotPlaying;
        }
        self.tick_locked(&mut guard).await
    }

    #[instrument(level = "trace", name = "sync_engine_tick", skip_all, fields(run_id = inner.run_id))]
    async fn tick_locked(&self, inner: &mut Inner<D>) -> TickOutcome {
        if !inner.machine.is_playing() {
            return TickOutcome::NotPlaying;
        }
        let started = Instant::now();
        let outcome = self.run_tick(inner).await;
        observability::record_tick(outcome.label(), started.elapsed().as_secs_f64() * 1000.0);
        outcome
    }

    async fn run_tick(&self, inner: &mut Inner<D>) -> TickOutcome {
        let Inner {
            machine,
            page,
            session,
            dispatcher,
            ..
        } = inner;
        let Some(session) = session.as_mut() else {
            return TickOutcome::NotPlaying;
        };

        let sample = match self.player.sample() {
            Ok(sample) => {
                let streak = session.record_clock_success();
                if streak > 0 {
                    debug!(failures = streak, "playback clock recovered");
                }
                sample
            }
            Err(e) => {
                self.report_clock_failure(session, &e);
                return TickOutcome::ClockUnavailable;
            }
        };

        if sample.transport.halts_playback() {
            self.halt(machine, session, sample.transport, Some(sample.position));
            return TickOutcome::Halted;
        }
        if sample.transport == TransportState::Idle {
            trace!("transport idle, waiting");
            return TickOutcome::Waiting;
        }

        let plan = session.plan(sample.position, &self.config);
        let outcome = match &plan.advance {
            Advance::Held => TickOutcome::Held,
            Advance::Rewound { from, to } => {
                info!(
                    from_ms = from.as_millis() as u64,
                    to_ms = to.as_millis() as u64,
                    "seek detected, cue pointer re-synchronised"
                );
                self.diagnostics.emit(Diagnostic::SeekDetected {
                    from: *from,
                    to: *to,
                });
                TickOutcome::Rewound
            }
            Advance::Due(_) => {
                for cue in &plan.late {
                    debug!(pattern = %cue.pattern, "late cue skipped");
                    self.diagnostics.emit(Diagnostic::CueDropped {
                        pattern: cue.pattern.clone(),
                        position: plan.position,
                        reason: DropReason::Late,
                    });
                }
                let (fired, dropped) = self.dispatch_due(dispatcher, session, *page, &plan).await;
                TickOutcome::Advanced {
                    fired,
                    dropped: dropped + plan.late.len(),
                }
            }
        };

        session.commit(&plan);
        observability::record_session_state(machine.state(), session.cursor().next());
        outcome
    }

    /// Dispatch due cues in order within the tick deadline
    ///
    /// Returns `(fired, dropped)`. Dropped cues are never retried.
    async fn dispatch_due(
        &self,
        dispatcher: &mut D,
        session: &mut PlaybackSession,
        page: PageNumber,
        plan: &TickPlan,
    ) -> (usize, usize) {
        if plan.due.is_empty() {
            return (0, 0);
        }
        if session.is_unsupported() {
            trace!(count = plan.due.len(), "actuator unsupported, consuming cues");
            return (0, plan.due.len());
        }

        let deadline = deadline_after(self.config.dispatch_timeout());
        let mut fired = 0;
        let mut dropped = 0;

        for (index, cue) in plan.due.iter().enumerate() {
            let event = HapticEvent::from_cue(cue, page, plan.position);
            let Ok(outcome) = time::timeout_at(deadline, dispatcher.dispatch(&event)).await else {
                let remaining = plan.due.len() - index;
                dropped += remaining;
                warn!(
                    dropped = remaining,
                    position_ms = plan.position.as_millis() as u64,
                    "dispatch deadline passed, dropping remaining cues"
                );
                self.diagnostics.emit(Diagnostic::DispatchTimeout {
                    dropped: remaining,
                    position: plan.position,
                });
                break;
            };

            observability::record_dispatch_outcome(dispatcher.name(), outcome);
            match outcome {
                DispatchOutcome::Delivered => {
                    fired += 1;
                    let lateness = event.lateness();
                    observability::record_cue_lateness_ms(lateness.as_secs_f64() * 1000.0);
                    debug!(
                        pattern = %event.pattern,
                        lateness_ms = lateness.as_millis() as u64,
                        "cue dispatched"
                    );
                }
                DispatchOutcome::Busy => {
                    dropped += 1;
                    warn!(pattern = %event.pattern, "actuator busy, cue dropped");
                    self.diagnostics.emit(Diagnostic::CueDropped {
                        pattern: event.pattern,
                        position: plan.position,
                        reason: DropReason::Busy,
                    });
                }
                DispatchOutcome::Unsupported => {
                    dropped += plan.due.len() - index;
                    self.report_unsupported(session, dispatcher.name());
                    break;
                }
            }
        }

        (fired, dropped)
    }

    fn report_clock_failure(&self, session: &mut PlaybackSession, error: &ContractError) {
        let consecutive = session.record_clock_failure();
        warn!(consecutive, error = %error, "playback clock read failed");
        self.diagnostics.emit(Diagnostic::ClockReadFailed {
            consecutive,
            message: error.to_string(),
        });

        if consecutive == self.config.stall_threshold.max(1) {
            warn!(consecutive, "playback stalled");
            self.diagnostics.emit(Diagnostic::StalledPlayback {
                consecutive_failures: consecutive,
            });
        }
    }

    fn report_unsupported(&self, session: &mut PlaybackSession, actuator: &str) {
        if session.mark_unsupported() {
            warn!(actuator, "actuator has no haptic capability, cues will not fire");
            self.diagnostics.emit(Diagnostic::CapabilityUnsupported {
                actuator: actuator.to_string(),
            });
        }
    }

    fn halt(
        &self,
        machine: &mut PlayerStateMachine,
        session: &mut PlaybackSession,
        transport: TransportState,
        position: Option<Duration>,
    ) {
        if !machine.halt().left_playing() {
            return;
        }
        session.suspend();
        info!(transport = %transport, "transport halted playback");
        self.diagnostics
            .emit(Diagnostic::PlaybackHalted { transport, position });
        observability::record_session_state(machine.state(), 0);
    }

    /// Transport notification for the loop identified by `run_id`
    async fn on_transport_halt(&self, run_id: u64, transport: TransportState) {
        let mut guard = self.inner.lock().await;
        if guard.run_id != run_id {
            return;
        }
        let Inner {
            machine, session, ..
        } = &mut *guard;
        if let Some(session) = session.as_mut() {
            self.halt(machine, session, transport, None);
        }
    }
}

/// `now + period`, or a far-off instant when that overflows
fn deadline_after(period: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(period).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Poll loop for one `start`; exits when the run is superseded or halted
async fn poll_loop<P, D>(
    shared: Arc<Shared<P, D>>,
    run_id: u64,
    mut transport_rx: watch::Receiver<TransportState>,
) where
    P: MediaPlayer + 'static,
    D: HapticDispatcher + 'static,
{
    let period = shared.config.poll_interval();
    let mut ticker = time::interval_at(deadline_after(period), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(run_id, period_ms = period.as_millis() as u64, "poll loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if shared.tick(run_id).await.ends_run() {
                    break;
                }
            }
            changed = transport_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let transport = *transport_rx.borrow_and_update();
                if transport.halts_playback() {
                    shared.on_transport_halt(run_id, transport).await;
                    break;
                }
            }
        }
    }

    debug!(run_id, "poll loop exited");
}
