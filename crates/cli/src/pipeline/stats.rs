//! Playback statistics.

use std::time::Duration;

use contracts::{PlayerState, SessionSnapshot};
use dispatcher::MetricsSnapshot;
use observability::DiagnosticsSummary;
use serde::Serialize;

/// Why the run finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Transport ended or was paused
    Halted,
    /// `--max-duration` elapsed
    MaxDuration,
    /// Ctrl-C / SIGTERM
    Signal,
}

/// Statistics from a playback run
#[derive(Debug, Clone)]
pub struct PlaybackStats {
    pub locator: String,
    pub stop_reason: StopReason,
    /// Wall-clock run time
    pub duration: Duration,
    /// Engine state right before shutdown
    pub final_state: PlayerState,
    pub final_page: contracts::PageNumber,
    pub page_switches: usize,
    pub diagnostics: DiagnosticsSummary,
    pub dispatch: MetricsSnapshot,
}

impl PlaybackStats {
    pub(crate) fn from_snapshot(
        snapshot: &SessionSnapshot,
        stop_reason: StopReason,
        duration: Duration,
        page_switches: usize,
        diagnostics: DiagnosticsSummary,
        dispatch: MetricsSnapshot,
    ) -> Self {
        Self {
            locator: snapshot
                .locator
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_default(),
            stop_reason,
            duration,
            final_state: snapshot.state,
            final_page: snapshot.page,
            page_switches,
            diagnostics,
            dispatch,
        }
    }

    /// Share of attempted dispatches the actuator accepted, as percentage
    pub fn delivery_rate(&self) -> f64 {
        let attempted = self.dispatch.attempted();
        if attempted > 0 {
            (self.dispatch.delivered as f64 / attempted as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Playback Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("▶ Run");
        println!("   ├─ Asset: {}", self.locator);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Stopped by: {:?}", self.stop_reason);
        println!("   ├─ Final state: {}", self.final_state);
        println!(
            "   └─ Final page: {} ({} switches)",
            self.final_page, self.page_switches
        );

        println!("\n⚡ Actuator");
        println!("   ├─ Delivered: {}", self.dispatch.delivered);
        println!("   ├─ Busy: {}", self.dispatch.busy);
        println!("   ├─ Unsupported: {}", self.dispatch.unsupported);
        println!("   ├─ Abandoned: {}", self.dispatch.abandoned);
        println!("   └─ Delivery rate: {:.1}%", self.delivery_rate());

        println!("\n{}", self.diagnostics);
    }
}
