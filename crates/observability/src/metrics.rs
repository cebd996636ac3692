//! 同步引擎指标收集模块
//!
//! 记录轮询、分发和诊断事件，并在内存中聚合出运行摘要。

use std::collections::BTreeMap;
use std::fmt;

use contracts::{Diagnostic, DispatchOutcome, PlayerState};
use metrics::{counter, gauge, histogram};

/// 记录一次轮询 tick
///
/// `outcome` 是 tick 结果的短名称（例如 `advanced`、`clock_unavailable`）。
pub fn record_tick(outcome: &'static str, elapsed_ms: f64) {
    counter!("haptic_sync_ticks_total", "outcome" => outcome).increment(1);
    histogram!("haptic_sync_tick_duration_ms").record(elapsed_ms);
}

/// 记录一次分发结果
pub fn record_dispatch_outcome(actuator: &str, outcome: DispatchOutcome) {
    let status = match outcome {
        DispatchOutcome::Delivered => "delivered",
        DispatchOutcome::Busy => "busy",
        DispatchOutcome::Unsupported => "unsupported",
    };
    counter!(
        "haptic_sync_dispatch_total",
        "actuator" => actuator.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录已触发 cue 的延迟（触发位置 - cue 时间戳）
pub fn record_cue_lateness_ms(lateness_ms: f64) {
    counter!("haptic_sync_cues_fired_total").increment(1);
    histogram!("haptic_sync_cue_lateness_ms").record(lateness_ms);
}

/// 记录诊断事件
pub fn record_diagnostic(diagnostic: &Diagnostic) {
    counter!("haptic_sync_diagnostics_total", "kind" => diagnostic.kind()).increment(1);

    match diagnostic {
        Diagnostic::CueDropped { reason, .. } => {
            counter!("haptic_sync_cues_dropped_total", "reason" => reason.to_string())
                .increment(1);
        }
        Diagnostic::DispatchTimeout { dropped, .. } => {
            counter!("haptic_sync_cues_dropped_total", "reason" => "timeout")
                .increment(*dropped as u64);
        }
        Diagnostic::ClockReadFailed { consecutive, .. } => {
            gauge!("haptic_sync_clock_consecutive_failures").set(*consecutive as f64);
        }
        _ => {}
    }
}

/// 记录引擎状态与 cue 指针
pub fn record_session_state(state: PlayerState, cue_pointer: usize) {
    let value = match state {
        PlayerState::Idle => 0.0,
        PlayerState::Loaded => 1.0,
        PlayerState::Playing => 2.0,
        PlayerState::Stopped => 3.0,
    };
    gauge!("haptic_sync_player_state").set(value);
    gauge!("haptic_sync_cue_pointer").set(cue_pointer as f64);
}

/// 诊断聚合器
///
/// 在内存中汇总一次运行的触发与诊断情况，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsAggregator {
    cues_fired: u64,
    lateness_ms: RunningStats,
    /// 按原因统计的丢弃次数（包括超时）
    dropped: BTreeMap<String, u64>,
    seeks: u64,
    clock_failures: u64,
    stalls: u64,
    halts: u64,
    unsupported_reports: u64,
}

impl DiagnosticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功触发
    pub fn record_fired(&mut self, lateness_ms: f64) {
        self.cues_fired += 1;
        self.lateness_ms.push(lateness_ms);
    }

    /// 汇总诊断事件
    pub fn update(&mut self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::CueDropped { reason, .. } => {
                *self.dropped.entry(reason.to_string()).or_insert(0) += 1;
            }
            Diagnostic::DispatchTimeout { dropped, .. } => {
                *self.dropped.entry("timeout".to_string()).or_insert(0) += *dropped as u64;
            }
            Diagnostic::CapabilityUnsupported { .. } => self.unsupported_reports += 1,
            Diagnostic::ClockReadFailed { .. } => self.clock_failures += 1,
            Diagnostic::StalledPlayback { .. } => self.stalls += 1,
            Diagnostic::SeekDetected { .. } => self.seeks += 1,
            Diagnostic::PlaybackHalted { .. } => self.halts += 1,
        }
    }

    pub fn summary(&self) -> DiagnosticsSummary {
        let total_dropped = self.dropped.values().sum();
        DiagnosticsSummary {
            cues_fired: self.cues_fired,
            cues_dropped: total_dropped,
            dropped_by_reason: self.dropped.clone(),
            lateness_ms: StatsSummary::from(&self.lateness_ms),
            seeks: self.seeks,
            clock_failures: self.clock_failures,
            stalls: self.stalls,
            halts: self.halts,
            capability_unsupported: self.unsupported_reports > 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 运行摘要
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSummary {
    pub cues_fired: u64,
    pub cues_dropped: u64,
    pub dropped_by_reason: BTreeMap<String, u64>,
    pub lateness_ms: StatsSummary,
    pub seeks: u64,
    pub clock_failures: u64,
    pub stalls: u64,
    pub halts: u64,
    pub capability_unsupported: bool,
}

impl fmt::Display for DiagnosticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Haptic Sync Summary ===")?;
        writeln!(f, "Cues fired: {}", self.cues_fired)?;
        writeln!(f, "Cues dropped: {}", self.cues_dropped)?;
        for (reason, count) in &self.dropped_by_reason {
            writeln!(f, "  {}: {}", reason, count)?;
        }
        writeln!(f, "Lateness (ms): {}", self.lateness_ms)?;
        writeln!(f, "Seeks detected: {}", self.seeks)?;
        writeln!(
            f,
            "Clock read failures: {} (stalls: {})",
            self.clock_failures, self.stalls
        )?;
        writeln!(f, "Playback halts: {}", self.halts)?;
        if self.capability_unsupported {
            writeln!(f, "Actuator reported no haptic capability")?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return f.write_str("N/A");
        }
        write!(
            f,
            "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
            self.min, self.max, self.mean, self.std_dev, self.count
        )
    }
}

/// 在线统计 (Welford)
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            *self = Self {
                count: 1,
                mean: value,
                m2: 0.0,
                min: value,
                max: value,
            };
            return;
        }

        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        match self.count {
            0 | 1 => 0.0,
            n => self.m2 / (n - 1) as f64,
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
