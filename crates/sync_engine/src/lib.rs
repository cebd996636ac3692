//! # Sync Engine
//!
//! 触觉 cue 与音乐播放时钟的同步引擎。
//!
//! 负责：
//! - 轮询播放时钟，按 `(lastKnownPosition, position]` 区间规则触发 cue
//! - 播放器状态机（Idle / Loaded / Playing / Stopped）
//! - 页面切换、回退检测、迟到 cue 丢弃
//! - 通过诊断广播通道报告运行期故障（每个订阅者都收到全部诊断）
//!
//! ## 使用示例
//!
//! ```ignore
//! use sync_engine::SyncEngine;
//!
//! let engine = SyncEngine::new(config, player, actuator);
//! engine.load(asset).await?;
//! engine.start().await?;
//! engine.set_page_number(2).await;
//! engine.stop().await?;
//! ```

mod cursor;
mod diagnostics;
mod engine;
mod session;
mod state;

pub use cursor::{Advance, CueCursor};
pub use engine::{SyncEngine, TickOutcome};
pub use session::{PlaybackSession, TickPlan};
pub use state::{PlayerStateMachine, Transition};

// Re-export contracts types
pub use contracts::{Diagnostic, PlayerState, SessionSnapshot, SyncEngineConfig};

/// Subscriber end of the diagnostics stream
pub type DiagnosticsReceiver = tokio::sync::broadcast::Receiver<Diagnostic>;
