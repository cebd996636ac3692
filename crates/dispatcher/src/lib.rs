//! # Dispatcher
//!
//! 触觉执行器模块。
//!
//! 负责：
//! - 实现 `HapticDispatcher` 的各类执行器（日志、记录、mock）
//! - 根据配置创建执行器
//! - 统计每个执行器的分发结果

pub mod actuator;
pub mod actuators;
pub mod error;
pub mod metered;
pub mod metrics;

pub use actuator::{Actuator, create_actuator};
pub use actuators::{LogActuator, MockActuator, RecordedEvents, RecordingActuator};
pub use contracts::{DispatchOutcome, HapticDispatcher, HapticEvent};
pub use error::DispatcherError;
pub use metered::MeteredDispatcher;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
