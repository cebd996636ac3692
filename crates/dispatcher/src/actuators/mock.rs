//! 可编排的 mock 执行器
//!
//! 用于测试：按脚本返回结果、可注入延迟、可模拟设备不支持触觉。

use std::collections::VecDeque;
use std::time::Duration;

use contracts::{DispatchOutcome, HapticDispatcher, HapticEvent};

use super::RecordedEvents;

/// Mock 执行器
pub struct MockActuator {
    name: String,
    /// 脚本化结果；耗尽后返回 `Delivered`
    script: VecDeque<DispatchOutcome>,
    /// 每次调用的延迟
    delay: Option<Duration>,
    supported: bool,
    /// 所有调用（包括 Busy 和超时被丢弃的调用）
    calls: RecordedEvents,
}

impl MockActuator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: VecDeque::new(),
            delay: None,
            supported: true,
            calls: RecordedEvents::new(),
        }
    }

    /// 按顺序返回的结果
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = DispatchOutcome>) -> Self {
        self.script.extend(outcomes);
        self
    }

    /// 每次调用前等待（基于 tokio 时间，可配合 `time::pause`）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 能力探测返回 false
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// 调用记录句柄
    pub fn calls(&self) -> RecordedEvents {
        self.calls.clone()
    }
}

impl HapticDispatcher for MockActuator {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn dispatch(&mut self, event: &HapticEvent) -> DispatchOutcome {
        self.calls.push(event.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if !self.supported {
            return DispatchOutcome::Unsupported;
        }
        self.script.pop_front().unwrap_or(DispatchOutcome::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Cue;

    fn event(at: u64) -> HapticEvent {
        HapticEvent::from_cue(&Cue::at_ms(at, "tap"), 0, Duration::from_millis(at))
    }

    #[tokio::test]
    async fn test_script_then_default() {
        let mut mock = MockActuator::new("mock").with_outcomes([DispatchOutcome::Busy]);
        let calls = mock.calls();

        assert_eq!(mock.dispatch(&event(1)).await, DispatchOutcome::Busy);
        assert_eq!(mock.dispatch(&event(2)).await, DispatchOutcome::Delivered);
        assert_eq!(calls.len(), 2);
    }

    #[tokio::test]
    async fn test_unsupported() {
        let mut mock = MockActuator::new("mock").unsupported();
        assert!(!mock.is_supported());
        assert_eq!(mock.dispatch(&event(1)).await, DispatchOutcome::Unsupported);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_uses_tokio_time() {
        let mut mock = MockActuator::new("slow").with_delay(Duration::from_millis(30));
        let start = tokio::time::Instant::now();
        mock.dispatch(&event(1)).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
