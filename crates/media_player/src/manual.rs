//! 手动驱动的播放器
//!
//! 用于单元测试的 mock 实现：位置与传输状态由测试显式设置，支持注入读取失败与加载失败。

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use contracts::{
    AssetHandle, AssetLocator, ClockSample, ContractError, PlaybackClock, TransportCallback,
    TransportControl, TransportState,
};
use tracing::{debug, instrument};

/// 播放器收到的传输指令（按顺序记录）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Load(AssetLocator),
    Play,
    Pause,
    Stop,
}

#[derive(Debug, Default)]
struct ManualState {
    position: Duration,
    transport: TransportState,
    /// 剩余需要失败的读取次数
    pending_read_failures: u32,
    loaded: Option<AssetLocator>,
}

/// 手动播放器
#[derive(Default)]
pub struct ManualPlayer {
    state: Mutex<ManualState>,
    /// 拒绝加载的 locator
    rejected: Mutex<HashSet<String>>,
    /// 已记录的指令
    commands: Mutex<Vec<TransportCommand>>,
    callback: Mutex<Option<TransportCallback>>,
}

impl ManualPlayer {
    /// 创建空闲播放器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置当前播放位置
    pub fn set_position(&self, position: Duration) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).position = position;
    }

    /// 以毫秒设置播放位置
    pub fn set_position_ms(&self, ms: u64) {
        self.set_position(Duration::from_millis(ms));
    }

    /// 当前播放位置
    pub fn position(&self) -> Duration {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).position
    }

    /// 外部改变传输状态（例如用户暂停、播放结束），并触发回调
    pub fn set_transport(&self, transport: TransportState) {
        self.change_transport(transport);
    }

    /// 当前传输状态
    pub fn transport(&self) -> TransportState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).transport
    }

    /// 接下来的 `count` 次读取返回 `ClockRead` 错误
    pub fn fail_next_reads(&self, count: u32) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).pending_read_failures = count;
    }

    /// 令指定 locator 的加载失败
    pub fn reject_locator(&self, locator: &str) {
        self.rejected.lock().unwrap_or_else(PoisonError::into_inner).insert(locator.to_string());
    }

    /// 当前加载的 locator
    pub fn loaded_locator(&self) -> Option<AssetLocator> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loaded.clone()
    }

    /// 已收到的指令
    pub fn commands(&self) -> Vec<TransportCommand> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, command: TransportCommand) {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).push(command);
    }

    /// 修改传输状态；状态变化时在锁外调用回调
    fn change_transport(&self, transport: TransportState) {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = state.transport != transport;
            state.transport = transport;
            changed
        };

        if changed {
            debug!(transport = %transport, "manual player transport changed");
            let callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner).clone();
            if let Some(callback) = callback {
                callback(transport);
            }
        }
    }
}

impl PlaybackClock for ManualPlayer {
    fn sample(&self) -> Result<ClockSample, ContractError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.pending_read_failures > 0 {
            state.pending_read_failures -= 1;
            return Err(ContractError::clock_read("injected read failure"));
        }
        Ok(ClockSample {
            position: state.position,
            transport: state.transport,
        })
    }
}

impl TransportControl for ManualPlayer {
    #[instrument(name = "manual_player_load", skip(self), fields(locator = %locator))]
    fn load(&self, locator: &AssetLocator) -> Result<AssetHandle, ContractError> {
        if self.rejected.lock().unwrap_or_else(PoisonError::into_inner).contains(locator.as_str()) {
            return Err(ContractError::load(locator.as_str(), "rejected by player"));
        }
        self.record(TransportCommand::Load(locator.clone()));
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.loaded = Some(locator.clone());
            state.position = Duration::ZERO;
        }
        self.change_transport(TransportState::Idle);
        Ok(AssetHandle {
            locator: locator.clone(),
            duration: None,
        })
    }

    fn play(&self) -> Result<(), ContractError> {
        self.record(TransportCommand::Play);
        self.change_transport(TransportState::Playing);
        Ok(())
    }

    fn pause(&self) -> Result<(), ContractError> {
        self.record(TransportCommand::Pause);
        self.change_transport(TransportState::Paused);
        Ok(())
    }

    fn stop(&self) -> Result<(), ContractError> {
        self.record(TransportCommand::Stop);
        self.state.lock().unwrap_or_else(PoisonError::into_inner).position = Duration::ZERO;
        self.change_transport(TransportState::Idle);
        Ok(())
    }

    fn on_transport_change(&self, callback: TransportCallback) {
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }
}
