//! Player state machine
//!
//! ```text
//! Idle --load--> Loaded --start--> Playing --stop/halt--> Stopped
//!                  ^                  |                      |
//!                  +------reset-------+--------reset---------+
//! Stopped --start--> Playing      any --load--> Loaded
//! ```

use contracts::{ContractError, PlayerState};

/// Result of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do (idempotent request)
    Unchanged,
    Entered { from: PlayerState, to: PlayerState },
}

impl Transition {
    /// The transition left `Playing`, so the poll loop and transport must stop
    pub fn left_playing(&self) -> bool {
        matches!(
            self,
            Self::Entered {
                from: PlayerState::Playing,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStateMachine {
    state: PlayerState,
}

impl PlayerStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    fn enter(&mut self, to: PlayerState) -> Transition {
        let from = std::mem::replace(&mut self.state, to);
        Transition::Entered { from, to }
    }

    /// Any state accepts a new asset
    pub fn load(&mut self) -> Transition {
        self.enter(PlayerState::Loaded)
    }

    /// Check `start` is allowed without transitioning
    pub fn can_start(&self) -> Result<(), ContractError> {
        match self.state {
            PlayerState::Loaded | PlayerState::Stopped => Ok(()),
            state => Err(ContractError::invalid_state("start", state)),
        }
    }

    pub fn start(&mut self) -> Result<Transition, ContractError> {
        self.can_start()?;
        Ok(self.enter(PlayerState::Playing))
    }

    /// Playing -> Stopped; Stopped is idempotent
    pub fn stop(&mut self) -> Result<Transition, ContractError> {
        match self.state {
            PlayerState::Playing => Ok(self.enter(PlayerState::Stopped)),
            PlayerState::Stopped => Ok(Transition::Unchanged),
            state => Err(ContractError::invalid_state("stop", state)),
        }
    }

    /// Back to Loaded; a no-op when nothing is loaded
    pub fn reset(&mut self) -> Transition {
        match self.state {
            PlayerState::Idle => Transition::Unchanged,
            _ => self.enter(PlayerState::Loaded),
        }
    }

    /// Transport ended or paused behind the engine's back
    pub fn halt(&mut self) -> Transition {
        match self.state {
            PlayerState::Playing => self.enter(PlayerState::Stopped),
            _ => Transition::Unchanged,
        }
    }

    /// Drop the asset entirely (engine shutdown)
    pub fn unload(&mut self) -> Transition {
        match self.state {
            PlayerState::Idle => Transition::Unchanged,
            _ => self.enter(PlayerState::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_in(state: PlayerState) -> PlayerStateMachine {
        PlayerStateMachine { state }
    }

    #[test]
    fn test_happy_path() {
        let mut machine = PlayerStateMachine::new();
        assert_eq!(machine.state(), PlayerState::Idle);

        machine.load();
        assert_eq!(machine.state(), PlayerState::Loaded);
        machine.start().unwrap();
        assert!(machine.is_playing());

        let t = machine.stop().unwrap();
        assert!(t.left_playing());
        assert_eq!(machine.state(), PlayerState::Stopped);

        machine.start().unwrap();
        assert!(machine.is_playing());
    }

    #[test]
    fn test_start_rejected_from_idle_and_playing() {
        let err = machine_in(PlayerState::Idle).start().unwrap_err();
        assert!(matches!(
            err,
            ContractError::InvalidState {
                operation: "start",
                state: PlayerState::Idle
            }
        ));
        assert!(machine_in(PlayerState::Playing).start().is_err());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut machine = machine_in(PlayerState::Playing);
        machine.stop().unwrap();
        assert_eq!(machine.stop().unwrap(), Transition::Unchanged);
        assert_eq!(machine.state(), PlayerState::Stopped);
    }

    #[test]
    fn test_stop_rejected_before_start() {
        assert!(machine_in(PlayerState::Idle).stop().is_err());
        assert!(machine_in(PlayerState::Loaded).stop().is_err());
    }

    #[test]
    fn test_reset() {
        assert_eq!(machine_in(PlayerState::Idle).reset(), Transition::Unchanged);

        let mut machine = machine_in(PlayerState::Playing);
        assert!(machine.reset().left_playing());
        assert_eq!(machine.state(), PlayerState::Loaded);

        let mut machine = machine_in(PlayerState::Stopped);
        assert!(!machine.reset().left_playing());
        assert_eq!(machine.state(), PlayerState::Loaded);
    }

    #[test]
    fn test_load_from_any_state() {
        for state in [
            PlayerState::Idle,
            PlayerState::Loaded,
            PlayerState::Playing,
            PlayerState::Stopped,
        ] {
            let mut machine = machine_in(state);
            machine.load();
            assert_eq!(machine.state(), PlayerState::Loaded);
        }
    }

    #[test]
    fn test_halt_only_from_playing() {
        let mut machine = machine_in(PlayerState::Loaded);
        assert_eq!(machine.halt(), Transition::Unchanged);

        let mut machine = machine_in(PlayerState::Playing);
        assert!(machine.halt().left_playing());
        assert_eq!(machine.state(), PlayerState::Stopped);
    }
}
