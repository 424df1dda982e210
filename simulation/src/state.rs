//! Run lifecycle driven by player intents.

use thiserror::Error;

/// Lifecycle state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Waiting for the player to start.
    Menu,
    /// Ticks advance the simulation.
    Running,
    /// Ticks are ignored until the player resumes.
    Paused,
    /// The main structure fell; only a retry leaves this state.
    GameOver,
}

/// Player requests that drive lifecycle transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Leave the menu and start the run.
    Start,
    /// Suspend a running game.
    Pause,
    /// Continue a paused game.
    Resume,
    /// Discard the run and return to the menu with a fresh world.
    Retry,
    /// Ask the host to exit.
    Quit,
}

/// Rejected lifecycle requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The intent has no meaning in the current state.
    #[error("{intent:?} is not allowed while {state:?}")]
    InvalidTransition {
        /// State the run was in.
        state: GameState,
        /// Intent that was rejected.
        intent: Intent,
    },
}

/// Outcome of an accepted intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Move to the contained state.
    To(GameState),
    /// Rebuild the world, then move to the menu.
    Reset,
    /// Leave the state untouched and signal the host to exit.
    Exit,
}

pub(crate) fn transition(state: GameState, intent: Intent) -> Result<Transition, IntentError> {
    match (state, intent) {
        (_, Intent::Quit) => Ok(Transition::Exit),
        (GameState::Menu, Intent::Start) => Ok(Transition::To(GameState::Running)),
        (GameState::Running, Intent::Pause) => Ok(Transition::To(GameState::Paused)),
        (GameState::Paused, Intent::Resume) => Ok(Transition::To(GameState::Running)),
        (GameState::Paused | GameState::GameOver, Intent::Retry) => Ok(Transition::Reset),
        (state, intent) => Err(IntentError::InvalidTransition { state, intent }),
    }
}
