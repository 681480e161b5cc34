//! Capture session state machine

use std::fmt;
use thiserror::Error;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Acquiring,
    Recording,
    Stopping,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Tracks which capture state a session is in.
///
/// State machine:
///   IDLE -> ACQUIRING (begin_acquiring)
///   ACQUIRING -> RECORDING (acquired)
///   ACQUIRING -> IDLE (acquisition_failed)
///   RECORDING -> STOPPING (begin_stopping)
///   STOPPING -> IDLE (stopped)
#[derive(Debug, Default)]
pub struct CaptureLifecycle {
    state: CaptureState,
}

impl CaptureLifecycle {
    /// Create a lifecycle in idle state
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Transition from IDLE to ACQUIRING
    pub fn begin_acquiring(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(CaptureState::Idle, CaptureState::Acquiring, "start recording")
    }

    /// Transition from ACQUIRING to RECORDING
    pub fn acquired(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            CaptureState::Acquiring,
            CaptureState::Recording,
            "begin capture",
        )
    }

    /// Transition from ACQUIRING back to IDLE
    pub fn acquisition_failed(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(CaptureState::Acquiring, CaptureState::Idle, "abort acquisition")
    }

    /// Transition from RECORDING to STOPPING
    pub fn begin_stopping(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(CaptureState::Recording, CaptureState::Stopping, "stop recording")
    }

    /// Transition from STOPPING to IDLE
    pub fn stopped(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(CaptureState::Stopping, CaptureState::Idle, "finish stopping")
    }

    fn transition(
        &mut self,
        from: CaptureState,
        to: CaptureState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != from {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }
}
