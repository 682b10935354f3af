//! Engine lifecycle state machine
//!
//! Valid transitions:
//! 1. Uninitialized → Initializing (on: Begin)
//! 2. Initializing  → Ready        (on: Complete)
//! 3. Initializing  → Uninitialized (on: Fail)
//! 4. Ready         → Ready        (any event; setup never repeats)

use crate::errors::{PredictError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Collaborators not set up yet
    #[default]
    Uninitialized,
    /// Setup in progress
    Initializing,
    /// Serving requests
    Ready,
}

/// Events that drive lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Begin,
    Complete,
    Fail,
}

impl EngineState {
    /// Attempt a transition, rejecting edges not listed above
    pub fn transition(&self, event: LifecycleEvent) -> Result<EngineState> {
        use EngineState::*;
        use LifecycleEvent::*;

        let next = match (self, event) {
            (Uninitialized, Begin) => Initializing,
            (Initializing, Complete) => Ready,
            (Initializing, Fail) => Uninitialized,
            (Ready, _) => Ready,
            (from, event) => {
                return Err(PredictError::InvalidTransition {
                    from: from.as_str().to_string(),
                    to: format!("(via {:?})", event),
                    reason: format!("No valid transition from {} on {:?}", from.as_str(), event),
                });
            }
        };

        Ok(next)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready => "ready",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert_eq!(
            EngineState::Uninitialized.transition(LifecycleEvent::Begin).unwrap(),
            EngineState::Initializing
        );
        assert_eq!(
            EngineState::Initializing.transition(LifecycleEvent::Complete).unwrap(),
            EngineState::Ready
        );
        assert_eq!(
            EngineState::Initializing.transition(LifecycleEvent::Fail).unwrap(),
            EngineState::Uninitialized
        );
    }

    #[test]
    fn test_ready_is_absorbing() {
        for event in [LifecycleEvent::Begin, LifecycleEvent::Complete, LifecycleEvent::Fail] {
            assert_eq!(EngineState::Ready.transition(event).unwrap(), EngineState::Ready);
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(EngineState::Uninitialized
            .transition(LifecycleEvent::Complete)
            .is_err());
        assert!(EngineState::Initializing
            .transition(LifecycleEvent::Begin)
            .is_err());

        let err = EngineState::Uninitialized
            .transition(LifecycleEvent::Fail)
            .unwrap_err();
        assert!(matches!(err, PredictError::InvalidTransition { .. }));
    }

    #[test]
    fn test_default_and_ready() {
        assert_eq!(EngineState::default(), EngineState::Uninitialized);
        assert!(EngineState::Ready.is_ready());
        assert!(!EngineState::Initializing.is_ready());
    }
}
