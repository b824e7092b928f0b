use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Why a run left the Running state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Completed,
    Cancelled,
    Failed { error_msg: String },
}

/// Runner execution states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunnerState {
    Idle,
    Running {
        #[serde(skip)]
        start_time: Option<Instant>,
        task_id: u64,
        cycles: u64,
    },
    Stopped {
        #[serde(skip)]
        duration: Option<Duration>,
        cycles: u64,
        reason: StopReason,
    },
}

impl RunnerState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &RunnerState) -> bool {
        use RunnerState::*;

        matches!(
            (self, target),
            // From Idle
            (Idle, Running { .. }) |

            // From Running
            (Running { .. }, Running { .. }) |
            (Running { .. }, Stopped { .. }) |

            // From Stopped
            (Stopped { .. }, Running { .. }) |
            (Stopped { .. }, Idle)
        )
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Stopped { .. } => "Stopped",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

impl Default for RunnerState {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> RunnerState {
        RunnerState::Running {
            start_time: None,
            task_id: 1,
            cycles: 0,
        }
    }

    fn stopped(reason: StopReason) -> RunnerState {
        RunnerState::Stopped {
            duration: None,
            cycles: 3,
            reason,
        }
    }

    #[test]
    fn test_valid_transitions() {
        let idle = RunnerState::Idle;

        assert!(idle.can_transition_to(&running()));
        assert!(!running().can_transition_to(&idle));
        assert!(running().can_transition_to(&stopped(StopReason::Completed)));
    }

    #[test]
    fn test_idle_cannot_stop() {
        assert!(!RunnerState::Idle.can_transition_to(&stopped(StopReason::Cancelled)));
    }

    #[test]
    fn test_stopped_can_restart_or_reset() {
        let failed = stopped(StopReason::Failed {
            error_msg: "boom".to_string(),
        });

        assert!(failed.can_transition_to(&RunnerState::Idle));
        assert!(failed.can_transition_to(&running()));
    }
}
