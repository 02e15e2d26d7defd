// Admission state machine (one batch at a time)

use crate::domain::DomainError;
use std::fmt;

/// Where a controller is in its submit/drain protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionState {
    /// No call in progress
    Idle,
    /// Reading the outstanding count, or waiting to re-read it
    Polling,
    /// Handing one job to the scheduler
    Submitting,
    /// Waiting for the batch's jobs to leave the queue
    Draining,
    /// Call finished
    Done,
}

impl AdmissionState {
    /// Validate and perform a transition
    ///
    /// Valid transitions:
    /// - Idle -> Polling | Draining | Done
    /// - Polling -> Submitting
    /// - Submitting -> Polling | Draining | Done
    /// - Draining -> Done
    pub fn transition_to(&mut self, next: AdmissionState) -> Result<(), DomainError> {
        use AdmissionState::*;

        let valid = matches!(
            (*self, next),
            (Idle, Polling)
                | (Idle, Draining)
                | (Idle, Done)
                | (Polling, Submitting)
                | (Submitting, Polling)
                | (Submitting, Draining)
                | (Submitting, Done)
                | (Draining, Done)
        );

        if !valid {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for AdmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdmissionState::Idle => "IDLE",
            AdmissionState::Polling => "POLLING",
            AdmissionState::Submitting => "SUBMITTING",
            AdmissionState::Draining => "DRAINING",
            AdmissionState::Done => "DONE",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_then_drain_path() {
        let mut state = AdmissionState::Idle;
        for next in [
            AdmissionState::Polling,
            AdmissionState::Submitting,
            AdmissionState::Polling,
            AdmissionState::Submitting,
            AdmissionState::Draining,
            AdmissionState::Done,
        ] {
            assert!(state.transition_to(next).is_ok(), "-> {}", next);
        }
        assert_eq!(state, AdmissionState::Done);
    }

    #[test]
    fn test_cannot_submit_without_polling() {
        let mut state = AdmissionState::Idle;
        let err = state.transition_to(AdmissionState::Submitting).unwrap_err();

        assert_eq!(
            err,
            DomainError::InvalidStateTransition {
                from: "IDLE".to_string(),
                to: "SUBMITTING".to_string()
            }
        );
        assert_eq!(state, AdmissionState::Idle);
    }

    #[test]
    fn test_draining_only_finishes() {
        let mut state = AdmissionState::Draining;
        assert!(state.transition_to(AdmissionState::Polling).is_err());
        assert!(state.transition_to(AdmissionState::Done).is_ok());
    }
}
