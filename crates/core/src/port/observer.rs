// Submission Observer Port
// Progress reporting channel for verbose mode (console, logs, tests)

/// Receives progress events from the inspector and the controller.
///
/// Only called when the controller's config is verbose. All methods default
/// to no-ops.
pub trait SubmissionObserver: Send + Sync {
    /// Outstanding job count observed on an admission poll
    fn queue_load(&self, _outstanding: usize, _ceiling: u32) {}

    /// A job was handed to the scheduler
    fn submitted(&self, _job_name: &str, _acknowledgement: &str) {}

    /// Entries matching a batch name observed on a drain poll
    fn drain_status(&self, _matching: usize, _fragment: &str) {}

    /// The transient script could not be removed (non-fatal)
    fn cleanup_failed(&self, _path: &std::path::Path, _reason: &str) {}
}

/// Observer that discards everything
pub struct NoopObserver;

impl SubmissionObserver for NoopObserver {}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recorded progress event
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ObservedEvent {
        QueueLoad { outstanding: usize, ceiling: u32 },
        Submitted { job_name: String },
        DrainStatus { matching: usize, fragment: String },
        CleanupFailed { path: String },
    }

    #[derive(Clone, Default)]
    pub struct RecordingObserver {
        events: Arc<Mutex<Vec<ObservedEvent>>>,
    }

    impl RecordingObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ObservedEvent> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: ObservedEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl SubmissionObserver for RecordingObserver {
        fn queue_load(&self, outstanding: usize, ceiling: u32) {
            self.push(ObservedEvent::QueueLoad {
                outstanding,
                ceiling,
            });
        }

        fn submitted(&self, job_name: &str, _acknowledgement: &str) {
            self.push(ObservedEvent::Submitted {
                job_name: job_name.to_string(),
            });
        }

        fn drain_status(&self, matching: usize, fragment: &str) {
            self.push(ObservedEvent::DrainStatus {
                matching,
                fragment: fragment.to_string(),
            });
        }

        fn cleanup_failed(&self, path: &std::path::Path, _reason: &str) {
            self.push(ObservedEvent::CleanupFailed {
                path: path.display().to_string(),
            });
        }
    }
}
