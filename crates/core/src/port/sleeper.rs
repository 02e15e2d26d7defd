// Sleeper Port (for deterministic testing of the polling loops)

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the caller between queue polls
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Tokio timer sleeper (production)
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::application::shutdown::ShutdownSender;
    use std::sync::{Arc, Mutex};

    /// Returns immediately and records every requested wait.
    ///
    /// With `shutdown_after`, the sender fires once the given number of waits
    /// has been recorded, which bounds loops that would otherwise never end.
    #[derive(Clone, Default)]
    pub struct RecordingSleeper {
        sleeps: Arc<Mutex<Vec<Duration>>>,
        shutdown: Option<(usize, Arc<ShutdownSender>)>,
    }

    impl RecordingSleeper {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shutdown_after(limit: usize, sender: ShutdownSender) -> Self {
            Self {
                sleeps: Arc::default(),
                shutdown: Some((limit, Arc::new(sender))),
            }
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }

        pub fn count(&self) -> usize {
            self.sleeps.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            let count = {
                let mut sleeps = self.sleeps.lock().unwrap();
                sleeps.push(duration);
                sleeps.len()
            };
            if let Some((limit, sender)) = &self.shutdown {
                if count >= *limit {
                    sender.shutdown();
                }
            }
            tokio::task::yield_now().await;
        }
    }
}
