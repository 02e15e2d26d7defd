// Time Provider Port (wall clock, used to report how long a job waited for admission)

/// Time provider interface (allows fixed clocks in tests)
pub trait TimeProvider: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    /// Advances `step` milliseconds on every read
    pub struct SteppingClock {
        now: AtomicI64,
        step: i64,
        reads: AtomicUsize,
    }

    impl SteppingClock {
        pub fn new(start_millis: i64, step: i64) -> Self {
            Self {
                now: AtomicI64::new(start_millis),
                step,
                reads: AtomicUsize::new(0),
            }
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl TimeProvider for SteppingClock {
        fn now_millis(&self) -> i64 {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.now.fetch_add(self.step, Ordering::SeqCst)
        }
    }
}
