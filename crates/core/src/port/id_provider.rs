// ID Provider Port (unique names for transient job scripts)

/// ID provider interface (allows deterministic script names in tests)
pub trait IdProvider: Send + Sync {
    /// Generate an id unique among concurrently materialized scripts
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Yields "1", "2", "3", ...
    #[derive(Default)]
    pub struct SequentialIdProvider {
        next: AtomicUsize,
    }

    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self) -> String {
            (self.next.fetch_add(1, Ordering::SeqCst) + 1).to_string()
        }
    }
}
