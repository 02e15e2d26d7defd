// Port Layer - Interfaces for external dependencies

pub mod id_provider; // Script file naming
pub mod observer;
pub mod queue_backend;
pub mod script_materializer;
pub mod sleeper; // For deterministic polling tests
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use observer::{NoopObserver, SubmissionObserver};
pub use queue_backend::{QueryError, QueueBackend, SubmissionError, SubmitReceipt, SubmitRequest};
pub use script_materializer::{MaterializedScript, ScriptError, ScriptMaterializer};
pub use sleeper::{Sleeper, TokioSleeper};
pub use time_provider::TimeProvider;
