// Application Layer - Use Cases and Business Logic

pub mod admission;
pub mod constants;
pub mod inspector;
pub mod shutdown;
pub mod submitter;

// Re-exports
pub use admission::{AdmissionController, AdmissionState};
pub use inspector::QueueInspector;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use submitter::JobSubmitter;
