// Domain Layer - Pure value types and rules, no I/O

pub mod config;
pub mod environment;
pub mod error;
pub mod matcher;
pub mod principal;
pub mod script;
pub mod snapshot;

// Re-exports
pub use config::SubmissionConfig;
pub use environment::JobEnvironment;
pub use error::DomainError;
pub use matcher::{NameMatcher, SubstringMatcher};
pub use principal::Principal;
pub use script::JobScript;
pub use snapshot::QueueSnapshot;
