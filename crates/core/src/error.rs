// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Queue query failed: {0}")]
    Query(#[from] crate::port::QueryError),

    #[error("Job submission failed: {0}")]
    Submission(#[from] crate::port::SubmissionError),

    #[error("Cancelled while {0}")]
    Cancelled(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
