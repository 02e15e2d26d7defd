// Queue Backend Port
// Abstraction over the external batch scheduler (listing + submission)

use crate::domain::Principal;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::script_materializer::ScriptError;

/// Queue listing failures. Never retried by the caller.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Listing exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Unreadable listing output: {0}")]
    InvalidOutput(String),
}

/// Submission failures. At most one attempt is made per command.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Job script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Submit rejected with status {code:?}: {stderr}")]
    Rejected { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(String),
}

/// One job handed to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub script_path: PathBuf,
    pub job_name: String,
    pub extra_options: String,
    pub queue: Option<String>,
}

/// Scheduler acknowledgement (synchronous, not a completion notice)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub message: String,
}

/// Queue Backend trait
///
/// Implementations:
/// - SgeBackend: runs `qstat` / `qsub` (infra-system)
/// - mocks::InMemoryQueue: scripted listings for tests
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Plain row-oriented listing of the principal's outstanding jobs.
    /// Includes the backend's fixed header rows when non-empty.
    async fn list_jobs(
        &self,
        principal: &Principal,
        queue: Option<&str>,
    ) -> Result<String, QueryError>;

    /// Structured listing, one rendered entry per outstanding job.
    /// Entries carry the full job name (the plain listing truncates it).
    async fn list_jobs_structured(
        &self,
        principal: &Principal,
        queue: Option<&str>,
    ) -> Result<Vec<String>, QueryError>;

    /// Enqueue a materialized script
    ///
    /// # Errors
    /// - SubmissionError::SpawnFailed if the submit command cannot be started
    /// - SubmissionError::Rejected if it exits non-zero
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Fixed header the plain listing carries when non-empty
    pub const HEADER: &str = "job-ID  prior   name       user         state submit/start at     queue\n\
-----------------------------------------------------------------------------------------------------------------\n";

    /// Render a plain listing with `n` job rows (empty when `n == 0`)
    pub fn plain_listing(n: usize) -> String {
        if n == 0 {
            return String::new();
        }
        let mut out = HEADER.to_string();
        for i in 0..n {
            out.push_str(&format!(
                "{:>7} 0.50000 job_{:<6} alice        r     01/01/2024 00:00:00 all.q@node{}\n",
                100 + i,
                i,
                i
            ));
        }
        out
    }

    #[derive(Default)]
    struct State {
        plain: VecDeque<Result<String, String>>,
        last_plain: String,
        structured: VecDeque<Result<Vec<String>, String>>,
        last_structured: Vec<String>,
        submissions: Vec<SubmitRequest>,
        submit_failure: Option<String>,
        plain_calls: usize,
        structured_calls: usize,
    }

    /// Deterministic in-memory queue.
    ///
    /// Listings are scripted as sequences; once a sequence runs out the last
    /// value repeats, so "always 0" is a single entry.
    #[derive(Clone, Default)]
    pub struct InMemoryQueue {
        state: Arc<Mutex<State>>,
    }

    impl InMemoryQueue {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script total-count polls: each count becomes a plain listing
        pub fn with_counts(self, counts: &[usize]) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.plain = counts.iter().map(|&n| Ok(plain_listing(n))).collect();
            }
            self
        }

        /// Script raw plain listings
        pub fn with_plain_listings(self, listings: &[&str]) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.plain = listings.iter().map(|s| Ok(s.to_string())).collect();
            }
            self
        }

        /// Script drain polls: each count becomes a listing of that many matching names
        pub fn with_matching_counts(self, job_name: &str, counts: &[usize]) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.structured = counts
                    .iter()
                    .map(|&n| Ok(vec![job_name.to_string(); n]))
                    .collect();
            }
            self
        }

        /// Script structured listings by job names
        pub fn with_structured_names(self, names: &[&str]) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                let entries = names.iter().map(|n| n.to_string()).collect();
                state.structured = VecDeque::from(vec![Ok(entries)]);
            }
            self
        }

        /// Make the next plain listing fail
        pub fn fail_plain_listing(self, message: impl Into<String>) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.plain.push_front(Err(message.into()));
            }
            self
        }

        /// Make the next structured listing fail
        pub fn fail_structured_listing(self, message: impl Into<String>) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.structured.push_front(Err(message.into()));
            }
            self
        }

        /// Reject every submission
        pub fn reject_submissions(self, stderr: impl Into<String>) -> Self {
            self.state.lock().unwrap().submit_failure = Some(stderr.into());
            self
        }

        pub fn submissions(&self) -> Vec<SubmitRequest> {
            self.state.lock().unwrap().submissions.clone()
        }

        pub fn plain_calls(&self) -> usize {
            self.state.lock().unwrap().plain_calls
        }

        pub fn structured_calls(&self) -> usize {
            self.state.lock().unwrap().structured_calls
        }
    }

    fn next_listing<T: Clone>(
        queue: &mut VecDeque<Result<T, String>>,
        last: &mut T,
    ) -> Result<T, QueryError> {
        match queue.pop_front() {
            Some(Ok(listing)) => {
                *last = listing.clone();
                Ok(listing)
            }
            Some(Err(message)) => Err(QueryError::NonZeroExit {
                code: Some(1),
                stderr: message,
            }),
            None => Ok(last.clone()),
        }
    }

    #[async_trait]
    impl QueueBackend for InMemoryQueue {
        async fn list_jobs(
            &self,
            _principal: &Principal,
            _queue: Option<&str>,
        ) -> Result<String, QueryError> {
            let mut state = self.state.lock().unwrap();
            state.plain_calls += 1;
            let State {
                plain, last_plain, ..
            } = &mut *state;
            next_listing(plain, last_plain)
        }

        async fn list_jobs_structured(
            &self,
            _principal: &Principal,
            _queue: Option<&str>,
        ) -> Result<Vec<String>, QueryError> {
            let mut state = self.state.lock().unwrap();
            state.structured_calls += 1;
            let State {
                structured,
                last_structured,
                ..
            } = &mut *state;
            next_listing(structured, last_structured)
        }

        async fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError> {
            let mut state = self.state.lock().unwrap();
            if let Some(stderr) = &state.submit_failure {
                return Err(SubmissionError::Rejected {
                    code: Some(1),
                    stderr: stderr.clone(),
                });
            }
            state.submissions.push(request.clone());
            Ok(SubmitReceipt {
                message: format!(
                    "Your job {} (\"{}\") has been submitted",
                    state.submissions.len(),
                    request.job_name
                ),
            })
        }
    }
}
