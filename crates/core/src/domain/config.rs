// Submission configuration (immutable once a controller is built)

use super::error::{DomainError, Result};
use crate::application::constants::{DEFAULT_MAX_OUTSTANDING_JOBS, DEFAULT_POLL_INTERVAL};
use std::time::Duration;

/// Settings that govern one admission controller.
///
/// Fields are private: a config is validated once in [`SubmissionConfig::new`]
/// and never mutated afterwards, so the ceiling and the poll interval stay
/// fixed for the lifetime of the controller that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    queue_name: Option<String>,
    extra_submit_options: String,
    max_outstanding_jobs: u32,
    poll_interval: Duration,
    verbose: bool,
}

impl SubmissionConfig {
    /// Build a validated config.
    ///
    /// # Arguments
    /// * `queue_name` - Target queue; `None` or an empty string means the default queue
    /// * `extra_submit_options` - Raw options appended to every submit call
    /// * `max_outstanding_jobs` - Ceiling on jobs listed for the principal
    /// * `poll_interval` - Wait between queue polls, must be non-zero
    /// * `verbose` - Report progress to the observer
    ///
    /// A ceiling of 0 is accepted: a controller built with it never admits
    /// anything and polls until cancelled.
    pub fn new(
        queue_name: Option<String>,
        extra_submit_options: impl Into<String>,
        max_outstanding_jobs: u32,
        poll_interval: Duration,
        verbose: bool,
    ) -> Result<Self> {
        if poll_interval.is_zero() {
            return Err(DomainError::ValidationError(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let queue_name = queue_name
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        if let Some(queue) = &queue_name {
            if queue.chars().any(char::is_whitespace) {
                return Err(DomainError::ValidationError(format!(
                    "queue name '{}' contains whitespace",
                    queue
                )));
            }
        }

        Ok(Self {
            queue_name,
            extra_submit_options: extra_submit_options.into(),
            max_outstanding_jobs,
            poll_interval,
            verbose,
        })
    }

    pub fn queue_name(&self) -> Option<&str> {
        self.queue_name.as_deref()
    }

    pub fn extra_submit_options(&self) -> &str {
        &self.extra_submit_options
    }

    pub fn max_outstanding_jobs(&self) -> u32 {
        self.max_outstanding_jobs
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            queue_name: None,
            extra_submit_options: String::new(),
            max_outstanding_jobs: DEFAULT_MAX_OUTSTANDING_JOBS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            verbose: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubmissionConfig::default();

        assert_eq!(config.queue_name(), None);
        assert_eq!(config.extra_submit_options(), "");
        assert_eq!(config.max_outstanding_jobs(), 100);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert!(config.verbose());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = SubmissionConfig::new(None, "", 10, Duration::ZERO, false);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("poll interval"));
    }

    #[test]
    fn test_empty_queue_name_means_default_queue() {
        let config =
            SubmissionConfig::new(Some("  ".to_string()), "", 10, Duration::from_secs(1), false)
                .unwrap();
        assert_eq!(config.queue_name(), None);
    }

    #[test]
    fn test_queue_name_with_whitespace_rejected() {
        let result = SubmissionConfig::new(
            Some("all.q -l h_vmem=4G".to_string()),
            "",
            10,
            Duration::from_secs(1),
            false,
        );
        assert!(result.unwrap_err().to_string().contains("whitespace"));
    }

    #[test]
    fn test_zero_ceiling_is_accepted() {
        let config = SubmissionConfig::new(None, "", 0, Duration::from_secs(1), true).unwrap();
        assert_eq!(config.max_outstanding_jobs(), 0);
    }
}
