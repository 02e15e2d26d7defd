//! Queue Inspector - translates queue listings into counts
//!
//! The scheduler is the only source of truth: no local registry of submitted
//! jobs is kept, every count is re-derived from a fresh listing.

use crate::application::constants::LISTING_HEADER_ROWS;
use crate::domain::{NameMatcher, Principal, QueueSnapshot, SubstringMatcher};
use crate::port::{NoopObserver, QueryError, QueueBackend, SubmissionObserver};
use std::sync::Arc;
use tracing::debug;

/// Read-only view of the principal's jobs in the queue
pub struct QueueInspector {
    backend: Arc<dyn QueueBackend>,
    queue_name: Option<String>,
    matcher: Arc<dyn NameMatcher>,
    observer: Arc<dyn SubmissionObserver>,
    verbose: bool,
}

impl QueueInspector {
    /// Create an inspector scoped to `queue_name` (`None` = default queue),
    /// matching names by substring and reporting nothing.
    pub fn new(backend: Arc<dyn QueueBackend>, queue_name: Option<String>) -> Self {
        Self {
            backend,
            queue_name,
            matcher: Arc::new(SubstringMatcher),
            observer: Arc::new(NoopObserver),
            verbose: false,
        }
    }

    /// Replace the name predicate used by [`count_by_name_fragment`](Self::count_by_name_fragment)
    pub fn with_matcher(mut self, matcher: Arc<dyn NameMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Report fragment counts to `observer` when `verbose`
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>, verbose: bool) -> Self {
        self.observer = observer;
        self.verbose = verbose;
        self
    }

    /// Total outstanding jobs for `principal`.
    ///
    /// Counts non-blank listing rows and removes the fixed header rows,
    /// floored at zero (an empty listing has no header at all).
    pub async fn count_total(&self, principal: &Principal) -> Result<usize, QueryError> {
        let listing = self
            .backend
            .list_jobs(principal, self.queue_name.as_deref())
            .await?;

        let rows = listing.lines().filter(|line| !line.trim().is_empty()).count();
        let total = rows.saturating_sub(LISTING_HEADER_ROWS);

        debug!(principal = %principal, rows, total, "Counted outstanding jobs");
        Ok(total)
    }

    /// Outstanding entries whose text contains `fragment`.
    ///
    /// Substring semantics: unrelated jobs whose names share the fragment are
    /// counted too.
    pub async fn count_by_name_fragment(
        &self,
        principal: &Principal,
        fragment: &str,
    ) -> Result<usize, QueryError> {
        let entries = self
            .backend
            .list_jobs_structured(principal, self.queue_name.as_deref())
            .await?;

        let matching = entries
            .iter()
            .filter(|entry| self.matcher.matches(entry, fragment))
            .count();

        debug!(
            principal = %principal,
            fragment = %fragment,
            entries = entries.len(),
            matching,
            "Counted jobs by name fragment"
        );

        if self.verbose {
            self.observer.drain_status(matching, fragment);
        }
        Ok(matching)
    }

    /// Both counts in one read (matching count only when `fragment` is given)
    pub async fn snapshot(
        &self,
        principal: &Principal,
        fragment: Option<&str>,
    ) -> Result<QueueSnapshot, QueryError> {
        let total_count = self.count_total(principal).await?;
        let matching_count = match fragment {
            Some(fragment) => Some(self.count_by_name_fragment(principal, fragment).await?),
            None => None,
        };
        Ok(QueueSnapshot {
            total_count,
            matching_count,
        })
    }
}
