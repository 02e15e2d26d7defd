//! Job-name matching over queue listing entries
//!
//! Jobs are never tracked by id. "Is this entry one of mine" is answered by
//! testing each listing entry against the batch's job name, and that test is
//! isolated here so a stricter strategy can replace it without touching the
//! admission loop.

/// Decides whether one rendered listing entry belongs to a job name
pub trait NameMatcher: Send + Sync {
    fn matches(&self, entry: &str, fragment: &str) -> bool;
}

/// Substring containment.
///
/// A fragment shared by unrelated job names overcounts: `"job"` matches both
/// `job_42` and `myjob_overflow`. Callers pick batch names that are unique
/// enough for their queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl NameMatcher for SubstringMatcher {
    fn matches(&self, entry: &str, fragment: &str) -> bool {
        entry.contains(fragment)
    }
}
