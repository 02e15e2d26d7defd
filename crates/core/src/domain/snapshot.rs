// QueueSnapshot - one fresh read of the queue, never cached

use serde::Serialize;

/// Counts derived from a single inspection of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    /// Outstanding jobs listed for the principal
    pub total_count: usize,
    /// Entries matching a name fragment, when a fragment was given
    pub matching_count: Option<usize>,
}
