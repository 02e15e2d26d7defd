// Admission constants (no magic values)
use std::time::Duration;

/// Default ceiling on outstanding jobs for one principal
pub const DEFAULT_MAX_OUTSTANDING_JOBS: u32 = 100;

/// Default wait between queue polls (60s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Header rows the plain queue listing prints before the first job row
/// (column titles plus a dashed rule)
pub const LISTING_HEADER_ROWS: usize = 2;

/// Pause after each submit call before the script is removed; also spaces
/// consecutive submissions apart
pub const SUBMIT_SETTLE_DELAY: Duration = Duration::from_secs(1);
