//! Price refresh constants.

use chrono::Duration;

/// A record becomes eligible for refresh once its `updated_at` is older than this.
pub const STALE_AFTER_MINUTES: i64 = 5;

/// At or below this many remaining requests, a cycle makes no further calls.
pub const QUOTA_EXHAUSTION_FLOOR: i64 = 5;

/// Requests held back from the remaining quota before splitting it.
pub const QUOTA_RESERVE: i64 = 4;

/// Each refreshed symbol costs one realtime price call and one quote call
/// within the same window, so the usable quota is divided by this.
pub const CALLS_PER_SYMBOL: i64 = 2;

/// Pause between the bulk write and the snapshot read-back.
pub const POST_WRITE_DELAY_MS: u64 = 2_000;

/// Where the public snapshot lives in the document store.
pub const SNAPSHOT_PROJECT: &str = "market-data";
pub const SNAPSHOT_FOLDER: &str = "assets";
pub const SNAPSHOT_NAME: &str = "prices";

pub fn stale_after() -> Duration {
    Duration::minutes(STALE_AFTER_MINUTES)
}
