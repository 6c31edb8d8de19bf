//! Rate limiting configuration for a provider plan.

/// Default per-minute request ceiling of the plan the worker runs against.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 55;

/// Describes the request quota a provider enforces.
///
/// The quota is counted in credits; a batched request uses one per symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum credits allowed per rolling minute.
    pub requests_per_minute: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}
