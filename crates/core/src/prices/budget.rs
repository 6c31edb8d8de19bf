//! Rate budget allocation.
//!
//! Turns the quota left in the provider's current window into the number of
//! symbols a cycle may refresh. Every refreshed symbol costs one realtime
//! price call and one quote call.

use crate::constants::{CALLS_PER_SYMBOL, QUOTA_EXHAUSTION_FLOOR, QUOTA_RESERVE};

/// What the allocator decided for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Too little quota left; the cycle must stop before any further call.
    Exhausted { remaining: i64 },
    /// The cycle may refresh up to `budget` symbols.
    Available { remaining: i64, budget: usize },
}

impl QuotaDecision {
    pub fn remaining(&self) -> i64 {
        match self {
            QuotaDecision::Exhausted { remaining } | QuotaDecision::Available { remaining, .. } => {
                *remaining
            }
        }
    }
}

/// Computes the symbol budget from the plan ceiling and the usage so far.
///
/// `remaining` may be negative when usage exceeds the plan.
pub fn allocate_budget(plan_limit: u32, current_usage: u32) -> QuotaDecision {
    let remaining = i64::from(plan_limit) - i64::from(current_usage);

    if remaining <= QUOTA_EXHAUSTION_FLOOR {
        return QuotaDecision::Exhausted { remaining };
    }

    let budget = ((remaining - QUOTA_RESERVE) / CALLS_PER_SYMBOL).max(0);

    QuotaDecision::Available {
        remaining,
        budget: usize::try_from(budget).unwrap_or(0),
    }
}
