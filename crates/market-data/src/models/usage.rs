use serde::{Deserialize, Serialize};

/// Usage of the provider's per-minute request quota.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Requests already consumed in the current window.
    pub current_usage: u32,
    /// Requests allowed per window by the plan.
    pub plan_limit: u32,
}
