//! Per-day activity counters, keyed by calendar date in the aggregate.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    /// Items flagged learned on this date.
    pub learned: u32,
    /// Ratings applied on this date.
    pub reviewed: u32,
    /// Accumulated drill time reported by sessions on this date.
    pub total_time_seconds: u64,
}
