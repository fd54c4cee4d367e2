//! Report presentation defaults.
//!
//! Invariants:
//! - `results_limit` is always within `1..=MAX_RESULTS_LIMIT`.
//! - `page_size` and `max_chart_groups` are always at least 1.

use crate::constants::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_CHART_GROUPS, DEFAULT_PAGE_SIZE, DEFAULT_RESULTS_LIMIT,
};
use serde::{Deserialize, Serialize};

/// Defaults applied to every report run unless overridden per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefaults {
    /// Maximum rows requested per category.
    pub results_limit: u32,
    /// Rows per table page.
    pub page_size: usize,
    /// Chart groups shown before the remainder collapses into "Others".
    pub max_chart_groups: usize,
    /// Length of the default report window in days.
    pub lookback_days: u32,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            results_limit: DEFAULT_RESULTS_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            max_chart_groups: DEFAULT_MAX_CHART_GROUPS,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}
