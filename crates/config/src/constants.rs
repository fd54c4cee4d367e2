//! Centralized constants for the Fleet Reporter workspace.
//!
//! This module contains default values and hard limits used across crates
//! to avoid magic number duplication. Every limit here is a configuration
//! parameter in disguise: callers may expose it, but should not hardcode it.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default maximum number of retries for rate-limited or unavailable responses.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Upper bound for the configurable retry count.
pub const MAX_MAX_RETRIES: usize = 10;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Path segment of the JSON-RPC endpoint under the server URL.
pub const DEFAULT_API_PATH: &str = "apiv1";

// =============================================================================
// Query Limits
// =============================================================================

/// Maximum number of record categories that can be queried at once.
pub const MAX_SELECTIONS: usize = 15;

/// Hard cap on the per-category result count.
pub const MAX_RESULTS_LIMIT: u32 = 50_000;

/// Per-category result count used when none is given.
pub const DEFAULT_RESULTS_LIMIT: u32 = 500;

/// Result cap for the bulk device load.
pub const DEVICE_CACHE_LIMIT: u32 = 10_000;

/// Result cap for the bulk zone, rule and user loads.
pub const REFERENCE_CACHE_LIMIT: u32 = 5_000;

/// Default report window, counted back from today.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

// =============================================================================
// Presentation Defaults
// =============================================================================

/// Default number of rows per table page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default number of chart groups before the rest collapse into "Others".
pub const DEFAULT_MAX_CHART_GROUPS: usize = 20;
