//! Query engine: one batched remote call for every selected category.
//!
//! Responsibilities:
//! - Turn a [`QuerySelection`] into one `Get` call per category, with the
//!   search filter assembled from the category's declared needs.
//! - Send all calls as a single batch and map result slots back to
//!   categories by position.
//! - Report coarse progress before dispatch and after completion.
//!
//! Does NOT handle:
//! - Validating the selection (empty selection, missing diagnostic); the
//!   session does that before calling in.
//! - Partial results: a failed batch fails the whole run.
//!
//! Invariants:
//! - Exactly one `batch_fetch` per run with at least one known category;
//!   none for an empty run.
//! - Slot `i` belongs to call `i`; a missing or null slot is an empty row set.

use chrono::{DateTime, SecondsFormat, Utc};
use fleet_client::models::json_kind;
use fleet_client::{ApiCall, ClientError, DataSource, GetParams, IdRef, SearchFilter};
use fleet_config::constants::{DEFAULT_RESULTS_LIMIT, MAX_RESULTS_LIMIT};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::registry::{self, CategoryDefinition};

/// What to query: categories plus the filters shared by all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySelection {
    categories: Vec<String>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
    device_id: Option<String>,
    diagnostic_id: Option<String>,
    results_limit: u32,
}

impl Default for QuerySelection {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            from_date: None,
            to_date: None,
            device_id: None,
            diagnostic_id: None,
            results_limit: DEFAULT_RESULTS_LIMIT,
        }
    }
}

impl QuerySelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the categories, dropping repeats but keeping first-seen order.
    pub fn with_categories<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.clear();
        for key in keys {
            let key = key.into();
            if !self.categories.contains(&key) {
                self.categories.push(key);
            }
        }
        self
    }

    pub fn with_date_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from_date = Some(from);
        self.to_date = Some(to);
        self
    }

    /// Restrict every category to one device. Blank ids clear the filter.
    pub fn with_device(mut self, device_id: Option<&str>) -> Self {
        self.device_id = device_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        self
    }

    /// Diagnostic for categories that need one. Blank ids clear it.
    pub fn with_diagnostic(mut self, diagnostic_id: Option<&str>) -> Self {
        self.diagnostic_id = diagnostic_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        self
    }

    /// Per-category row cap: 0 means the default, larger values are capped.
    pub fn with_results_limit(mut self, limit: u32) -> Self {
        self.results_limit = match limit {
            0 => DEFAULT_RESULTS_LIMIT,
            n => n.min(MAX_RESULTS_LIMIT),
        };
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn from_date(&self) -> Option<DateTime<Utc>> {
        self.from_date
    }

    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        self.to_date
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn diagnostic_id(&self) -> Option<&str> {
        self.diagnostic_id.as_deref()
    }

    pub fn results_limit(&self) -> u32 {
        self.results_limit
    }
}

/// Build one call per known category, in selection order.
pub fn build_calls(selection: &QuerySelection) -> Vec<(&'static CategoryDefinition, ApiCall)> {
    selection
        .categories
        .iter()
        .filter_map(|key| {
            let category = registry::category(key);
            if category.is_none() {
                warn!(category = %key, "Skipping unknown category");
            }
            category
        })
        .map(|category| (category, call_for(category, selection)))
        .collect()
}

fn call_for(category: &CategoryDefinition, selection: &QuerySelection) -> ApiCall {
    let mut search = SearchFilter::default();

    if category.needs_date_range {
        search.from_date = selection.from_date.map(wire_date);
        search.to_date = selection.to_date.map(wire_date);
    }
    if let Some(device_id) = &selection.device_id {
        search.device_search = Some(IdRef::new(device_id));
    }
    if category.is_principal_filter_only {
        search.is_driver = Some(true);
    }
    if category.needs_diagnostic {
        if let Some(diagnostic_id) = &selection.diagnostic_id {
            search.diagnostic_search = Some(IdRef::new(diagnostic_id));
        }
    }

    debug!(
        category = category.key,
        filter = ?search,
        limit = selection.results_limit,
        "Built query call"
    );

    ApiCall::get(GetParams {
        type_name: category.type_name.to_string(),
        search,
        results_limit: selection.results_limit,
    })
}

fn wire_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Row sets per category, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResults {
    entries: Vec<(&'static str, Vec<Value>)>,
}

impl QueryResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows for `key`, if the category was part of the run.
    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn total_rows(&self) -> usize {
        self.entries.iter().map(|(_, rows)| rows.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[Value])> {
        self.entries.iter().map(|(k, rows)| (*k, rows.as_slice()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: &'static str, rows: Vec<Value>) {
        self.entries.push((key, rows));
    }
}

/// Run every selected category as one batch.
///
/// `progress` receives advisory messages; it cannot influence the run.
pub async fn run_queries<D, P>(
    source: &D,
    selection: &QuerySelection,
    mut progress: P,
) -> Result<QueryResults, ClientError>
where
    D: DataSource,
    P: FnMut(&str) + Send,
{
    let planned = build_calls(selection);
    if planned.is_empty() {
        debug!("No categories to query");
        return Ok(QueryResults::new());
    }

    let (categories, calls): (Vec<&'static CategoryDefinition>, Vec<ApiCall>) =
        planned.into_iter().unzip();
    progress(&format!("Querying {} data type(s)...", calls.len()));

    let mut slots = source.batch_fetch(&calls).await?.into_iter();

    let mut results = QueryResults::new();
    for category in categories {
        let rows = match slots.next().flatten() {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!(
                    category = category.key,
                    kind = json_kind(&other),
                    "Result slot is not an array, treating as empty"
                );
                Vec::new()
            }
        };
        results.push(category.key, rows);
    }

    let total = results.total_rows();
    progress(&format!("Retrieved {total} total records."));
    info!(categories = results.len(), total, "Query batch completed");

    Ok(results)
}
