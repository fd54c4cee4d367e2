//! Report session: the state a host surface drives between user actions.
//!
//! Responsibilities:
//! - Own the data source, lookup cache, category selection, last results,
//!   active tab, table engine and status line.
//! - Validate a run before any request is made.
//! - Turn every failure into a status message while keeping prior state.
//!
//! Does NOT handle:
//! - Rendering; hosts read [`ReportSession::table`] and [`ReportSession::status`].
//! - Preventing overlapping runs; `&mut self` already serializes them.
//!
//! Invariants:
//! - `initialize` calls its completion callback exactly once.
//! - A failed run leaves results, active tab and table untouched.
//! - At most `MAX_SELECTIONS` categories are selected at any time.

use std::collections::HashMap;

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone, Utc};
use fleet_client::DataSource;
use fleet_config::ReportDefaults;
use fleet_config::constants::MAX_SELECTIONS;
use tracing::{debug, info, warn};

use crate::chart::{ChartData, ChartFieldOptions, ChartRequest, aggregate, chart_field_options};
use crate::error::{ReportError, Result};
use crate::export::{CsvExport, export_csv};
use crate::lookup::LookupCache;
use crate::query::{QueryResults, QuerySelection, run_queries};
use crate::registry::{self, CategoryDefinition, FieldDefinition};
use crate::table::TableEngine;

const LOADING_MESSAGE: &str = "Loading fleet data...";
const RUNNING_MESSAGE: &str = "Running report...";
const NO_CATEGORY_MESSAGE: &str = "Select at least one data category.";
const NO_DIAGNOSTIC_MESSAGE: &str = "Please select a diagnostic for Engine/Status Data.";
const NO_DATA_MESSAGE: &str = "No data found for the selected criteria.";
const CHART_FIELDS_MESSAGE: &str = "Select both a value field and group-by field for charting.";
const NO_ACTIVE_TAB_MESSAGE: &str = "Run a report before exporting or charting.";

/// The session's one-line status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Identity of the hosting surface, handed over on initialize and focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub name: String,
}

impl HostContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Per-run filters chosen alongside the category selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub device_id: Option<String>,
    pub diagnostic_id: Option<String>,
    /// 0 means the session default.
    pub results_limit: u32,
}

impl ReportFilters {
    /// Window from the start of the local day `days` ago until `now`.
    pub fn last_days(days: u32, now: DateTime<Local>) -> Self {
        let start_day = now
            .date_naive()
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(now.date_naive());
        let from = Local
            .from_local_datetime(&start_day.and_time(NaiveTime::MIN))
            .earliest()
            .map(|local| local.with_timezone(&Utc));
        Self {
            from,
            to: Some(now.with_timezone(&Utc)),
            ..Self::default()
        }
    }
}

/// One reporting session over a data source.
pub struct ReportSession<D: DataSource> {
    source: D,
    defaults: ReportDefaults,
    lookups: LookupCache,
    context: Option<HostContext>,
    selected: Vec<&'static CategoryDefinition>,
    visible_fields: HashMap<&'static str, Vec<FieldDefinition>>,
    results: QueryResults,
    active_tab: Option<&'static CategoryDefinition>,
    table: TableEngine,
    status: Status,
}

impl<D: DataSource> ReportSession<D> {
    pub fn new(source: D, defaults: ReportDefaults) -> Self {
        Self {
            source,
            defaults,
            lookups: LookupCache::new(),
            context: None,
            selected: Vec::new(),
            visible_fields: HashMap::new(),
            results: QueryResults::new(),
            active_tab: None,
            table: TableEngine::new(),
            status: Status::default(),
        }
    }

    /// Load the lookup cache, then call `done`.
    ///
    /// `done` runs exactly once whether or not the load succeeds; a failure
    /// is also left on the status line and the load can be retried.
    pub async fn initialize(&mut self, context: HostContext, done: impl FnOnce()) -> Result<()> {
        debug!(host = %context.name, "Initializing report session");
        self.context = Some(context);
        self.status = Status::info(LOADING_MESSAGE);

        let outcome = match self.lookups.initialize(&self.source).await {
            Ok(()) => {
                self.status = Status::default();
                Ok(())
            }
            Err(e) => {
                let err = ReportError::CacheLoad(e);
                warn!(error = %err, "Lookup cache load failed");
                self.status = Status::error(err.status_message());
                Err(err)
            }
        };

        done();
        outcome
    }

    pub fn focus(&mut self, context: HostContext) {
        debug!(host = %context.name, "Session focused");
        self.context = Some(context);
    }

    pub fn blur(&mut self) {
        debug!("Session blurred");
    }

    pub fn context(&self) -> Option<&HostContext> {
        self.context.as_ref()
    }

    /// Select `key` if unselected, deselect it otherwise.
    ///
    /// Returns whether the category is selected afterwards.
    pub fn toggle_category(&mut self, key: &str) -> Result<bool> {
        let category = known_category(key)?;
        if let Some(position) = self.selected.iter().position(|c| c.key == category.key) {
            self.selected.remove(position);
            self.visible_fields.remove(category.key);
            return Ok(false);
        }
        self.push_selection(category)?;
        Ok(true)
    }

    /// Select `key`; selecting an already selected category changes nothing.
    pub fn select_category(&mut self, key: &str) -> Result<()> {
        let category = known_category(key)?;
        if self.selected.iter().any(|c| c.key == category.key) {
            return Ok(());
        }
        self.push_selection(category)
    }

    fn push_selection(&mut self, category: &'static CategoryDefinition) -> Result<()> {
        if self.selected.len() >= MAX_SELECTIONS {
            return Err(ReportError::SelectionLimit {
                max: MAX_SELECTIONS,
            });
        }
        self.selected.push(category);
        self.visible_fields
            .insert(category.key, category.default_fields());
        Ok(())
    }

    pub fn selected_categories(&self) -> Vec<&'static CategoryDefinition> {
        self.selected.clone()
    }

    /// Choose the visible columns of a selected category.
    ///
    /// Columns keep catalog order regardless of the order of `field_keys`.
    pub fn set_visible_fields(&mut self, key: &str, field_keys: &[&str]) -> Result<()> {
        let category = known_category(key)?;
        if let Some(unknown) = field_keys.iter().find(|k| category.field(k).is_none()) {
            return Err(ReportError::UnknownField {
                category: category.key.to_string(),
                field: (*unknown).to_string(),
            });
        }
        let fields = category
            .fields
            .iter()
            .filter(|f| field_keys.contains(&f.key))
            .copied()
            .collect();
        self.visible_fields.insert(category.key, fields);
        Ok(())
    }

    /// Visible columns of `key`: the chosen set, or the category defaults.
    pub fn visible_fields(&self, key: &str) -> Vec<FieldDefinition> {
        match self.visible_fields.get(key) {
            Some(fields) => fields.clone(),
            None => registry::category(key)
                .map(|c| c.default_fields())
                .unwrap_or_default(),
        }
    }

    /// Validate, query and present the current selection.
    ///
    /// Returns the total number of rows loaded. Progress messages go to both
    /// `progress` and the status line.
    pub async fn run_report<P>(&mut self, filters: &ReportFilters, mut progress: P) -> Result<usize>
    where
        P: FnMut(&str) + Send,
    {
        if let Err(err) = self.validate(filters) {
            self.status = Status::error(err.status_message());
            return Err(err);
        }

        self.status = Status::info(RUNNING_MESSAGE);
        let limit = match filters.results_limit {
            0 => self.defaults.results_limit,
            n => n,
        };
        let mut selection = QuerySelection::new()
            .with_categories(self.selected.iter().map(|c| c.key))
            .with_device(filters.device_id.as_deref())
            .with_diagnostic(filters.diagnostic_id.as_deref())
            .with_results_limit(limit);
        if let (Some(from), Some(to)) = (filters.from, filters.to) {
            selection = selection.with_date_range(from, to);
        }

        let status = &mut self.status;
        let outcome = run_queries(&self.source, &selection, |message: &str| {
            *status = Status::info(message);
            progress(message);
        })
        .await;

        let results = match outcome {
            Ok(results) => results,
            Err(e) => {
                let err = ReportError::QueryExecution(e);
                warn!(error = %err, "Report run failed, keeping previous results");
                self.status = Status::error(err.status_message());
                return Err(err);
            }
        };

        for (_, rows) in results.iter() {
            self.lookups.backfill_diagnostics(rows);
        }
        let total = results.total_rows();
        self.results = results;

        if total == 0 {
            self.active_tab = None;
            self.table = TableEngine::new();
            self.status = Status::error(NO_DATA_MESSAGE);
            info!("Report returned no rows");
            return Ok(0);
        }

        self.status = Status::info(format!("Done — {total} records loaded."));
        info!(total, "Report loaded");
        if let Some(first) = self.results.keys().first().copied() {
            self.activate_tab(first)?;
        }
        Ok(total)
    }

    fn validate(&self, filters: &ReportFilters) -> Result<()> {
        if self.selected.is_empty() {
            return Err(ReportError::Validation(NO_CATEGORY_MESSAGE.to_string()));
        }
        let diagnostic_missing = filters
            .diagnostic_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty());
        if diagnostic_missing && self.selected.iter().any(|c| c.needs_diagnostic) {
            return Err(ReportError::Validation(NO_DIAGNOSTIC_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Show `key`'s rows in the table, resetting search, sort and page.
    pub fn activate_tab(&mut self, key: &str) -> Result<()> {
        let category = known_category(key)?;
        let fields = self.visible_fields(category.key);
        let rows = self.results.get(category.key).unwrap_or_default();
        self.table.render(&fields, rows, self.defaults.page_size);
        self.active_tab = Some(category);
        Ok(())
    }

    pub fn active_tab(&self) -> Option<&'static CategoryDefinition> {
        self.active_tab
    }

    /// Row count of every category in the last successful run.
    pub fn tab_counts(&self) -> Vec<(&'static CategoryDefinition, usize)> {
        self.results
            .iter()
            .filter_map(|(key, rows)| registry::category(key).map(|c| (c, rows.len())))
            .collect()
    }

    pub fn search(&mut self, query: &str) {
        self.table.filter(query, &self.lookups);
    }

    pub fn sort(&mut self, column: usize) -> bool {
        self.table.sort(column)
    }

    pub fn next_page(&mut self) -> bool {
        self.table.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.table.prev_page()
    }

    pub fn table(&self) -> &TableEngine {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableEngine {
        &mut self.table
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn lookups(&self) -> &LookupCache {
        &self.lookups
    }

    pub fn results(&self) -> &QueryResults {
        &self.results
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn defaults(&self) -> &ReportDefaults {
        &self.defaults
    }

    /// CSV of the active tab's filtered view, named after the category.
    pub fn export_csv<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<CsvExport>
    where
        Tz::Offset: std::fmt::Display,
    {
        let category = self.require_active_tab()?;
        let export = export_csv(
            category.label,
            self.table.fields(),
            self.table.filtered_rows(),
            &self.lookups,
            now,
        )?;
        info!(
            category = category.key,
            rows = export.row_count,
            filename = %export.filename,
            "CSV export rendered"
        );
        Ok(export)
    }

    /// Fields of the active tab usable as chart value and group axes.
    pub fn chart_field_options(&self) -> ChartFieldOptions {
        chart_field_options(self.table.fields())
    }

    /// Aggregate the active tab's filtered view for the chart sink.
    pub fn chart(&mut self, request: &ChartRequest) -> Result<ChartData> {
        let category = self.require_active_tab()?;
        if request.value_field.is_empty() || request.group_field.is_empty() {
            self.status = Status::error(CHART_FIELDS_MESSAGE);
            return Err(ReportError::Validation(CHART_FIELDS_MESSAGE.to_string()));
        }

        let group_field = self
            .table
            .fields()
            .iter()
            .find(|f| f.key == request.group_field)
            .copied();
        let max_groups = match request.max_groups {
            0 => self.defaults.max_chart_groups,
            n => n,
        };
        let groups = aggregate(
            self.table.filtered_rows(),
            &request.value_field,
            &request.group_field,
            group_field.as_ref(),
            max_groups,
            &self.lookups,
        );
        debug!(
            category = category.key,
            groups = groups.len(),
            "Chart aggregated"
        );

        Ok(ChartData {
            kind: request.kind,
            value_field: request.value_field.clone(),
            group_field: request.group_field.clone(),
            groups,
        })
    }

    fn require_active_tab(&self) -> Result<&'static CategoryDefinition> {
        self.active_tab
            .ok_or_else(|| ReportError::Validation(NO_ACTIVE_TAB_MESSAGE.to_string()))
    }
}

fn known_category(key: &str) -> Result<&'static CategoryDefinition> {
    registry::category(key).ok_or_else(|| ReportError::UnknownCategory(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use fleet_client::testing::MockDataSource;

    fn session() -> ReportSession<MockDataSource> {
        ReportSession::new(MockDataSource::new(), ReportDefaults::default())
    }

    #[test]
    fn test_toggle_and_limit() {
        let mut session = session();
        assert!(session.toggle_category("Trip").unwrap());
        assert!(!session.toggle_category("Trip").unwrap());
        assert!(session.selected_categories().is_empty());

        assert!(matches!(
            session.toggle_category("Nope"),
            Err(ReportError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut session = session();
        let keys = registry::category_keys();
        for key in &keys {
            session.select_category(key).unwrap();
        }
        assert_eq!(session.selected_categories().len(), keys.len());
        assert!(keys.len() <= MAX_SELECTIONS);
        session.select_category("Trip").unwrap();
        assert_eq!(session.selected_categories().len(), keys.len());
    }

    #[test]
    fn test_visible_fields_keep_catalog_order() {
        let mut session = session();
        session.select_category("Trip").unwrap();
        session
            .set_visible_fields("Trip", &["maximumSpeed", "id"])
            .unwrap();
        let keys: Vec<_> = session.visible_fields("Trip").iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["id", "maximumSpeed"]);

        let err = session.set_visible_fields("Trip", &["speed"]).unwrap_err();
        assert!(matches!(err, ReportError::UnknownField { .. }));
    }

    #[test]
    fn test_reselect_restores_defaults() {
        let mut session = session();
        session.select_category("Zone").unwrap();
        session.set_visible_fields("Zone", &["id"]).unwrap();
        session.toggle_category("Zone").unwrap();
        session.toggle_category("Zone").unwrap();
        assert_eq!(
            session.visible_fields("Zone"),
            registry::category("Zone").unwrap().default_fields()
        );
    }

    #[test]
    fn test_last_days_window() {
        let now = Local.with_ymd_and_hms(2024, 3, 8, 15, 30, 0).unwrap();
        let filters = ReportFilters::last_days(7, now);
        let from = filters.from.unwrap().with_timezone(&Local);
        assert_eq!(from.date_naive().to_string(), "2024-03-01");
        assert_eq!(from.hour(), 0);
        assert_eq!(filters.to, Some(now.with_timezone(&Utc)));
    }

    #[test]
    fn test_export_without_tab_is_validation() {
        let session = session();
        let err = session.export_csv(&Utc::now()).unwrap_err();
        assert!(err.is_validation());
    }
}
