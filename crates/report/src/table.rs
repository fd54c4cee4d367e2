//! Table engine: sort, filter and pagination over one category's rows.
//!
//! Responsibilities:
//! - Own a private copy of the active category's rows and visible fields.
//! - Maintain a filtered, sorted view of row indices and slice it into pages.
//! - Expose the filtered view for export and charting.
//!
//! Does NOT handle:
//! - Drawing cells (callers format with [`TableEngine::page_cells`]).
//! - Fetching rows or choosing the active category.
//!
//! Invariants:
//! - `render` replaces all state: empty filter, no sort, page 0.
//! - Sorting is stable and absent values sort last in both directions.
//! - Sorting and filtering reset the page to 0; paging is clamped.
//! - Every operation before the first `render` is a no-op.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::format::{duration_seconds, format_value, parse_instant};
use crate::key_path::resolve_path;
use crate::lookup::LookupCache;
use crate::registry::{FieldDefinition, ValueType};
use crate::values::{numeric, plain_text};

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Toggle between ascending and descending.
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// Position of the current page inside the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// 1-based index of the first row on the page; 0 when empty.
    pub start: usize,
    /// 1-based index of the last row on the page; 0 when empty.
    pub end: usize,
    pub total: usize,
    /// 0-based page index.
    pub page: usize,
    pub page_count: usize,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            f.write_str("No results")
        } else {
            write!(f, "Showing {} - {} of {}", self.start, self.end, self.total)
        }
    }
}

/// Sort/filter/paginate state for the active category.
#[derive(Debug, Default, Clone)]
pub struct TableEngine {
    fields: Vec<FieldDefinition>,
    rows: Vec<Value>,
    view: Vec<usize>,
    filter_query: String,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
    rendered: bool,
}

impl TableEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `rows` under `fields`, resetting filter, sort and page.
    pub fn render(&mut self, fields: &[FieldDefinition], rows: &[Value], page_size: usize) {
        self.fields = fields.to_vec();
        self.rows = rows.to_vec();
        self.view = (0..self.rows.len()).collect();
        self.filter_query.clear();
        self.sort = None;
        self.page = 0;
        self.page_size = page_size.max(1);
        self.rendered = true;
        debug!(
            rows = self.rows.len(),
            fields = self.fields.len(),
            page_size = self.page_size,
            "Table rendered"
        );
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Sort by column `column`; sorting the same column again flips the
    /// direction. Returns `false` (and changes nothing) for an unknown column.
    pub fn sort(&mut self, column: usize) -> bool {
        if !self.rendered || column >= self.fields.len() {
            return false;
        }

        let direction = match self.sort {
            Some(state) if state.column == column => state.direction.toggle(),
            _ => SortDirection::Asc,
        };
        self.sort = Some(SortState { column, direction });
        self.apply_sort();
        self.page = 0;
        true
    }

    /// Keep rows where any visible field's formatted text contains `query`
    /// (trimmed, case-insensitive). An empty query restores every row.
    pub fn filter(&mut self, query: &str, lookups: &LookupCache) {
        if !self.rendered {
            return;
        }
        self.filter_query = query.trim().to_lowercase();

        if self.filter_query.is_empty() {
            self.view = (0..self.rows.len()).collect();
        } else {
            let needle = self.filter_query.as_str();
            let fields = &self.fields;
            self.view = self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| {
                    fields.iter().any(|field| {
                        format_value(resolve_path(row, field.key), field, lookups)
                            .to_lowercase()
                            .contains(needle)
                    })
                })
                .map(|(index, _)| index)
                .collect();
        }

        self.apply_sort();
        self.page = 0;
        debug!(query = %self.filter_query, matched = self.view.len(), "Table filtered");
    }

    /// Advance one page; returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; returns `false` on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped to the last page.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.min(self.page_count().saturating_sub(1));
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    /// The filtered (unpaginated) view, in display order.
    pub fn filtered_rows(&self) -> Vec<&Value> {
        self.view.iter().map(|&index| &self.rows[index]).collect()
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<&Value> {
        let (start, end) = self.page_bounds();
        self.view[start..end]
            .iter()
            .map(|&index| &self.rows[index])
            .collect()
    }

    /// Formatted cells of the current page, one `Vec` per row.
    pub fn page_cells(&self, lookups: &LookupCache) -> Vec<Vec<String>> {
        self.page_rows()
            .into_iter()
            .map(|row| {
                self.fields
                    .iter()
                    .map(|field| format_value(resolve_path(row, field.key), field, lookups))
                    .collect()
            })
            .collect()
    }

    pub fn page_info(&self) -> PageInfo {
        let total = self.view.len();
        if total == 0 {
            return PageInfo {
                start: 0,
                end: 0,
                total: 0,
                page: 0,
                page_count: 0,
            };
        }
        let (start, end) = self.page_bounds();
        PageInfo {
            start: start + 1,
            end,
            total,
            page: self.page,
            page_count: self.page_count(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.view.len().div_ceil(self.page_size.max(1))
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Column index of the visible field with key `key`.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    /// The normalized (trimmed, lower-cased) filter query.
    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    /// Number of rows loaded by the last `render`.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn page_bounds(&self) -> (usize, usize) {
        let start = (self.page * self.page_size).min(self.view.len());
        let end = (start + self.page_size).min(self.view.len());
        (start, end)
    }

    fn apply_sort(&mut self) {
        let Some(state) = self.sort else {
            return;
        };
        let Some(field) = self.fields.get(state.column) else {
            return;
        };
        let rows = &self.rows;
        self.view.sort_by(|&a, &b| {
            compare_values(
                resolve_path(&rows[a], field.key),
                resolve_path(&rows[b], field.key),
                field.value_type,
                state.direction,
            )
        });
    }
}

/// Type-aware ordering; absent values sort last regardless of direction.
pub fn compare_values(
    a: Option<&Value>,
    b: Option<&Value>,
    value_type: ValueType,
    direction: SortDirection,
) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let ordering = match value_type {
        ValueType::Number => numeric(a)
            .unwrap_or(0.0)
            .total_cmp(&numeric(b).unwrap_or(0.0)),
        ValueType::Duration => duration_seconds(a)
            .unwrap_or(0.0)
            .total_cmp(&duration_seconds(b).unwrap_or(0.0)),
        ValueType::Date => instant_millis(a).cmp(&instant_millis(b)),
        ValueType::String | ValueType::Id | ValueType::Boolean => {
            text_compare(&plain_text(a), &plain_text(b))
        }
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn instant_millis(value: &Value) -> i64 {
    parse_instant(value)
        .map(|instant| instant.timestamp_millis())
        .unwrap_or(0)
}

fn text_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
