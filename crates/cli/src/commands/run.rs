//! Run command: one report over the selected categories.
//!
//! Responsibilities:
//! - Drive a `ReportSession` the way an interactive host would: select,
//!   load lookups, run, then adjust tab, search, sort and page.
//! - Write the optional CSV export and chart aggregate.
//!
//! Does NOT handle:
//! - Cell formatting or aggregation (see `fleet_report`).
//! - Rendering (see `formatters`).
//!
//! Invariants:
//! - A lookup cache failure is logged and the run continues with raw ids.
//! - `--to` covers the whole local day it names.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use fleet_client::DataSource;
use fleet_config::Config;
use fleet_report::{ChartData, ChartRequest, ReportError, ReportFilters, ReportSession};
use tracing::{info, warn};

use crate::args::RunArgs;
use crate::cancellation::CancellationToken;
use crate::commands::{host_context, open_session};
use crate::formatters::{
    ColumnOutput, OutputFormat, ReportOutput, TabOutput, get_formatter, output_result,
    write_to_file,
};
use crate::progress::Spinner;

pub async fn run(
    config: Config,
    args: RunArgs,
    output_format: OutputFormat,
    quiet: bool,
    output_file: Option<PathBuf>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut session = open_session(&config)?;

    for key in &args.categories {
        session.select_category(key)?;
    }
    for spec in &args.fields {
        let (category, keys) = parse_fields(spec)?;
        session.set_visible_fields(category, &keys)?;
    }

    let (from, to) = report_window(
        args.from,
        args.to,
        config.report.lookback_days,
        Local::now(),
    )?;
    let filters = ReportFilters {
        from: Some(from),
        to: Some(to),
        device_id: args.device.clone(),
        diagnostic_id: args.diagnostic.clone(),
        results_limit: 0,
    };

    let spinner = Spinner::new(!quiet, "Loading fleet data...");
    let loaded = cancel
        .run(session.initialize(host_context(), || spinner.set_message("Running report...")))
        .await?;
    if let Err(e) = loaded {
        warn!(error = %e, "Continuing without lookup names");
    }

    let total = cancel
        .run(session.run_report(&filters, |message: &str| spinner.set_message(message)))
        .await??;
    spinner.clear();
    info!(total, "Report finished");
    if session.status().is_error {
        eprintln!("{}", session.status().message);
    }

    if total > 0 {
        apply_view(&mut session, &args)?;
    }

    if let Some(dir) = &args.export_dir {
        export(&session, dir, quiet)?;
    }

    let chart = if args.wants_chart() {
        let request = ChartRequest {
            value_field: args.chart_value.clone().unwrap_or_default(),
            group_field: args.chart_group.clone().unwrap_or_default(),
            kind: args.chart_kind,
            max_groups: args.max_groups.unwrap_or(0),
        };
        Some(session.chart(&request)?)
    } else {
        None
    };

    let report = build_output(&session, chart);
    let formatter = get_formatter(output_format);
    let output = formatter.format_report(&report)?;
    output_result(&output, output_file.as_deref())
}

/// Tab, search, sort and page, in that order.
fn apply_view<D: DataSource>(session: &mut ReportSession<D>, args: &RunArgs) -> Result<()> {
    if let Some(tab) = &args.tab {
        if session.results().get(tab).is_none() {
            return Err(ReportError::Validation(format!(
                "Category '{tab}' was not part of this report."
            ))
            .into());
        }
        session.activate_tab(tab)?;
    }

    if let Some(query) = &args.filter {
        session.search(query);
    }

    if let Some(key) = &args.sort_by {
        let column = session.table().column_index(key).ok_or_else(|| {
            ReportError::UnknownField {
                category: session
                    .active_tab()
                    .map(|c| c.key.to_string())
                    .unwrap_or_default(),
                field: key.clone(),
            }
        })?;
        session.sort(column);
        if args.desc {
            session.sort(column);
        }
    }

    session.table_mut().go_to_page(args.page.saturating_sub(1));
    Ok(())
}

fn export<D: DataSource>(session: &ReportSession<D>, dir: &Path, quiet: bool) -> Result<()> {
    let export = session.export_csv(&Local::now())?;
    let path = dir.join(&export.filename);
    write_to_file(&export.content, &path)
        .with_context(|| format!("Failed to write export {}", path.display()))?;
    if !quiet {
        eprintln!("Exported {} rows to {}", export.row_count, path.display());
    }
    Ok(())
}

fn build_output<D: DataSource>(
    session: &ReportSession<D>,
    chart: Option<ChartData>,
) -> ReportOutput {
    let table = session.table();
    ReportOutput {
        status: session.status().message.clone(),
        tabs: session
            .tab_counts()
            .into_iter()
            .map(|(category, count)| TabOutput {
                key: category.key.to_string(),
                label: category.label.to_string(),
                count,
            })
            .collect(),
        category: session.active_tab().map(|c| c.key.to_string()),
        filter: table.filter_query().to_string(),
        columns: table
            .fields()
            .iter()
            .map(|f| ColumnOutput {
                key: f.key.to_string(),
                label: f.label.to_string(),
            })
            .collect(),
        rows: table.page_cells(session.lookups()),
        page: table.page_info(),
        chart,
    }
}

/// Split `CATEGORY=key,key` into the category and its field keys.
fn parse_fields(spec: &str) -> Result<(&str, Vec<&str>)> {
    let (category, keys) = spec.split_once('=').ok_or_else(|| {
        ReportError::Validation(format!(
            "Invalid --fields value '{spec}': expected CATEGORY=key,key"
        ))
    })?;
    let keys: Vec<&str> = keys
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return Err(ReportError::Validation(format!(
            "Invalid --fields value '{spec}': no field keys given"
        ))
        .into());
    }
    Ok((category.trim(), keys))
}

/// Resolve the report window from optional local dates.
///
/// Without dates the window is the last `lookback_days` days until `now`.
/// With only `--from` it ends now; with only `--to` it starts
/// `lookback_days` before that day.
fn report_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    lookback_days: u32,
    now: DateTime<Local>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let lookback = Days::new(u64::from(lookback_days));
    let (from, to) = match (from, to) {
        (None, None) => {
            let filters = ReportFilters::last_days(lookback_days, now);
            match (filters.from, filters.to) {
                (Some(from), Some(to)) => return Ok((from, to)),
                _ => (now.date_naive().checked_sub_days(lookback), None),
            }
        }
        (Some(from), None) => (Some(from), None),
        (None, Some(to)) => (to.checked_sub_days(lookback), Some(to)),
        (Some(from), Some(to)) => (Some(from), Some(to)),
    };

    let start = from
        .and_then(|day| local_instant(day, NaiveTime::MIN))
        .ok_or_else(|| ReportError::Validation("Invalid start date.".to_string()))?;
    let end = match to {
        Some(day) => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .and_then(|end_of_day| local_instant(day, end_of_day))
            .ok_or_else(|| ReportError::Validation("Invalid end date.".to_string()))?,
        None => now.with_timezone(&Utc),
    };

    if start > end {
        return Err(ReportError::Validation(
            "The start date must not be after the end date.".to_string(),
        )
        .into());
    }
    Ok((start, end))
}

fn local_instant(day: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&day.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(date: NaiveDate) -> DateTime<Local> {
        Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
    }

    #[test]
    fn test_parse_fields() {
        let (category, keys) = parse_fields("Trip=id, distance,,device.id").unwrap();
        assert_eq!(category, "Trip");
        assert_eq!(keys, vec!["id", "distance", "device.id"]);

        assert!(parse_fields("Trip").is_err());
        assert!(parse_fields("Trip=").is_err());
    }

    #[test]
    fn test_window_covers_whole_days() {
        let (from, to) = report_window(
            Some(day(2024, 3, 1)),
            Some(day(2024, 3, 7)),
            7,
            noon(day(2024, 6, 1)),
        )
        .unwrap();
        let from_local = from.with_timezone(&Local);
        let to_local = to.with_timezone(&Local);
        assert_eq!(from_local.date_naive(), day(2024, 3, 1));
        assert_eq!(from_local.time(), NaiveTime::MIN);
        assert_eq!(to_local.date_naive(), day(2024, 3, 7));
        assert_eq!(to_local.format("%H:%M:%S").to_string(), "23:59:59");
    }

    #[test]
    fn test_window_defaults_to_lookback() {
        let now = noon(day(2024, 3, 10));
        let (from, to) = report_window(None, None, 7, now).unwrap();
        assert_eq!(from.with_timezone(&Local).date_naive(), day(2024, 3, 3));
        assert_eq!(to, now.with_timezone(&Utc));

        let (from, _) = report_window(None, Some(day(2024, 3, 5)), 2, now).unwrap();
        assert_eq!(from.with_timezone(&Local).date_naive(), day(2024, 3, 3));

        let (_, to) = report_window(Some(day(2024, 3, 1)), None, 7, now).unwrap();
        assert_eq!(to, now.with_timezone(&Utc));
    }

    #[test]
    fn test_window_rejects_reversed_dates() {
        let err = report_window(
            Some(day(2024, 3, 8)),
            Some(day(2024, 3, 1)),
            7,
            noon(day(2024, 3, 10)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not be after"));
    }
}
