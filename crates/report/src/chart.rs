//! Chart aggregation: rows grouped by one field, summing another.
//!
//! The drawing itself belongs to whatever sink receives [`ChartData`]; this
//! module only produces the `{label, sum, count}` series.
//!
//! Invariants:
//! - Groups are ordered by descending sum; ties keep first-seen order.
//! - At most `max_groups` groups are kept, plus one synthetic `Others` group
//!   holding the residual sum and count.
//! - Non-numeric values count toward `count` but add 0 to `sum`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Local;
use fleet_config::constants::DEFAULT_MAX_CHART_GROUPS;
use serde::Serialize;
use serde_json::Value;

use crate::format::{DATE_FORMAT, parse_instant};
use crate::key_path::resolve_path;
use crate::lookup::LookupCache;
use crate::registry::{FieldDefinition, ValueType};
use crate::values::{is_truthy, leading_number, plain_text};

/// Label of the group that collects everything past `max_groups`.
pub const OTHERS_LABEL: &str = "Others";

/// Label of rows without a group value.
pub const EMPTY_GROUP_LABEL: &str = "(empty)";

/// Presentation requested from the chart sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "pie" => Ok(Self::Pie),
            other => Err(format!("unknown chart kind '{other}' (expected bar, line or pie)")),
        }
    }
}

/// One aggregated group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGroup {
    pub label: String,
    pub sum: f64,
    pub count: usize,
}

/// What to chart: key paths of the summed and grouping fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub value_field: String,
    pub group_field: String,
    pub kind: ChartKind,
    /// 0 means the default group limit.
    pub max_groups: usize,
}

/// Aggregated series handed to the chart sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub value_field: String,
    pub group_field: String,
    pub groups: Vec<ChartGroup>,
}

/// Fields usable on each chart axis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartFieldOptions {
    /// Numeric fields that can be summed.
    pub values: Vec<FieldDefinition>,
    /// String, id and date fields that can group rows.
    pub groups: Vec<FieldDefinition>,
}

pub fn chart_field_options(fields: &[FieldDefinition]) -> ChartFieldOptions {
    ChartFieldOptions {
        values: fields
            .iter()
            .filter(|f| f.value_type == ValueType::Number)
            .copied()
            .collect(),
        groups: fields
            .iter()
            .filter(|f| {
                matches!(
                    f.value_type,
                    ValueType::String | ValueType::Id | ValueType::Date
                )
            })
            .copied()
            .collect(),
    }
}

/// Group `rows` by `group_key` and sum `value_key` per group.
///
/// `group_field`, when known, decides how group values are labelled:
/// resolver fields go through `lookups`, date fields group by local calendar
/// date, anything else by its plain text.
pub fn aggregate<'a>(
    rows: impl IntoIterator<Item = &'a Value>,
    value_key: &str,
    group_key: &str,
    group_field: Option<&FieldDefinition>,
    max_groups: usize,
    lookups: &LookupCache,
) -> Vec<ChartGroup> {
    let max_groups = if max_groups == 0 {
        DEFAULT_MAX_CHART_GROUPS
    } else {
        max_groups
    };

    let mut groups: Vec<ChartGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let label = group_label(resolve_path(row, group_key), group_field, lookups);
        let value = resolve_path(row, value_key)
            .and_then(leading_number)
            .unwrap_or(0.0);

        let position = *positions.entry(label.clone()).or_insert_with(|| {
            groups.push(ChartGroup {
                label,
                sum: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[position].sum += value;
        groups[position].count += 1;
    }

    groups.sort_by(|a, b| b.sum.total_cmp(&a.sum));

    if groups.len() > max_groups {
        let others = groups.split_off(max_groups).into_iter().fold(
            ChartGroup {
                label: OTHERS_LABEL.to_string(),
                sum: 0.0,
                count: 0,
            },
            |mut acc, group| {
                acc.sum += group.sum;
                acc.count += group.count;
                acc
            },
        );
        groups.push(others);
    }

    groups
}

fn group_label(
    raw: Option<&Value>,
    field: Option<&FieldDefinition>,
    lookups: &LookupCache,
) -> String {
    let Some(raw) = raw.filter(|v| is_truthy(v)) else {
        return EMPTY_GROUP_LABEL.to_string();
    };

    if let Some(kind) = field.and_then(|f| f.resolver) {
        return lookups.resolve_value(kind, raw);
    }

    if field.is_some_and(|f| f.value_type == ValueType::Date) {
        if let Some(instant) = parse_instant(raw) {
            return instant
                .with_timezone(&Local)
                .format(DATE_FORMAT)
                .to_string();
        }
    }

    plain_text(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ResolverKind, category};
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"device": {"id": "b1"}, "distance": 10}),
            json!({"device": {"id": "b2"}, "distance": "25.5"}),
            json!({"device": {"id": "b1"}, "distance": 5}),
            json!({"device": {"id": "b3"}, "distance": null}),
            json!({"distance": 1}),
        ]
    }

    #[test]
    fn test_sums_and_orders_descending() {
        let groups = aggregate(&rows(), "distance", "device.id", None, 20, &LookupCache::new());
        let summary: Vec<_> = groups
            .iter()
            .map(|g| (g.label.as_str(), g.sum, g.count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("b2", 25.5, 1),
                ("b1", 15.0, 2),
                ("(empty)", 1.0, 1),
                ("b3", 0.0, 1),
            ]
        );
    }

    #[test]
    fn test_collapses_into_others() {
        let groups = aggregate(&rows(), "distance", "device.id", None, 2, &LookupCache::new());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].label, OTHERS_LABEL);
        assert_eq!(groups[2].sum, 1.0);
        assert_eq!(groups[2].count, 2);
    }

    #[test]
    fn test_zero_max_groups_uses_default() {
        let many: Vec<Value> = (0..30).map(|i| json!({"g": format!("g{i}"), "v": i})).collect();
        let groups = aggregate(&many, "v", "g", None, 0, &LookupCache::new());
        assert_eq!(groups.len(), DEFAULT_MAX_CHART_GROUPS + 1);
        assert_eq!(groups[0].label, "g29");
    }

    #[test]
    fn test_resolver_labels() {
        let mut cache = LookupCache::new();
        cache.cache_diagnostic("DiagnosticEngineSpeedId", "Engine speed");
        let field = FieldDefinition {
            key: "diagnostic.id",
            label: "Diagnostic",
            default_visible: true,
            value_type: ValueType::Id,
            resolver: Some(ResolverKind::Diagnostic),
        };
        let rows = [
            json!({"diagnostic": {"id": "DiagnosticEngineSpeedId"}, "data": 3}),
            json!({"diagnostic": {"id": "DiagnosticFuelLevelId"}, "data": 1}),
        ];
        let groups = aggregate(&rows, "data", "diagnostic.id", Some(&field), 20, &cache);
        assert_eq!(groups[0].label, "Engine speed");
        assert_eq!(groups[1].label, "Diagnostic Fuel Level");
    }

    #[test]
    fn test_field_options() {
        let trip = category("Trip").unwrap();
        let options = chart_field_options(trip.fields);
        let values: Vec<_> = options.values.iter().map(|f| f.key).collect();
        assert_eq!(
            values,
            vec!["distance", "maximumSpeed", "averageSpeed", "stopPoint.x", "stopPoint.y"]
        );
        let groups: Vec<_> = options.groups.iter().map(|f| f.key).collect();
        assert_eq!(groups, vec!["id", "device.id", "driver.id", "start", "stop"]);
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("PIE".parse::<ChartKind>(), Ok(ChartKind::Pie));
        assert!("donut".parse::<ChartKind>().is_err());
    }
}
