//! Column aggregation for the summary row.
//!
//! Numeric actions parse cells on demand. Cells that do not parse are left
//! out of `Sum`/`Avg`/`Min`/`Max`. Over an empty numeric domain `Sum` is `0`
//! while `Avg`, `Min` and `Max` are absent. `Count` ignores parseability and
//! counts non-empty cells.

use crate::content::{ContentTable, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-column summary action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationAction {
    #[default]
    None,
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl AggregationAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sum => "sum",
            Self::Avg => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::Count => "count",
        }
    }

    pub fn all() -> &'static [AggregationAction] {
        &[
            Self::None,
            Self::Sum,
            Self::Avg,
            Self::Min,
            Self::Max,
            Self::Count,
        ]
    }
}

/// One aggregated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Count(usize),
    Number(f64),
}

impl SummaryValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            SummaryValue::Count(n) => *n as f64,
            SummaryValue::Number(v) => *v,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            SummaryValue::Count(n) => Some(*n),
            SummaryValue::Number(_) => None,
        }
    }
}

/// Column id -> aggregation action. Missing columns mean `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationSpec {
    actions: HashMap<String, AggregationAction>,
}

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, action: AggregationAction) -> Self {
        self.set(column, action);
        self
    }

    /// Setting `None` removes the column's entry.
    pub fn set(&mut self, column: impl Into<String>, action: AggregationAction) {
        let column = column.into();
        if action == AggregationAction::None {
            self.actions.remove(&column);
        } else {
            self.actions.insert(column, action);
        }
    }

    pub fn get(&self, column: &str) -> AggregationAction {
        self.actions.get(column).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AggregationAction)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Column id -> aggregated value. Columns whose value is absent have no key.
pub type Summary = HashMap<String, SummaryValue>;

/// Parse a cell as a finite number, ignoring surrounding whitespace.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parsed_cells<'a>(rows: &'a [&'a Row], column: usize) -> impl Iterator<Item = f64> + 'a {
    rows.iter().filter_map(move |row| parse_number(row.cell(column)))
}

/// Aggregate one column, addressed by position, over `rows`.
pub fn aggregate_column(rows: &[&Row], column: usize, action: AggregationAction) -> Option<SummaryValue> {
    let numbers = || parsed_cells(rows, column);

    match action {
        AggregationAction::None => None,
        AggregationAction::Count => {
            let count = rows.iter().filter(|row| !row.cell(column).is_empty()).count();
            Some(SummaryValue::Count(count))
        }
        AggregationAction::Sum => Some(SummaryValue::Number(numbers().fold(0.0, |s, v| s + v))),
        AggregationAction::Avg => {
            let (sum, count) = numbers().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if count > 0 {
                Some(SummaryValue::Number(sum / count as f64))
            } else {
                None
            }
        }
        AggregationAction::Min => numbers().reduce(f64::min).map(SummaryValue::Number),
        AggregationAction::Max => numbers().reduce(f64::max).map(SummaryValue::Number),
    }
}

/// Aggregate one column, addressed by id. An unknown column yields `None`.
///
/// ```
/// use gridquery::{aggregate, AggregationAction, ContentTable, SummaryValue};
///
/// let table = ContentTable::from_csv("name,score\na,10\nb,notanumber\nc,30\n").unwrap();
/// let rows: Vec<_> = table.rows().iter().collect();
///
/// assert_eq!(aggregate(&table, &rows, "score", AggregationAction::Avg), Some(SummaryValue::Number(20.0)));
/// assert_eq!(aggregate(&table, &rows, "score", AggregationAction::Count), Some(SummaryValue::Count(3)));
/// ```
pub fn aggregate(
    table: &ContentTable,
    rows: &[&Row],
    column: &str,
    action: AggregationAction,
) -> Option<SummaryValue> {
    match table.column_index(column) {
        Some(idx) => aggregate_column(rows, idx, action),
        None => {
            log::debug!("ignoring aggregation on unknown column '{}'", column);
            None
        }
    }
}

/// Apply a whole `AggregationSpec`.
pub fn summarize(table: &ContentTable, rows: &[&Row], spec: &AggregationSpec) -> Summary {
    spec.iter()
        .filter_map(|(column, action)| {
            aggregate(table, rows, column, action).map(|value| (column.to_string(), value))
        })
        .collect()
}
