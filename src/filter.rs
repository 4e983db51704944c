//! Row filtering.
//!
//! A `FilterSpec` holds at most one active condition per column. A row is
//! kept when it satisfies every condition (AND across columns); columns with
//! no entry impose nothing.

use crate::content::{ContentTable, Row};
use crate::predicate::{evaluate, FilterOperator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One active filter on one column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCondition {
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

impl FilterCondition {
    pub fn new(operator: FilterOperator, value: impl Into<String>) -> Self {
        FilterCondition {
            operator,
            value: value.into(),
        }
    }

    pub fn matches(&self, cell: &str) -> bool {
        evaluate(cell, self.operator, &self.value)
    }
}

/// Column id -> active condition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    conditions: HashMap<String, FilterCondition>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, column: impl Into<String>, condition: FilterCondition) -> Self {
        self.set(column, condition);
        self
    }

    /// Set the condition for a column, replacing any previous one.
    pub fn set(&mut self, column: impl Into<String>, condition: FilterCondition) {
        self.conditions.insert(column.into(), condition);
    }

    /// Remove the condition on a column. Returns it if there was one.
    pub fn clear(&mut self, column: &str) -> Option<FilterCondition> {
        self.conditions.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&FilterCondition> {
        self.conditions.get(column)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCondition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Pair each condition with its column position. Conditions naming a
    /// column the table does not have are dropped.
    fn resolve<'s>(&'s self, table: &ContentTable) -> Vec<(usize, &'s FilterCondition)> {
        self.conditions
            .iter()
            .filter_map(|(column, condition)| match table.column_index(column) {
                Some(idx) => Some((idx, condition)),
                None => {
                    log::debug!("ignoring filter on unknown column '{}'", column);
                    None
                }
            })
            .collect()
    }
}

/// Keep the rows that satisfy every active condition in `spec`.
///
/// The result borrows the same rows; no cell data is copied. Row order is
/// preserved, and an empty spec returns every input row.
///
/// ```
/// use gridquery::{filter_rows, ContentTable, FilterCondition, FilterOperator, FilterSpec};
///
/// let table = ContentTable::from_csv("name,score\na,10\nb,notanumber\nc,30\n").unwrap();
/// let spec = FilterSpec::new().with("name", FilterCondition::new(FilterOperator::Contains, "a"));
///
/// let rows = filter_rows(&table, table.rows(), &spec);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].cell(0), "a");
/// ```
pub fn filter_rows<'a, I>(table: &ContentTable, rows: I, spec: &FilterSpec) -> Vec<&'a Row>
where
    I: IntoIterator<Item = &'a Row>,
{
    let active = spec.resolve(table);
    rows.into_iter()
        .filter(|row| active.iter().all(|(col, cond)| cond.matches(row.cell(*col))))
        .collect()
}
