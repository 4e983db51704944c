//! Row ordering.
//!
//! Sorting is a pure reordering of the rows it is given: it never drops or
//! adds a row. Comparison is lexicographic on the raw cell text unless a sort
//! key opts into numeric comparison. Ties always fall back to the original
//! row index, so the order is total and stable in both directions.

use crate::aggregate::parse_number;
use crate::content::{ContentTable, Row};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// Descending order (largest first)
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// How cell text is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Plain string ordering
    #[default]
    Lexicographic,
    /// Parse cells as numbers. Cells that do not parse sort after every
    /// number, whatever the order, and compare as text among themselves.
    Numeric,
}

/// A single sort key specifying a column and order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column id to sort by
    pub column: String,
    /// Sort order (ascending or descending)
    #[serde(rename = "direction", default)]
    pub order: SortOrder,
    #[serde(default)]
    pub mode: CompareMode,
}

impl SortKey {
    /// Create a new sort key with ascending order
    pub fn ascending(column: impl Into<String>) -> Self {
        SortKey::new(column, SortOrder::Ascending)
    }

    /// Create a new sort key with descending order
    pub fn descending(column: impl Into<String>) -> Self {
        SortKey::new(column, SortOrder::Descending)
    }

    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        SortKey {
            column: column.into(),
            order,
            mode: CompareMode::Lexicographic,
        }
    }

    /// Switch this key to numeric comparison
    pub fn numeric(mut self) -> Self {
        self.mode = CompareMode::Numeric;
        self
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self.mode {
            CompareMode::Lexicographic => self.directed(a.cmp(b)),
            CompareMode::Numeric => match (parse_number(a), parse_number(b)) {
                (Some(x), Some(y)) => self.directed(x.total_cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.directed(a.cmp(b)),
            },
        }
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

/// Ordered sort keys; the first key is primary. Empty keeps natural order.
///
/// The editor's column header only ever sets one key (`SortSpec::single`);
/// several keys are honoured in priority order when given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// No sorting
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(column: impl Into<String>, order: SortOrder) -> Self {
        SortSpec {
            keys: vec![SortKey::new(column, order)],
        }
    }

    pub fn from_keys(keys: Vec<SortKey>) -> Self {
        SortSpec { keys }
    }

    /// Append a lower-priority key
    pub fn then(mut self, key: SortKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn primary(&self) -> Option<&SortKey> {
        self.keys.first()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Reorder `rows` according to `spec`.
///
/// Keys naming a column the table does not have are skipped. With no usable
/// key the rows come back in the order given.
///
/// ```
/// use gridquery::{sort_rows, ContentTable, SortOrder, SortSpec};
///
/// let table = ContentTable::from_csv("name,score\nCharlie,75\nAlice,92\nBob,85\n").unwrap();
/// let sorted = sort_rows(&table, table.rows().iter().collect(), &SortSpec::single("name", SortOrder::Ascending));
///
/// let names: Vec<&str> = sorted.iter().map(|r| r.cell(0)).collect();
/// assert_eq!(names, ["Alice", "Bob", "Charlie"]);
/// ```
pub fn sort_rows<'a>(table: &ContentTable, mut rows: Vec<&'a Row>, spec: &SortSpec) -> Vec<&'a Row> {
    let keys: Vec<(usize, &SortKey)> = spec
        .keys
        .iter()
        .filter_map(|key| match table.column_index(&key.column) {
            Some(idx) => Some((idx, key)),
            None => {
                log::debug!("ignoring sort on unknown column '{}'", key.column);
                None
            }
        })
        .collect();

    if keys.is_empty() {
        return rows;
    }

    rows.sort_by(|a, b| {
        for (col, key) in &keys {
            let cmp = key.compare(a.cell(*col), b.cell(*col));
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        a.index.cmp(&b.index)
    });
    rows
}
