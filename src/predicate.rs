//! Column predicates.
//!
//! A predicate is one `(operator, value)` pair tested against one cell. All
//! operators work on plain text and are total: no input makes them fail.

use serde::{Deserialize, Serialize};

/// Filter operators offered on every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    #[default]
    Contains,
    NotContains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
}

impl FilterOperator {
    /// Display label for the operator
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::NotContains => "does not contain",
            Self::Equals => "equals",
            Self::NotEquals => "does not equal",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::IsEmpty => "is empty",
            Self::IsNotEmpty => "is not empty",
        }
    }

    /// Returns true if this operator reads the filter value
    pub fn requires_value(&self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }

    /// All operators in display order
    pub fn all() -> &'static [FilterOperator] {
        &[
            Self::Contains,
            Self::NotContains,
            Self::Equals,
            Self::NotEquals,
            Self::StartsWith,
            Self::EndsWith,
            Self::IsEmpty,
            Self::IsNotEmpty,
        ]
    }
}

/// Test one cell against one `(operator, value)` pair.
///
/// Text comparisons are case-sensitive. `IsEmpty` ignores `value` and treats
/// whitespace-only cells as empty.
///
/// ```
/// use gridquery::{evaluate, FilterOperator};
///
/// assert!(evaluate("BRCA1", FilterOperator::StartsWith, "BRCA"));
/// assert!(!evaluate("brca1", FilterOperator::Contains, "BRCA"));
/// assert!(evaluate("   ", FilterOperator::IsEmpty, "ignored"));
/// ```
pub fn evaluate(cell: &str, operator: FilterOperator, value: &str) -> bool {
    match operator {
        FilterOperator::Contains => cell.contains(value),
        FilterOperator::NotContains => !cell.contains(value),
        FilterOperator::Equals => cell == value,
        FilterOperator::NotEquals => cell != value,
        FilterOperator::StartsWith => cell.starts_with(value),
        FilterOperator::EndsWith => cell.ends_with(value),
        FilterOperator::IsEmpty => is_blank(cell),
        FilterOperator::IsNotEmpty => !is_blank(cell),
    }
}

fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}
