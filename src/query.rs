//! Query orchestration.
//!
//! `compute_view` is the single entry point the editor calls whenever a
//! filter, sort key, aggregation or page changes. The pipeline order is
//! fixed:
//!
//! 1. filter the table's rows,
//! 2. sort the filtered rows,
//! 3. aggregate over the filtered rows (sorting never changes a summary),
//! 4. cut the requested page out of the sorted rows.
//!
//! Every call is a full recomputation with no state carried between calls.

use crate::aggregate::{summarize, AggregationAction, AggregationSpec, Summary};
use crate::content::{ColumnId, ContentTable, Row};
use crate::filter::{filter_rows, FilterCondition, FilterSpec};
use crate::pagination::Pagination;
use crate::sort::{sort_rows, SortKey, SortOrder, SortSpec};
use serde::{Deserialize, Serialize};

/// The filtered, sorted, aggregated presentation of a table.
///
/// Rows are borrowed from the table the view was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedView<'a> {
    pub visible_rows: Vec<&'a Row>,
    pub summary: Summary,
    /// Rows that passed the filter, before paging.
    pub total_rows: usize,
}

impl<'a> DerivedView<'a> {
    pub fn len(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_rows.is_empty()
    }

    /// Original index of each visible row, in display order.
    pub fn original_indices(&self) -> Vec<usize> {
        self.visible_rows.iter().map(|r| r.index).collect()
    }
}

/// Filter, sort and aggregate `table` in one pass.
///
/// ```
/// use gridquery::*;
///
/// let table = ContentTable::from_csv("name,score\na,10\nb,notanumber\nc,30\n").unwrap();
/// let view = compute_view(
///     &table,
///     &FilterSpec::new(),
///     &SortSpec::single("name", SortOrder::Descending),
///     &AggregationSpec::new().with("score", AggregationAction::Sum),
/// );
///
/// assert_eq!(view.original_indices(), [2, 1, 0]);
/// assert_eq!(view.summary["score"], SummaryValue::Number(40.0));
/// ```
pub fn compute_view<'a>(
    table: &'a ContentTable,
    filter: &FilterSpec,
    sort: &SortSpec,
    aggregation: &AggregationSpec,
) -> DerivedView<'a> {
    let filtered = filter_rows(table, table.rows(), filter);
    let summary = summarize(table, &filtered, aggregation);
    let visible_rows = sort_rows(table, filtered, sort);

    log::trace!(
        "computed view: {} of {} rows, {} summary values",
        visible_rows.len(),
        table.len(),
        summary.len()
    );

    DerivedView {
        total_rows: visible_rows.len(),
        visible_rows,
        summary,
    }
}

/// Everything the editor lets the user configure on one table.
///
/// Callers own this state and may persist it as JSON between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    pub filter: FilterSpec,
    pub sort: SortSpec,
    pub aggregation: AggregationSpec,
    pub pagination: Option<Pagination>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(&mut self, column: impl Into<ColumnId>, condition: FilterCondition) {
        self.filter.set(column, condition);
        self.reset_page();
    }

    pub fn clear_filter(&mut self, column: &str) {
        if self.filter.clear(column).is_some() {
            self.reset_page();
        }
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    /// Header-click behaviour: unsorted -> ascending -> descending -> unsorted.
    /// Clicking a different column starts over at ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.primary() {
            Some(key) if key.column == column => match key.order {
                SortOrder::Ascending => SortSpec::from_keys(vec![SortKey {
                    order: SortOrder::Descending,
                    ..key.clone()
                }]),
                SortOrder::Descending => SortSpec::none(),
            },
            _ => SortSpec::single(column, SortOrder::Ascending),
        };
    }

    pub fn set_aggregation(&mut self, column: impl Into<ColumnId>, action: AggregationAction) {
        self.aggregation.set(column, action);
    }

    pub fn set_page(&mut self, page: usize, page_size: usize) {
        self.pagination = Some(Pagination::new(page, page_size));
    }

    fn reset_page(&mut self) {
        if let Some(p) = self.pagination.as_mut() {
            p.page = 0;
        }
    }

    /// Run the full pipeline, including paging.
    pub fn apply<'a>(&self, table: &'a ContentTable) -> DerivedView<'a> {
        let mut view = compute_view(table, &self.filter, &self.sort, &self.aggregation);
        if let Some(pagination) = &self.pagination {
            let window = pagination.window(view.total_rows);
            view.visible_rows = view.visible_rows[window].to_vec();
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, SummaryValue};
    use crate::predicate::FilterOperator;

    fn scores() -> ContentTable {
        ContentTable::from_csv("name,score\na,10\nb,notanumber\nc,30\n").unwrap()
    }

    #[test]
    fn test_worked_examples() {
        let table = scores();
        let none = FilterSpec::new();
        let no_sort = SortSpec::none();

        let view = compute_view(&table, &none, &no_sort, &AggregationSpec::new().with("score", AggregationAction::Avg));
        assert_eq!(view.summary["score"], SummaryValue::Number(20.0));

        let view = compute_view(&table, &none, &no_sort, &AggregationSpec::new().with("score", AggregationAction::Sum));
        assert_eq!(view.summary["score"], SummaryValue::Number(40.0));

        let contains_a = FilterSpec::new().with("name", FilterCondition::new(FilterOperator::Contains, "a"));
        let view = compute_view(&table, &contains_a, &no_sort, &AggregationSpec::new());
        assert_eq!(view.len(), 1);
        assert_eq!(view.visible_rows[0].cells, vec!["a", "10"]);
        assert!(view.summary.is_empty());
    }

    #[test]
    fn test_summary_reflects_filtered_rows_only() {
        let table = scores();
        let filter = FilterSpec::new().with("name", FilterCondition::new(FilterOperator::NotEquals, "c"));
        let aggregation = AggregationSpec::new()
            .with("score", AggregationAction::Sum)
            .with("name", AggregationAction::Count);

        let view = compute_view(&table, &filter, &SortSpec::none(), &aggregation);
        assert_eq!(view.summary["score"], SummaryValue::Number(10.0));
        assert_eq!(view.summary["name"], SummaryValue::Count(2));
    }

    #[test]
    fn test_sort_never_changes_aggregation() {
        let table = ContentTable::from_csv("k,v\nb,2\na,x\nc,-1\na,4\nb,\n").unwrap();
        let filter = FilterSpec::new().with("k", FilterCondition::new(FilterOperator::NotEquals, "c"));
        let filtered = filter_rows(&table, table.rows(), &filter);

        let sorts = [
            SortSpec::none(),
            SortSpec::single("k", SortOrder::Ascending),
            SortSpec::single("v", SortOrder::Descending),
            SortSpec::from_keys(vec![SortKey::ascending("v").numeric()]),
        ];
        for sort in &sorts {
            let sorted = sort_rows(&table, filtered.clone(), sort);
            for action in AggregationAction::all() {
                assert_eq!(
                    aggregate(&table, &sorted, "v", *action),
                    aggregate(&table, &filtered, "v", *action),
                    "{:?} under {:?}",
                    action,
                    sort
                );
            }
        }
    }

    #[test]
    fn test_sort_never_changes_membership() {
        let table = scores();
        let filter = FilterSpec::new().with("score", FilterCondition::new(FilterOperator::IsNotEmpty, ""));

        let plain = compute_view(&table, &filter, &SortSpec::none(), &AggregationSpec::new());
        let sorted = compute_view(&table, &filter, &SortSpec::single("score", SortOrder::Descending), &AggregationSpec::new());

        let mut a = plain.original_indices();
        let mut b = sorted.original_indices();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_filtered_set() {
        let table = scores();
        let filter = FilterSpec::new().with("name", FilterCondition::new(FilterOperator::Equals, "zzz"));
        let aggregation = AggregationSpec::new()
            .with("score", AggregationAction::Sum)
            .with("name", AggregationAction::Count);

        let view = compute_view(&table, &filter, &SortSpec::none(), &aggregation);
        assert!(view.is_empty());
        assert_eq!(view.summary["score"], SummaryValue::Number(0.0));
        assert_eq!(view.summary["name"], SummaryValue::Count(0));

        let avg = AggregationSpec::new().with("score", AggregationAction::Avg);
        let view = compute_view(&table, &filter, &SortSpec::none(), &avg);
        assert!(!view.summary.contains_key("score"));
    }

    #[test]
    fn test_unknown_columns_everywhere() {
        let table = scores();
        let filter = FilterSpec::new().with("ghost", FilterCondition::new(FilterOperator::Equals, "x"));
        let sort = SortSpec::single("ghost", SortOrder::Descending);
        let aggregation = AggregationSpec::new().with("ghost", AggregationAction::Sum);

        let view = compute_view(&table, &filter, &sort, &aggregation);
        assert_eq!(view.original_indices(), [0, 1, 2]);
        assert!(view.summary.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let table = scores();
        let mut spec = QuerySpec::new();
        spec.set_filter("score", FilterCondition::new(FilterOperator::IsNotEmpty, ""));
        spec.toggle_sort("score");
        spec.set_aggregation("score", AggregationAction::Max);

        assert_eq!(spec.apply(&table), spec.apply(&table));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let table = scores();
        let before = table.clone();
        let mut spec = QuerySpec::new();
        spec.toggle_sort("name");
        spec.toggle_sort("name");
        let _ = spec.apply(&table);
        assert_eq!(table, before);
    }

    #[test]
    fn test_paging_keeps_summary_over_all_rows() {
        let mut table = ContentTable::new(["id", "amount"]).unwrap();
        for i in 0..7 {
            table.push_row([format!("r{}", i), (i * 10).to_string()]).unwrap();
        }

        let mut spec = QuerySpec::new();
        spec.set_aggregation("amount", AggregationAction::Sum);
        spec.set_sort(SortSpec::from_keys(vec![SortKey::descending("amount").numeric()]));
        spec.set_page(1, 3);

        let view = spec.apply(&table);
        assert_eq!(view.total_rows, 7);
        assert_eq!(view.original_indices(), [3, 2, 1]);
        assert_eq!(view.summary["amount"], SummaryValue::Number(210.0));

        spec.set_page(5, 3);
        let view = spec.apply(&table);
        assert!(view.is_empty());
        assert_eq!(view.total_rows, 7);
    }

    #[test]
    fn test_toggle_sort_cycle() {
        let mut spec = QuerySpec::new();

        spec.toggle_sort("score");
        assert_eq!(spec.sort, SortSpec::single("score", SortOrder::Ascending));
        spec.toggle_sort("score");
        assert_eq!(spec.sort, SortSpec::single("score", SortOrder::Descending));
        spec.toggle_sort("score");
        assert!(spec.sort.is_empty());

        spec.toggle_sort("score");
        spec.toggle_sort("name");
        assert_eq!(spec.sort, SortSpec::single("name", SortOrder::Ascending));
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut spec = QuerySpec::new();
        spec.set_page(4, 25);
        spec.set_filter("name", FilterCondition::new(FilterOperator::Contains, "a"));
        assert_eq!(spec.pagination, Some(Pagination::new(0, 25)));

        spec.set_page(2, 25);
        spec.clear_filter("missing");
        assert_eq!(spec.pagination, Some(Pagination::new(2, 25)));
        spec.clear_filter("name");
        assert_eq!(spec.pagination, Some(Pagination::new(0, 25)));
    }

    #[test]
    fn test_query_spec_json_roundtrip() {
        let json = r#"{
            "filter": {"name": {"operator": "STARTS_WITH", "value": "a"}},
            "sort": [{"column": "score", "direction": "desc"}],
            "aggregation": {"score": "COUNT"},
            "pagination": {"page": 0, "pageSize": 10}
        }"#;
        let spec: QuerySpec = serde_json::from_str(json).unwrap();
        let again: QuerySpec = serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(spec, again);

        let partial: QuerySpec = serde_json::from_str(r#"{"aggregation": {"score": "SUM"}}"#).unwrap();
        assert!(partial.filter.is_empty());
        assert!(partial.pagination.is_none());

        let table = scores();
        let view = spec.apply(&table);
        assert_eq!(view.original_indices(), [0]);
        assert_eq!(view.summary["score"], SummaryValue::Count(1));
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let table = scores();
        let view = compute_view(&table, &FilterSpec::new(), &SortSpec::none(), &AggregationSpec::new());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["totalRows"], 3);
        assert_eq!(json["visibleRows"][1]["index"], 1);
        assert_eq!(json["visibleRows"][1]["cells"][1], "notanumber");
    }
}
