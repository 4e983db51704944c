/// GridQuery - Filter, Sort and Aggregation for Tabular Content
///
/// Takes raw tabular file content plus a per-column filter/sort/aggregation
/// configuration and produces the derived view a data-grid editor displays:
/// the visible rows and a summary row. The engine is pure and synchronous;
/// every change recomputes the view from scratch.

pub mod content;
pub mod predicate;
pub mod filter;
pub mod sort;
pub mod aggregate;
pub mod pagination;
pub mod query;

pub use content::{ColumnId, ContentError, ContentTable, Row};
pub use predicate::{evaluate, FilterOperator};
pub use filter::{filter_rows, FilterCondition, FilterSpec};
pub use sort::{sort_rows, CompareMode, SortKey, SortOrder, SortSpec};
pub use aggregate::{aggregate, parse_number, summarize, AggregationAction, AggregationSpec, Summary, SummaryValue};
pub use pagination::Pagination;
pub use query::{compute_view, DerivedView, QuerySpec};

// View server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod websocket;
#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const VARIANTS: &str = "\
gene,chrom,pos,impact,cadd_phred
BRCA1,17,43044295,HIGH,35
TP53,17,7673802,HIGH,28.1
BRCA2,13,32315474,MODERATE,
EGFR,7,55019017,LOW,12.5
KRAS,12,25205246,HIGH,n/a
PTEN,10,87863113,MODERATE,22
";

    #[test]
    fn test_complete_workflow() {
        let table = ContentTable::from_csv(VARIANTS).unwrap();
        assert_eq!(table.len(), 6);

        // User narrows to high-impact variants and sorts by gene name
        let mut spec = QuerySpec::new();
        spec.set_filter("impact", FilterCondition::new(FilterOperator::Equals, "HIGH"));
        spec.toggle_sort("gene");
        spec.set_aggregation("cadd_phred", AggregationAction::Avg);
        spec.set_aggregation("gene", AggregationAction::Count);

        let view = spec.apply(&table);
        let genes: Vec<&str> = view.visible_rows.iter().map(|r| r.cell(0)).collect();
        assert_eq!(genes, ["BRCA1", "KRAS", "TP53"]);

        // "n/a" is skipped by AVG: (35 + 28.1) / 2
        let avg = view.summary["cadd_phred"].as_f64();
        assert!((avg - 31.55).abs() < 1e-9);
        assert_eq!(view.summary["gene"], SummaryValue::Count(3));

        // Flip to descending, summary does not move
        spec.toggle_sort("gene");
        let view2 = spec.apply(&table);
        let genes: Vec<&str> = view2.visible_rows.iter().map(|r| r.cell(0)).collect();
        assert_eq!(genes, ["TP53", "KRAS", "BRCA1"]);
        assert_eq!(view.summary, view2.summary);
    }

    #[test]
    fn test_edit_round_trips_through_original_index() {
        let mut table = ContentTable::from_csv(VARIANTS).unwrap();
        let spec = QuerySpec {
            sort: SortSpec::single("pos", SortOrder::Ascending),
            ..QuerySpec::default()
        };

        // Edit whatever row is displayed first, addressed by its original index
        let target = spec.apply(&table).visible_rows[0].index;
        table.set_cell(target, "impact", "LOW").unwrap();

        let csv = table.to_csv();
        let reloaded = ContentTable::from_csv(&csv).unwrap();
        assert_eq!(reloaded.row(target).unwrap().cell(3), "LOW");
        assert_eq!(reloaded.len(), table.len());
    }

    #[test]
    fn test_concurrent_views_on_shared_table() {
        let table = Arc::new(ContentTable::from_csv(VARIANTS).unwrap());

        let handles: Vec<_> = ["HIGH", "MODERATE", "LOW"]
            .into_iter()
            .map(|impact| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    let filter = FilterSpec::new().with("impact", FilterCondition::new(FilterOperator::Equals, impact));
                    let view = compute_view(&table, &filter, &SortSpec::none(), &AggregationSpec::new());
                    view.original_indices()
                })
            })
            .collect();

        let results: Vec<Vec<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results[0], [0, 1, 4]);
        assert_eq!(results[1], [2, 5]);
        assert_eq!(results[2], [3]);
    }

    #[test]
    fn test_json_content_with_persisted_spec() {
        let json = r#"[
            {"file": "a.csv", "size": 120},
            {"file": "b.vcf", "size": 4096},
            {"file": "c.csv", "size": null}
        ]"#;
        let table = ContentTable::from_json(json).unwrap();

        let saved = r#"{"filter": {"file": {"operator": "ENDS_WITH", "value": ".csv"}}, "aggregation": {"size": "MAX"}}"#;
        let spec: QuerySpec = serde_json::from_str(saved).unwrap();

        let view = spec.apply(&table);
        assert_eq!(view.original_indices(), [0, 2]);
        assert_eq!(view.summary["size"], SummaryValue::Number(120.0));
    }
}
