/// Performance Example
///
/// This example demonstrates:
/// - Recomputing a full view on a large table
/// - Cost of each pipeline stage (filter, sort, aggregate)
/// - Lexicographic vs numeric sort

use gridquery::*;
use std::time::Instant;

fn main() {
    println!("=== GridQuery Performance Example ===\n");

    let n = 200_000;

    let mut table = ContentTable::new(["id", "sample", "depth", "quality"]).unwrap();
    let start = Instant::now();
    for i in 0..n {
        table
            .push_row([
                i.to_string(),
                format!("S{:04}", i % 1000),
                ((i * 37) % 500).to_string(),
                if i % 11 == 0 { String::new() } else { format!("{}.5", i % 60) },
            ])
            .unwrap();
    }
    println!("1. Built {} rows in {:?}\n", n, start.elapsed());

    let filter = FilterSpec::new().with("sample", FilterCondition::new(FilterOperator::StartsWith, "S00"));

    let start = Instant::now();
    let filtered = filter_rows(&table, table.rows(), &filter);
    println!("2. Filter kept {} rows in {:?}", filtered.len(), start.elapsed());

    let start = Instant::now();
    let lexicographic = sort_rows(&table, filtered.clone(), &SortSpec::single("depth", SortOrder::Descending));
    println!("3. Lexicographic sort in {:?} (first depth: {})", start.elapsed(), lexicographic[0].cell(2));

    let start = Instant::now();
    let numeric = sort_rows(
        &table,
        filtered.clone(),
        &SortSpec::from_keys(vec![SortKey::descending("depth").numeric()]),
    );
    println!("4. Numeric sort in {:?} (first depth: {})", start.elapsed(), numeric[0].cell(2));

    let aggregation = AggregationSpec::new()
        .with("quality", AggregationAction::Avg)
        .with("id", AggregationAction::Count)
        .with("depth", AggregationAction::Max);
    let start = Instant::now();
    let summary = summarize(&table, &filtered, &aggregation);
    println!("5. Summary in {:?}: {:?}\n", start.elapsed(), summary);

    let mut spec = QuerySpec::new();
    spec.filter = filter;
    spec.aggregation = aggregation;
    spec.toggle_sort("sample");
    spec.set_page(0, 50);

    let start = Instant::now();
    let iterations = 20;
    for _ in 0..iterations {
        let view = spec.apply(&table);
        assert_eq!(view.len(), 50);
    }
    println!("6. Full recompute: {:?} per view", start.elapsed() / iterations);
}
