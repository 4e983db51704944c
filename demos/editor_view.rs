/// Editor View Example
///
/// This example demonstrates:
/// - Loading tabular content from CSV text
/// - Filtering, sorting and aggregating it the way a data-grid editor does
/// - Writing an edit back through a row's original index
/// - Persisting the editor's query settings as JSON

use gridquery::{
    AggregationAction, ContentTable, DerivedView, FilterCondition, FilterOperator, QuerySpec,
};

const VARIANTS: &str = "\
gene,chrom,pos,impact,cadd_phred
BRCA1,17,43044295,HIGH,35
TP53,17,7673802,HIGH,28.1
BRCA2,13,32315474,MODERATE,
EGFR,7,55019017,LOW,12.5
KRAS,12,25205246,HIGH,n/a
PTEN,10,87863113,MODERATE,22
";

fn print_view(table: &ContentTable, view: &DerivedView<'_>) {
    println!("   {}", table.columns().join(" | "));
    for row in &view.visible_rows {
        println!("   #{} {}", row.index, row.cells.join(" | "));
    }
    let mut summary: Vec<_> = view.summary.iter().collect();
    summary.sort_by(|a, b| a.0.cmp(b.0));
    for (column, value) in summary {
        println!("   summary {} = {}", column, value.as_f64());
    }
    println!("   ({} of {} rows)\n", view.len(), view.total_rows);
}

fn main() {
    println!("=== GridQuery Editor View Example ===\n");

    // 1. Load content
    println!("1. Loading variants table...");
    let mut table = ContentTable::from_csv(VARIANTS).unwrap();
    println!("   Loaded {} rows\n", table.len());

    // 2. Filter + aggregate
    println!("2. Only HIGH impact, average CADD score...");
    let mut spec = QuerySpec::new();
    spec.set_filter("impact", FilterCondition::new(FilterOperator::Equals, "HIGH"));
    spec.set_aggregation("cadd_phred", AggregationAction::Avg);
    spec.set_aggregation("gene", AggregationAction::Count);
    print_view(&table, &spec.apply(&table));

    // 3. Header clicks: ascending, then descending
    println!("3. Sorting by gene (click twice for descending)...");
    spec.toggle_sort("gene");
    spec.toggle_sort("gene");
    print_view(&table, &spec.apply(&table));

    // 4. Edit the first visible row
    println!("4. Editing the first visible row's CADD score...");
    let target = spec.apply(&table).visible_rows[0].index;
    table.set_cell(target, "cadd_phred", "30").unwrap();
    print_view(&table, &spec.apply(&table));

    // 5. Persist the settings
    println!("5. Saved query settings:");
    println!("   {}", serde_json::to_string(&spec).unwrap());
}
