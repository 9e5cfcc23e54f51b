use serde::Serialize;
use trackiton_core::{QuotePoint, Selection};

use crate::error::CliError;
use crate::output::{format_change, format_price, Table};

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct ComparisonSeries<'a> {
    symbol: &'a str,
    points: &'a [QuotePoint],
}

#[derive(Debug, Serialize)]
struct ComparisonData<'a> {
    selected: &'a [String],
    labels: Vec<&'a str>,
    series: Vec<ComparisonSeries<'a>>,
}

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let store = context.dashboard.ledger().inner();
    let selection = Selection::load(store, context.config.symbols.iter().cloned()).await;
    let records = context
        .dashboard
        .stored()
        .await
        .map(|ledger| ledger.into_records())
        .unwrap_or_default();

    let selected = selection.filter(&records);
    // Labels come from the first record, as every series shares the interval.
    let labels: Vec<&str> = records
        .first()
        .map(|record| record.series().iter().map(|point| point.timestamp.as_str()).collect())
        .unwrap_or_default();

    let mut table = Table::new(vec!["SYMBOL", "FIRST", "LAST", "CHANGE"]);
    for record in &selected {
        table = table.row(vec![
            record.symbol().to_owned(),
            format_price(record.first().price),
            format_price(record.last().price),
            format_change(record.change(), record.change_percent()),
        ]);
    }
    if records.is_empty() {
        table = table.footer("No stored data; run `trackiton load` first.");
    }
    table = table.footer(format!("Selected: {}", selection.symbols().join(", ")));

    let data = ComparisonData {
        selected: selection.symbols(),
        labels,
        series: selected
            .iter()
            .map(|record| ComparisonSeries {
                symbol: record.symbol(),
                points: record.series(),
            })
            .collect(),
    };

    Ok(CommandResult::ok(serde_json::to_value(&data)?, table))
}
