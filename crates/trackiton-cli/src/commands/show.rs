use serde_json::json;

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{cards_table, CommandResult, Context};

pub async fn run(args: &ShowArgs, context: &Context) -> Result<CommandResult, CliError> {
    let Some(ledger) = context.dashboard.stored().await else {
        let table = Table::default().footer("No stored data; run `trackiton load` first.");
        return Ok(CommandResult::ok(json!({ "records": [], "fetchedAt": null }), table));
    };

    let mut state = context.dashboard.stored_state(ledger);
    if !args.symbols.is_empty() {
        state
            .records
            .retain(|record| args.symbols.iter().any(|symbol| symbol == record.symbol()));
    }

    let table = cards_table(&state);
    Ok(CommandResult::ok(serde_json::to_value(&state)?, table))
}

#[cfg(test)]
mod tests {
    use trackiton_core::ScriptedHttpClient;

    use super::*;
    use crate::commands::test_support::{context, context_for, SERIES};

    #[tokio::test]
    async fn show_without_ledger_does_not_fetch() {
        let temp = tempfile::tempdir().expect("tempdir");
        let context = context(temp.path(), ScriptedHttpClient::new());

        let result = run(&ShowArgs { symbols: Vec::new() }, &context).await.expect("show");

        assert_eq!(result.data["records"], json!([]));
        assert_eq!(result.table.footer, vec!["No stored data; run `trackiton load` first."]);
    }

    #[tokio::test]
    async fn show_filters_by_symbol() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = ScriptedHttpClient::new()
            .respond("symbol=AAPL", SERIES)
            .respond("symbol=JPM", SERIES);
        let context = context_for(temp.path(), client, &["AAPL", "JPM"]);
        context.dashboard.refresh().await.expect("refresh");

        let args = ShowArgs {
            symbols: vec![String::from("JPM")],
        };
        let result = run(&args, &context).await.expect("show");

        assert_eq!(result.data["records"].as_array().map(Vec::len), Some(1));
        assert_eq!(result.data["records"][0]["symbol"], "JPM");
    }
}
