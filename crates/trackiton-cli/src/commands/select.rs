use serde_json::json;
use trackiton_core::Selection;

use crate::cli::SelectArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(args: &SelectArgs, context: &Context) -> Result<CommandResult, CliError> {
    let store = context.dashboard.ledger().inner();
    let mut selection = Selection::load(store, context.config.symbols.iter().cloned()).await;

    let symbol = args.symbol.trim();
    let selected = selection.toggle(symbol);
    selection.save(store).await?;

    let action = if selected { "added" } else { "removed" };
    let table = Table::default()
        .footer(format!("{symbol} {action}"))
        .footer(format!("Selected: {}", selection.symbols().join(", ")));
    let data = json!({
        "symbol": symbol,
        "selected": selected,
        "selection": selection.symbols(),
    });

    Ok(CommandResult::ok(data, table))
}
