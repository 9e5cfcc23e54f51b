use crate::error::CliError;
use crate::output::{format_instant, Table};

use super::{CommandResult, Context};

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let status = context.dashboard.schedule_status().await;

    let last_fetch = status
        .last_fetch
        .map_or_else(|| String::from("never"), format_instant);
    let table = Table::default()
        .footer(format!("Last updated : {last_fetch}"))
        .footer(format!("Refresh due  : {}", if status.refresh_due { "yes" } else { "no" }))
        .footer(format!("Next update  : {}", format_instant(status.next_refresh)))
        .footer(format!("Schedule     : {}", status.triggers));

    Ok(CommandResult::ok(serde_json::to_value(&status)?, table))
}

#[cfg(test)]
mod tests {
    use trackiton_core::ScriptedHttpClient;

    use super::*;
    use crate::commands::test_support::{context, SERIES};

    #[tokio::test]
    async fn fresh_ledger_is_not_due() {
        let temp = tempfile::tempdir().expect("tempdir");
        let context = context(temp.path(), ScriptedHttpClient::new().respond("symbol=AAPL", SERIES));
        context.dashboard.refresh().await.expect("refresh");

        let result = run(&context).await.expect("schedule");

        assert_eq!(result.data["refreshDue"], false);
        assert_eq!(result.data["nextRefresh"], "2024-01-11T01:00:00Z");
        assert_eq!(result.table.footer[0], "Last updated : 2024-01-10 21:30 UTC");
    }

    #[tokio::test]
    async fn empty_store_is_due_now() {
        let temp = tempfile::tempdir().expect("tempdir");
        let context = context(temp.path(), ScriptedHttpClient::new());

        let result = run(&context).await.expect("schedule");

        assert_eq!(result.data["refreshDue"], true);
        assert_eq!(result.data["lastFetch"], serde_json::Value::Null);
    }
}
