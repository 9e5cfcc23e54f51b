use serde_json::json;

use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Context};

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    context.dashboard.clear().await?;
    let table = Table::default().footer("Stored data cleared.");
    Ok(CommandResult::ok(json!({ "cleared": true }), table))
}

#[cfg(test)]
mod tests {
    use trackiton_core::ScriptedHttpClient;

    use super::*;
    use crate::commands::test_support::{context, SERIES};

    #[tokio::test]
    async fn clear_makes_next_load_refresh() {
        let temp = tempfile::tempdir().expect("tempdir");
        let context = context(temp.path(), ScriptedHttpClient::new().respond("symbol=AAPL", SERIES));
        context.dashboard.refresh().await.expect("refresh");

        run(&context).await.expect("clear");

        assert!(context.dashboard.stored().await.is_none());
        assert!(context.dashboard.schedule_status().await.refresh_due);
    }
}
