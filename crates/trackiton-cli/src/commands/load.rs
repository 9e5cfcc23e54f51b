use crate::error::CliError;

use super::{dashboard_result, CommandResult, Context};

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let state = context.dashboard.load().await?;
    dashboard_result(state)
}

#[cfg(test)]
mod tests {
    use trackiton_core::ScriptedHttpClient;

    use super::*;
    use crate::commands::test_support::{context, SERIES};

    #[tokio::test]
    async fn load_twice_fetches_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = context(temp.path(), ScriptedHttpClient::new().respond("symbol=AAPL", SERIES));
        let result = run(&first).await.expect("first load");
        assert_eq!(result.data["source"], "refreshed");

        let second = context(temp.path(), ScriptedHttpClient::new());
        let result = run(&second).await.expect("second load");

        assert_eq!(result.data["source"], "stored");
        assert_eq!(result.data["records"][0]["symbol"], "AAPL");
        assert_eq!(result.data["records"][0]["price"], 186.5);
    }
}
