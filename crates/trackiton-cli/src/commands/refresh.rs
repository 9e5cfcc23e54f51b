use crate::error::CliError;

use super::{dashboard_result, CommandResult, Context};

pub async fn run(context: &Context) -> Result<CommandResult, CliError> {
    let state = context.dashboard.refresh().await?;
    dashboard_result(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trackiton_core::{ScriptedHttpClient, SystemClock, TrackerConfig};

    use super::*;
    use crate::commands::test_support::{context_for, SERIES};

    #[tokio::test]
    async fn refresh_reports_skipped_symbols_as_warnings() {
        let temp = tempfile::tempdir().expect("tempdir");
        let client = ScriptedHttpClient::new()
            .respond("symbol=AAPL", SERIES)
            .respond("symbol=BADSYM", r#"{"Meta Data":{}}"#);
        let context = context_for(temp.path(), client, &["AAPL", "BADSYM"]);

        let result = run(&context).await.expect("refresh");

        assert_eq!(result.data["records"].as_array().map(Vec::len), Some(1));
        assert_eq!(result.warnings, vec![String::from("BADSYM: No data available for BADSYM.")]);
    }

    #[tokio::test]
    async fn refresh_without_key_fails_with_config_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = TrackerConfig::default().with_home(temp.path());
        let context = Context::new(config, Arc::new(ScriptedHttpClient::new()), Arc::new(SystemClock))
            .expect("context");

        let error = run(&context).await.err().expect("missing key");
        assert_eq!(error.exit_code(), 2);
    }
}
