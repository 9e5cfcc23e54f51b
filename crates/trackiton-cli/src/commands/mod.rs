mod clear;
mod compare;
mod load;
mod refresh;
mod schedule;
mod select;
mod show;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use trackiton_core::{
    Clock, Dashboard, DashboardState, FileStore, HttpClient, RefreshSchedule, ReqwestHttpClient,
    StockService, SystemClock, TrackerConfig,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{format_change, format_instant, format_price, Table};

pub struct CommandResult {
    pub data: Value,
    pub table: Table,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, table: Table) -> Self {
        Self {
            data,
            table,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Everything a command needs, wired from the global flags and the environment.
pub struct Context {
    pub config: TrackerConfig,
    pub dashboard: Dashboard<FileStore>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let config = config_from_cli(cli, TrackerConfig::from_env())?;
        Self::new(config, Arc::new(ReqwestHttpClient::new()), Arc::new(SystemClock))
    }

    pub fn new(
        config: TrackerConfig,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CliError> {
        config.validate()?;
        debug!(home = %config.home.display(), symbols = ?config.symbols, "resolved configuration");

        let store = FileStore::new(config.storage_dir());
        let service = StockService::new(config.clone(), http_client, clock.clone());
        let dashboard = Dashboard::new(service, store, clock);

        Ok(Self { config, dashboard })
    }
}

fn config_from_cli(cli: &Cli, mut config: TrackerConfig) -> Result<TrackerConfig, CliError> {
    if let Some(home) = &cli.home {
        config = config.with_home(home.clone());
    }
    if let Some(symbols) = &cli.symbols {
        config = config.with_symbols(symbols.iter().map(|symbol| symbol.trim().to_owned()));
    }
    if let Some(interval) = cli.interval {
        config = config.with_interval(interval);
    }
    if let Some(triggers) = &cli.triggers {
        config = config.with_schedule(RefreshSchedule::parse(triggers)?);
    }
    Ok(config.with_resolve_names(cli.resolve_names))
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let context = Context::from_cli(cli)?;
    execute(&cli.command, &context).await
}

pub async fn execute(command: &Command, context: &Context) -> Result<CommandResult, CliError> {
    match command {
        Command::Load => load::run(context).await,
        Command::Refresh => refresh::run(context).await,
        Command::Show(args) => show::run(args, context).await,
        Command::Schedule => schedule::run(context).await,
        Command::Compare => compare::run(context).await,
        Command::Select(args) => select::run(args, context).await,
        Command::Clear => clear::run(context).await,
    }
}

/// Card view shared by `load`, `refresh` and `show`.
fn cards_table(state: &DashboardState) -> Table {
    let mut table = Table::new(vec!["SYMBOL", "NAME", "PRICE", "CHANGE", "POINTS"]);
    for record in &state.records {
        table = table.row(vec![
            record.symbol().to_owned(),
            record.name().to_owned(),
            format_price(record.price()),
            format_change(record.change(), record.change_percent()),
            record.series().len().to_string(),
        ]);
    }

    if state.records.is_empty() {
        table = table.footer("No data available");
    }
    if let Some(fetched_at) = state.fetched_at {
        table = table.footer(format!("Last updated: {}", format_instant(fetched_at)));
    }
    table.footer(format!("Next update: {}", format_instant(state.next_refresh)))
}

fn dashboard_result(state: DashboardState) -> Result<CommandResult, CliError> {
    let table = cards_table(&state);
    let warnings = state.warnings.clone();
    Ok(CommandResult::ok(serde_json::to_value(&state)?, table).with_warnings(warnings))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use time::macros::time;
    use trackiton_core::ValidationError;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid arguments")
    }

    #[test]
    fn triggers_flag_replaces_the_default_schedule() {
        let cli = parse(&["trackiton", "--triggers", "06:30,18:00", "schedule"]);

        let config = config_from_cli(&cli, TrackerConfig::default()).expect("valid config");

        assert_eq!(config.schedule.triggers(), [time!(06:30), time!(18:00)]);
    }

    #[test]
    fn malformed_trigger_is_a_validation_error() {
        let cli = parse(&["trackiton", "--triggers", "25:00", "schedule"]);

        let error = config_from_cli(&cli, TrackerConfig::default()).err().expect("invalid trigger");

        assert!(matches!(
            error,
            CliError::Validation(ValidationError::InvalidTriggerTime { .. })
        ));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn flags_override_environment_defaults() {
        let cli = parse(&["trackiton", "--symbols", "MSFT, JPM", "--interval", "60min", "load"]);

        let config = config_from_cli(&cli, TrackerConfig::default()).expect("valid config");

        assert_eq!(config.symbols, ["MSFT", "JPM"]);
        assert_eq!(config.interval, trackiton_core::Interval::SixtyMinutes);
        assert_eq!(config.schedule, RefreshSchedule::default());
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use trackiton_core::{ManualClock, RetryConfig, ScriptedHttpClient, TrackerConfig, UtcDateTime};

    use super::Context;

    pub const SERIES: &str = r#"{"Meta Data":{"2. Symbol":"AAPL"},"Time Series (5min)":{"2024-01-10 15:55:00":{"4. close":"185.00"},"2024-01-10 16:00:00":{"4. close":"186.50"}}}"#;

    pub fn context(home: &Path, client: ScriptedHttpClient) -> Context {
        context_for(home, client, &["AAPL"])
    }

    pub fn context_for(home: &Path, client: ScriptedHttpClient, symbols: &[&str]) -> Context {
        let config = TrackerConfig::default()
            .with_api_key("test-key")
            .with_symbols(symbols.iter().copied())
            .with_home(home)
            .with_retry(RetryConfig::no_retry())
            .with_symbol_delay(Duration::ZERO);
        let clock = ManualClock::new(UtcDateTime::parse("2024-01-10T21:30:00Z").expect("valid"));
        Context::new(config, Arc::new(client), Arc::new(clock)).expect("valid context")
    }
}
