//! Dashboard refresh coordination.
//!
//! [`Dashboard::load`] serves the stored ledger while the schedule says it is
//! current and runs a refresh cycle otherwise. At most one refresh cycle is in
//! flight at a time: callers queue on a gate, and a [`Dashboard::refresh`]
//! caller that waited while another cycle finished gets that cycle's outcome,
//! success or failure, instead of calling upstream again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::schedule::RefreshSchedule;
use crate::service::{BatchOutcome, StockService};
use crate::store::{KeyValueStore, LedgerStore};
use crate::{FetchError, FetchLedger, StockRecord, StoreError, UtcDateTime};

/// Where the records of a [`DashboardState`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The stored ledger was current.
    Stored,
    /// A refresh cycle produced the records.
    Refreshed,
    /// A refresh cycle produced nothing, so the previous ledger is served.
    StaleFallback,
}

/// Everything the rendering layer needs after a load or refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub records: Vec<StockRecord>,
    pub fetched_at: Option<UtcDateTime>,
    pub next_refresh: UtcDateTime,
    pub source: DataSource,
    pub warnings: Vec<String>,
}

impl DashboardState {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Schedule position of the stored ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStatus {
    pub last_fetch: Option<UtcDateTime>,
    pub now: UtcDateTime,
    pub refresh_due: bool,
    pub next_refresh: UtcDateTime,
    pub triggers: String,
}

type CycleOutcome = Result<DashboardState, FetchError>;

pub struct Dashboard<S> {
    service: StockService,
    ledger: LedgerStore<S>,
    schedule: RefreshSchedule,
    clock: Arc<dyn Clock>,
    /// Serialises cycles and holds the outcome of the latest one.
    gate: Mutex<Option<CycleOutcome>>,
    completed_cycles: AtomicU64,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// The refresh schedule is taken from the service's configuration.
    pub fn new(service: StockService, store: S, clock: Arc<dyn Clock>) -> Self {
        let schedule = service.config().schedule.clone();
        Self {
            service,
            ledger: LedgerStore::new(store),
            schedule,
            clock,
            gate: Mutex::new(None),
            completed_cycles: AtomicU64::new(0),
        }
    }

    pub fn service(&self) -> &StockService {
        &self.service
    }

    pub fn ledger(&self) -> &LedgerStore<S> {
        &self.ledger
    }

    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }

    /// Serves the stored ledger when it is current, refreshing otherwise.
    ///
    /// # Errors
    ///
    /// Only fatal fetch errors such as [`FetchError::ConfigMissing`] are
    /// returned; per-symbol failures end up in [`DashboardState::warnings`].
    pub async fn load(&self) -> Result<DashboardState, FetchError> {
        let mut last_cycle = self.gate.lock().await;
        let now = self.clock.now();
        let stored = self.ledger.load().await;

        if let Some(ledger) = &stored {
            if !self.schedule.is_refresh_due(Some(ledger.fetched_at()), now) {
                info!(records = ledger.len(), fetched_at = %ledger.fetched_at(), "serving stored ledger");
                return Ok(self.state_from(ledger.clone(), DataSource::Stored, Vec::new(), now));
            }
            info!(fetched_at = %ledger.fetched_at(), "stored ledger is stale, refreshing");
        }

        let outcome = self.run_cycle(stored).await;
        *last_cycle = Some(outcome.clone());
        outcome
    }

    /// Runs a refresh cycle regardless of the schedule.
    ///
    /// A caller that had to wait for another cycle gets that cycle's outcome,
    /// including its source and warnings, instead of calling upstream again.
    pub async fn refresh(&self) -> Result<DashboardState, FetchError> {
        let seen = self.completed_cycles.load(Ordering::Acquire);
        let mut last_cycle = self.gate.lock().await;

        if self.completed_cycles.load(Ordering::Acquire) != seen {
            if let Some(outcome) = last_cycle.as_ref() {
                info!("refresh completed while waiting, reusing its outcome");
                return outcome.clone();
            }
        }

        let stored = self.ledger.load().await;
        let outcome = self.run_cycle(stored).await;
        *last_cycle = Some(outcome.clone());
        outcome
    }

    /// The stored ledger, without fetching.
    pub async fn stored(&self) -> Option<FetchLedger> {
        self.ledger.load().await
    }

    /// Presents `ledger` as stored data, with the next refresh computed from now.
    pub fn stored_state(&self, ledger: FetchLedger) -> DashboardState {
        self.state_from(ledger, DataSource::Stored, Vec::new(), self.clock.now())
    }

    pub async fn schedule_status(&self) -> ScheduleStatus {
        let now = self.clock.now();
        let last_fetch = self.ledger.last_fetch_time().await;

        ScheduleStatus {
            last_fetch,
            now,
            refresh_due: self.schedule.is_refresh_due(last_fetch, now),
            next_refresh: self.schedule.next_trigger(last_fetch, now),
            triggers: self.schedule.describe(),
        }
    }

    /// Drops the stored ledger and the in-memory cache.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut last_cycle = self.gate.lock().await;
        *last_cycle = None;
        self.service.cache().clear().await;
        self.ledger.clear().await
    }

    async fn run_cycle(&self, previous: Option<FetchLedger>) -> Result<DashboardState, FetchError> {
        let symbols = self.service.config().symbols.clone();
        let outcome = self.service.fetch_many(&symbols).await;
        self.completed_cycles.fetch_add(1, Ordering::AcqRel);

        let BatchOutcome { records, failures } = outcome?;
        let mut warnings: Vec<String> = failures
            .iter()
            .map(|failure| format!("{}: {}", failure.symbol, failure.error.user_message()))
            .collect();
        let now = self.clock.now();

        if records.is_empty() {
            warn!(failed = failures.len(), "refresh cycle produced no records");
            return Ok(match previous {
                Some(ledger) => {
                    warnings.push(String::from("Refresh failed; showing previously stored data."));
                    self.state_from(ledger, DataSource::StaleFallback, warnings, now)
                }
                None => DashboardState {
                    records: Vec::new(),
                    fetched_at: None,
                    next_refresh: self.schedule.next_trigger(None, now),
                    source: DataSource::Refreshed,
                    warnings,
                },
            });
        }

        let fetched_at = previous
            .as_ref()
            .map_or(now, |ledger| ledger.fetched_at().max(now));
        let ledger = FetchLedger::new(records, fetched_at);

        if let Err(store_error) = self.ledger.save(&ledger).await {
            error!(%store_error, "failed to persist ledger");
            warnings.push(format!("Could not save data for offline use: {store_error}"));
        }

        info!(records = ledger.len(), %fetched_at, "refresh cycle finished");
        Ok(self.state_from(ledger, DataSource::Refreshed, warnings, now))
    }

    fn state_from(
        &self,
        ledger: FetchLedger,
        source: DataSource,
        warnings: Vec<String>,
        now: UtcDateTime,
    ) -> DashboardState {
        let fetched_at = ledger.fetched_at();
        DashboardState {
            records: ledger.into_records(),
            fetched_at: Some(fetched_at),
            next_refresh: self.schedule.next_trigger(Some(fetched_at), now),
            source,
            warnings,
        }
    }
}
