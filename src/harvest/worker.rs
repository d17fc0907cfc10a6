use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::time::sleep;

use crate::fetch::{AggTrade, TradeSource};
use crate::governor::RequestGovernor;
use crate::records::group_by_day;
use crate::storage::PartitionStore;

/// Next sequence id a worker will request. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(i64);

impl Cursor {
    pub fn new(start_id: i64) -> Self {
        Self(start_id)
    }

    pub fn position(&self) -> i64 {
        self.0
    }

    /// Move to `last_id + 1`. Returns `false` (and stays put) if that would go backwards.
    pub fn advance_past(&mut self, last_id: i64) -> bool {
        let next = last_id.saturating_add(1);
        if next < self.0 {
            return false;
        }
        self.0 = next;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    RetryBackoff,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The source returned an empty page.
    Done,
    /// The symbol directory could not be created; no page was requested.
    SetupFailed,
}

/// What one worker did before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub symbol: String,
    pub outcome: WorkerOutcome,
    pub cursor: i64,
    pub pages: u64,
    pub trades: u64,
    pub fetch_errors: u64,
    pub write_errors: u64,
}

/// Pulls one symbol's history page by page until the source runs dry.
pub struct SymbolWorker<S: ?Sized> {
    symbol: String,
    source: Arc<S>,
    governor: Arc<RequestGovernor>,
    store: PartitionStore,
    retry_backoff: Duration,
    cursor: Cursor,
    pages: u64,
    trades: u64,
    fetch_errors: u64,
    write_errors: u64,
}

impl<S: TradeSource + ?Sized> SymbolWorker<S> {
    pub fn new(
        symbol: impl Into<String>,
        source: Arc<S>,
        governor: Arc<RequestGovernor>,
        store: PartitionStore,
        start_id: i64,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            source,
            governor,
            store,
            retry_backoff,
            cursor: Cursor::new(start_id),
            pages: 0,
            trades: 0,
            fetch_errors: 0,
            write_errors: 0,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Run to completion. Only an empty page ends a running worker; fetch
    /// errors are retried forever after a fixed backoff.
    pub async fn run(mut self) -> WorkerReport {
        info!("Starting data collection for {}...", self.symbol);

        if let Err(err) = self.store.ensure_symbol_dir(&self.symbol) {
            error!("Error creating directory for {}: {}", self.symbol, err);
            return self.report(WorkerOutcome::SetupFailed);
        }

        let mut state = WorkerState::Running;
        loop {
            state = match state {
                WorkerState::Running => self.step().await,
                WorkerState::RetryBackoff => {
                    sleep(self.retry_backoff).await;
                    WorkerState::Running
                }
                WorkerState::Done => break,
            };
        }

        info!("No more trades found for {}. Finished.", self.symbol);
        self.report(WorkerOutcome::Done)
    }

    /// One iteration: wait for budget, fetch the page at the cursor, persist it, advance.
    pub async fn step(&mut self) -> WorkerState {
        self.governor.acquire().await;

        let from_id = self.cursor.position();
        info!("sym({}) fromId({})", self.symbol, from_id);

        let trades = match self.source.fetch_page(&self.symbol, from_id).await {
            Ok(trades) => trades,
            Err(err) => {
                self.fetch_errors += 1;
                warn!("Error fetching trades for {}: {}", self.symbol, err);
                return WorkerState::RetryBackoff;
            }
        };

        let Some(last) = trades.last() else {
            return WorkerState::Done;
        };

        self.persist(&trades);
        self.pages += 1;
        self.trades += trades.len() as u64;

        if !self.cursor.advance_past(last.trade_id) {
            warn!(
                "Page for {} ended at id {} behind cursor {}; cursor kept",
                self.symbol,
                last.trade_id,
                self.cursor.position()
            );
        }

        WorkerState::Running
    }

    // A failed partition loses its rows for this page; the other partitions still get written.
    fn persist(&mut self, trades: &[AggTrade]) {
        for (day, rows) in group_by_day(trades) {
            if let Err(err) = self.store.append(&self.symbol, &day, &rows) {
                self.write_errors += 1;
                error!(
                    "Error saving to CSV for {} on {}: {}",
                    self.symbol, day, err
                );
            }
        }
    }

    fn report(&self, outcome: WorkerOutcome) -> WorkerReport {
        WorkerReport {
            symbol: self.symbol.clone(),
            outcome,
            cursor: self.cursor.position(),
            pages: self.pages,
            trades: self.trades,
            fetch_errors: self.fetch_errors,
            write_errors: self.write_errors,
        }
    }
}
