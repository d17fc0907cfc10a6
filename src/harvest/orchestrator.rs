use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::info;
use tokio::sync::Semaphore;

use crate::config::{ensure_concurrency_limit, HarvestConfig};
use crate::error::Result;
use crate::fetch::TradeSource;
use crate::governor::RequestGovernor;
use crate::storage::PartitionStore;

use super::{SymbolWorker, WorkerReport};

/// Runs one [`SymbolWorker`] per configured symbol against a shared request budget.
pub struct Harvester<S: ?Sized> {
    symbols: Vec<String>,
    source: Arc<S>,
    governor: Arc<RequestGovernor>,
    store: PartitionStore,
    start_id: i64,
    retry_backoff: Duration,
    concurrency_limit: usize,
}

impl<S: TradeSource + ?Sized + 'static> Harvester<S> {
    pub fn new(config: &HarvestConfig, source: Arc<S>) -> Self {
        Self {
            symbols: config.symbols.clone(),
            source,
            governor: Arc::new(RequestGovernor::from_config(config)),
            store: PartitionStore::new(config.output_root.clone()),
            start_id: config.start_id,
            retry_backoff: config.retry_backoff,
            concurrency_limit: ensure_concurrency_limit(config.max_concurrent_symbols),
        }
    }

    /// Share an existing budget instead of the one built from the config.
    pub fn with_governor(mut self, governor: Arc<RequestGovernor>) -> Self {
        self.governor = governor;
        self
    }

    /// Start every worker and wait for all of them to stop.
    ///
    /// A worker stuck retrying a failing source never stops, so neither does this.
    pub async fn run(&self) -> Result<Vec<WorkerReport>> {
        info!(
            "Starting harvest of {} symbol(s) into {} ({} at a time)",
            self.symbols.len(),
            self.store.root().display(),
            self.concurrency_limit
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));

        let handles: Vec<_> = self
            .symbols
            .iter()
            .map(|symbol| {
                let worker = SymbolWorker::new(
                    symbol.clone(),
                    Arc::clone(&self.source),
                    Arc::clone(&self.governor),
                    self.store.clone(),
                    self.start_id,
                    self.retry_backoff,
                );
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await?;
                    Ok::<_, crate::error::AppError>(worker.run().await)
                })
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            reports.push(joined??);
        }

        info!("All data collection tasks finished.");
        Ok(reports)
    }
}
