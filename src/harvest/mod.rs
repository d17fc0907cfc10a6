pub mod orchestrator;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use orchestrator::Harvester;
pub use worker::{Cursor, SymbolWorker, WorkerOutcome, WorkerReport, WorkerState};
