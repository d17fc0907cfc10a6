use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::{AggTrade, FetchResult, TradeSource};

/// In-memory source that replays scripted responses per symbol and records every request.
/// Once a symbol's script runs out it serves empty pages.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<String, VecDeque<FetchResult<Vec<AggTrade>>>>>,
    calls: Mutex<Vec<(String, i64)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, symbol: &str, trades: Vec<AggTrade>) -> Self {
        self.push(symbol, Ok(trades))
    }

    pub fn failure(self, symbol: &str) -> Self {
        self.push(
            symbol,
            Err(FetchError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
        )
    }

    fn push(self, symbol: &str, response: FetchResult<Vec<AggTrade>>) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .entry(symbol.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// `fromId` of every request made for `symbol`, in order.
    pub fn from_ids(&self, symbol: &str) -> Vec<i64> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|(called, _)| called == symbol)
            .map(|(_, from_id)| *from_id)
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl TradeSource for ScriptedSource {
    async fn fetch_page(&self, symbol: &str, from_id: i64) -> FetchResult<Vec<AggTrade>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((symbol.to_string(), from_id));

        self.scripts
            .lock()
            .expect("scripts lock")
            .get_mut(symbol)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn trade(id: i64, timestamp: i64) -> AggTrade {
    AggTrade {
        trade_id: id,
        price: "2051.37".to_string(),
        quantity: "0.4810".to_string(),
        first_id: id * 3,
        last_id: id * 3 + 2,
        timestamp,
        is_buyer_maker: id % 2 == 0,
        is_best_match: true,
    }
}
