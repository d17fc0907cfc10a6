use async_trait::async_trait;

use crate::error::FetchError;

pub mod decode;
pub mod trades;

pub use decode::decode_page;
pub use trades::{AggTrade, HttpTradeSource};

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// A paginated trade-history source addressed by per-symbol sequence ids.
///
/// One call fetches one page starting at `from_id`. An empty page means the
/// source has nothing at or after `from_id` yet. Implementations never retry.
#[async_trait]
pub trait TradeSource: Send + Sync {
    async fn fetch_page(&self, symbol: &str, from_id: i64) -> FetchResult<Vec<AggTrade>>;
}
