use serde::Serialize;

use crate::fetch::AggTrade;

pub mod partition;

pub use partition::{group_by_day, DayPartitions, UNDATED_PARTITION};

/// Column names of every partition file, in row order.
pub const PARTITION_HEADER: [&str; 5] = ["tradeId", "price", "quantity", "timestamp", "isBuyerMaker"];

/// The persisted projection of an [`AggTrade`], borrowed from the page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRow<'a> {
    pub trade_id: i64,
    pub price: &'a str,
    pub quantity: &'a str,
    pub timestamp: i64,
    pub is_buyer_maker: bool,
}

impl<'a> From<&'a AggTrade> for TradeRow<'a> {
    fn from(trade: &'a AggTrade) -> Self {
        Self {
            trade_id: trade.trade_id,
            price: &trade.price,
            quantity: &trade.quantity,
            timestamp: trade.timestamp,
            is_buyer_maker: trade.is_buyer_maker,
        }
    }
}
