use std::collections::BTreeMap;

use crate::fetch::AggTrade;
use crate::utils::utc_day_label;

use super::TradeRow;

/// Bucket for trades whose timestamp has no calendar day.
pub const UNDATED_PARTITION: &str = "undated";

/// Rows of one page keyed by `YYYY-MM-DD`, each bucket in page order.
pub type DayPartitions<'a> = BTreeMap<String, Vec<TradeRow<'a>>>;

/// Group a page of trades by the UTC day of their timestamp.
///
/// Every trade lands in exactly one bucket. Nothing downstream depends on
/// the order buckets are visited in.
pub fn group_by_day(trades: &[AggTrade]) -> DayPartitions<'_> {
    let mut grouped = DayPartitions::new();
    for trade in trades {
        let day = utc_day_label(trade.timestamp).unwrap_or_else(|| UNDATED_PARTITION.to_string());
        grouped.entry(day).or_default().push(TradeRow::from(trade));
    }
    grouped
}
