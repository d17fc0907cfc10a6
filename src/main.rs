use std::sync::Arc;

use aggtrade_harvester::config::resolve_config;
use aggtrade_harvester::fetch::HttpTradeSource;
use aggtrade_harvester::harvest::Harvester;
use aggtrade_harvester::Result;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = resolve_config()?;
    let source = Arc::new(HttpTradeSource::from_config(&config)?);

    let reports = Harvester::new(&config, source).run().await?;

    for report in &reports {
        info!(
            "{}: {:?} at fromId {} ({} pages, {} trades, {} fetch errors, {} write errors)",
            report.symbol,
            report.outcome,
            report.cursor,
            report.pages,
            report.trades,
            report.fetch_errors,
            report.write_errors
        );
    }

    Ok(())
}
