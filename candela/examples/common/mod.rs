use std::sync::Arc;

use candela::{CandelaError, CandleFetcher, Exchange, LoaderConfig};

/// Real HTTP fetcher, or the offline mock when `CANDELA_EXAMPLES_USE_MOCK` is set.
pub fn get_fetcher(exchange: Exchange) -> Result<Arc<dyn CandleFetcher>, CandelaError> {
    if std::env::var("CANDELA_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using Mock Fetcher for CI) ---");
        let (fetcher, _controller) = candela_mock::MockFetcher::new_with_controller(exchange);
        Ok(fetcher)
    } else {
        let client = candela::build_client(&LoaderConfig::default())?;
        Ok(candela::fetcher_for(exchange, client))
    }
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,candela=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
