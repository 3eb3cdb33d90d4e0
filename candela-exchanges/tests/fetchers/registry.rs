use candela_core::{CandleFetcher, Exchange, LoaderConfig};
use candela_exchanges::{default_fetchers, fetcher_for};

use crate::helpers::client;

#[test]
fn default_registry_holds_every_exchange() {
    let registry = default_fetchers(&LoaderConfig::default()).unwrap();
    assert_eq!(registry.len(), 10);
    assert_eq!(registry.exchanges(), Exchange::ALL.to_vec());
    for exchange in Exchange::ALL {
        assert_eq!(registry.get(exchange).unwrap().exchange(), exchange);
    }
}

#[tokio::test]
async fn fetcher_for_reports_its_exchange() {
    let fetcher = fetcher_for(Exchange::Okx, client());
    assert_eq!(fetcher.exchange(), Exchange::Okx);
}
