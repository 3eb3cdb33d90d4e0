use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use candela_core::{
    CancellationToken, CandelaError, Exchange, LoaderConfig, MarketType, ensure_not_cancelled,
};

/// Build the HTTP client shared by every fetcher.
///
/// # Errors
/// Returns `Transport` if the TLS backend cannot be initialized.
pub fn build_client(config: &LoaderConfig) -> Result<Client, CandelaError> {
    Client::builder()
        .timeout(config.http_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| CandelaError::transport("http", e.to_string()))
}

/// Client plus the per-provider knobs every fetcher carries.
#[derive(Debug, Clone)]
pub struct Http {
    client: Client,
    exchange: Exchange,
    spot_base: String,
    futures_base: String,
    page_limit: usize,
}

impl Http {
    pub(crate) fn new(
        client: Client,
        exchange: Exchange,
        spot_base: &str,
        futures_base: &str,
        page_limit: usize,
    ) -> Self {
        Self {
            client,
            exchange,
            spot_base: spot_base.trim_end_matches('/').to_string(),
            futures_base: futures_base.trim_end_matches('/').to_string(),
            page_limit,
        }
    }

    pub(crate) fn set_base_urls(&mut self, spot: &str, futures: &str) {
        self.spot_base = spot.trim_end_matches('/').to_string();
        self.futures_base = futures.trim_end_matches('/').to_string();
    }

    pub(crate) fn set_page_limit(&mut self, limit: usize) {
        self.page_limit = limit.max(1);
    }

    /// Provider name used in errors.
    pub(crate) const fn provider(&self) -> &'static str {
        self.exchange.as_str()
    }

    pub(crate) const fn page_limit(&self) -> usize {
        self.page_limit
    }

    pub(crate) fn url(&self, market: MarketType, path: &str) -> String {
        let base = match market {
            MarketType::Spot => &self.spot_base,
            MarketType::Futures => &self.futures_base,
        };
        format!("{base}{path}")
    }

    /// GET `url` with `query` and decode the JSON body.
    ///
    /// The token is checked before the request is issued and raced against it while in flight, so
    /// a cancelled fetch resolves to `Cancelled` rather than a transport error. Non-2xx statuses
    /// become `Http` errors carrying the provider's message when the body has one.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<T, CandelaError> {
        ensure_not_cancelled(cancel)?;
        let provider = self.provider();
        let request = async {
            let resp = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| CandelaError::transport(provider, e.to_string()))?;
            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| CandelaError::transport(provider, e.to_string()))?;
            if !status.is_success() {
                return Err(CandelaError::http(
                    provider,
                    status.as_u16(),
                    error_message(&body),
                ));
            }
            serde_json::from_str::<T>(&body)
                .map_err(|e| CandelaError::Data(format!("{provider}: undecodable response: {e}")))
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CandelaError::Cancelled),
            out = request => out,
        }
    }
}

const MESSAGE_KEYS: &[&str] = &["msg", "message", "retMsg", "err-msg", "error", "label"];

/// Best-effort human message from an error body.
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        for key in MESSAGE_KEYS {
            match obj.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Array(items)) if !items.is_empty() => {
                    return items
                        .iter()
                        .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                        .collect::<Vec<_>>()
                        .join("; ");
                }
                _ => {}
            }
        }
    }
    body.chars().take(200).collect()
}

/// Generates a fetcher struct with a constructor and the test/proxy knobs.
macro_rules! http_fetcher {
    (
        $(#[$meta:meta])*
        $name:ident {
            exchange: $exchange:expr,
            spot: $spot:expr,
            futures: $futures:expr,
            page_limit: $limit:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            http: $crate::http::Http,
        }

        impl $name {
            /// Production spot REST root.
            pub const SPOT_BASE: &'static str = $spot;
            /// Production derivatives REST root.
            pub const FUTURES_BASE: &'static str = $futures;
            /// Records requested per page.
            pub const PAGE_LIMIT: usize = $limit;

            /// Fetcher on a shared client with production endpoints.
            #[must_use]
            pub fn new(client: reqwest::Client) -> Self {
                Self {
                    http: $crate::http::Http::new(
                        client,
                        $exchange,
                        Self::SPOT_BASE,
                        Self::FUTURES_BASE,
                        Self::PAGE_LIMIT,
                    ),
                }
            }

            /// Point the fetcher at other REST roots (mock servers, proxies).
            #[must_use]
            pub fn with_base_urls(mut self, spot: &str, futures: &str) -> Self {
                self.http.set_base_urls(spot, futures);
                self
            }

            /// Override the page size.
            #[must_use]
            pub fn with_page_limit(mut self, limit: usize) -> Self {
                self.http.set_page_limit(limit);
                self
            }
        }
    };
}

pub(crate) use http_fetcher;
