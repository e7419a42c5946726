use crate::domain::price::{PriceAsset, PriceMap, PriceWithChange, percent_change};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DAY_SECS: u64 = 86_400;

#[derive(Debug, Deserialize)]
struct CoinsResponse {
    #[serde(default)]
    coins: HashMap<String, CoinQuote>,
}

#[derive(Debug, Deserialize)]
struct CoinQuote {
    price: Option<serde_json::Value>,
}

/// A price snapshot and the moment it was fetched.
#[derive(Debug, Clone, Copy)]
pub struct CachedPrices {
    pub value: PriceMap,
    pub fetched_at: Instant,
}

impl CachedPrices {
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Time-boxed holder for the last fetched prices. Entries are never
/// invalidated other than by expiry.
#[derive(Debug)]
pub struct PriceCache {
    ttl: Duration,
    entry: Mutex<Option<CachedPrices>>,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub async fn get(&self, now: Instant) -> Option<PriceMap> {
        let entry = *self.entry.lock().await;
        entry
            .filter(|cached| cached.is_fresh(now, self.ttl))
            .map(|cached| cached.value)
    }

    pub async fn put(&self, value: PriceMap, now: Instant) {
        *self.entry.lock().await = Some(CachedPrices {
            value,
            fetched_at: now,
        });
    }
}

/// Client for the DefiLlama coin price index.
pub struct PriceFeed {
    http: reqwest::Client,
    base_url: String,
    cache: PriceCache,
}

impl PriceFeed {
    pub fn new(http: reqwest::Client, base_url: &str, cache: PriceCache) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Current USD prices, served from the cache while it is fresh.
    pub async fn prices(&self) -> Result<PriceMap> {
        if let Some(cached) = self.cache.get(Instant::now()).await {
            debug!("serving prices from cache");
            return Ok(cached);
        }

        let prices = self.fetch(&self.current_url()).await?;
        self.cache.put(prices, Instant::now()).await;
        Ok(prices)
    }

    /// Current USD prices and the change since 24 hours ago. Never cached.
    pub async fn prices_with_change(&self) -> Result<PriceWithChange> {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let historical_url = format!(
            "{}/prices/historical/{}/{}",
            self.base_url,
            now_secs.saturating_sub(DAY_SECS),
            coin_ids()
        );

        let current_url = self.current_url();
        let (current, previous) =
            tokio::try_join!(self.fetch(&current_url), self.fetch(&historical_url))?;

        Ok(PriceWithChange {
            usd: current,
            change_24h_pct: PriceMap {
                mantle: percent_change(current.mantle, previous.mantle),
                ethereum: percent_change(current.ethereum, previous.ethereum),
            },
        })
    }

    fn current_url(&self) -> String {
        format!("{}/prices/current/{}", self.base_url, coin_ids())
    }

    async fn fetch(&self, url: &str) -> Result<PriceMap> {
        debug!(url, "fetching prices");
        let response = self.http.get(url).timeout(REQUEST_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::PriceFeed(format!(
                "Price API error: {}",
                status.as_u16()
            )));
        }

        let body: CoinsResponse = response
            .json()
            .await
            .map_err(|_| PaymentError::PriceFeed("Invalid price data from API".to_string()))?;
        Ok(PriceMap {
            mantle: quote(&body, PriceAsset::Mantle)?,
            ethereum: quote(&body, PriceAsset::Ethereum)?,
        })
    }
}

fn coin_ids() -> String {
    PriceAsset::ALL
        .iter()
        .map(|asset| asset.coin_id())
        .collect::<Vec<_>>()
        .join(",")
}

fn quote(body: &CoinsResponse, asset: PriceAsset) -> Result<Decimal> {
    body.coins
        .get(asset.coin_id())
        .and_then(|coin| coin.price.as_ref())
        .and_then(|price| match price {
            serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok().or_else(|| {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }),
            _ => None,
        })
        .ok_or_else(|| PaymentError::PriceFeed("Invalid price data from API".to_string()))
}
