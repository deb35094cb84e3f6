//! Third-party price sources

use std::time::Duration;
use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use crate::utils::{DappError, Result};

pub const DEXSCREENER_TOKENS_URL: &str = "https://api.dexscreener.com/latest/dex/tokens";
pub const COINGECKO_SEI_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=sei-network&vs_currencies=usd";

/// Hard abort for upstream requests
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    #[serde(rename = "priceUsd")]
    pub price_usd: f64,
    #[serde(rename = "vol24hUsd")]
    pub vol_24h_usd: f64,
    #[serde(rename = "liquidityUsd")]
    pub liquidity_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeiPrice {
    #[serde(rename = "seiUsd")]
    pub sei_usd: f64,
}

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn token_stats(&self, token: Address) -> Result<TokenStats>;

    async fn sei_price(&self) -> Result<SeiPrice>;
}

#[derive(Debug, Deserialize)]
struct DexScreenerResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    price_usd: Option<String>,
    volume: Option<DexVolume>,
    liquidity: Option<DexLiquidity>,
}

#[derive(Debug, Deserialize)]
struct DexVolume {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DexLiquidity {
    usd: Option<f64>,
}

/// Stats from the most liquid pair in a DexScreener token response
pub fn parse_dexscreener(body: &str) -> Result<TokenStats> {
    let response: DexScreenerResponse = serde_json::from_str(body)?;
    let pairs = response.pairs.unwrap_or_default();

    let best = pairs
        .iter()
        .max_by(|a, b| {
            let la = a.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
            let lb = b.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0);
            la.total_cmp(&lb)
        })
        .ok_or_else(|| DappError::UpstreamError("no pairs listed for token".to_string()))?;

    let price_usd = best
        .price_usd
        .as_deref()
        .and_then(|p| p.parse::<f64>().ok())
        .ok_or_else(|| DappError::UpstreamError("pair has no USD price".to_string()))?;

    Ok(TokenStats {
        price_usd,
        vol_24h_usd: best.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0),
        liquidity_usd: best.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0),
    })
}

/// `{"sei-network": {"usd": 0.31}}`
pub fn parse_coingecko_sei(body: &str) -> Result<SeiPrice> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    value
        .get("sei-network")
        .and_then(|v| v.get("usd"))
        .and_then(|v| v.as_f64())
        .map(|sei_usd| SeiPrice { sei_usd })
        .ok_or_else(|| DappError::UpstreamError("missing sei-network.usd".to_string()))
}

/// DexScreener + CoinGecko over HTTPS
pub struct HttpPriceFeed {
    http: reqwest::Client,
    dexscreener_url: String,
    coingecko_url: String,
}

impl HttpPriceFeed {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self {
            http,
            dexscreener_url: DEXSCREENER_TOKENS_URL.to_string(),
            coingecko_url: COINGECKO_SEI_URL.to_string(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn token_stats(&self, token: Address) -> Result<TokenStats> {
        let url = format!("{}/{:?}", self.dexscreener_url, token);
        let body = self.get_text(&url).await?;
        parse_dexscreener(&body)
    }

    async fn sei_price(&self) -> Result<SeiPrice> {
        let body = self.get_text(&self.coingecko_url).await?;
        parse_coingecko_sei(&body)
    }
}
