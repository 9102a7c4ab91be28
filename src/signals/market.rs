//! DexScreener token market data

use eyre::{Context, Result};
use indexmap::IndexMap;
use std::time::Duration;

use super::MarketDataFetcher;
use crate::config::CrawlerConfig;
use crate::http;
use crate::registry::MarketMetrics;

pub struct DexScreenerFetcher {
    api_base: String,
    tokens: IndexMap<String, String>,
    agent: ureq::Agent,
}

impl DexScreenerFetcher {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            api_base: config.market_api.trim_end_matches('/').to_string(),
            tokens: config.tokens.clone(),
            agent: http::agent(Duration::from_secs(config.timeout_secs)),
        }
    }

    /// Token address mapped to an agent name, ignoring case
    pub fn token_for(&self, agent_name: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(agent_name))
            .map(|(_, token)| token.as_str())
    }
}

/// Pick the most liquid pair from a `/latest/dex/tokens` response
pub fn best_pair(response: &serde_json::Value) -> Option<MarketMetrics> {
    let pairs = response["pairs"].as_array()?;

    let liquidity = |pair: &serde_json::Value| pair["liquidity"]["usd"].as_f64().unwrap_or(0.0);
    let pair = pairs
        .iter()
        .max_by(|a, b| liquidity(a).total_cmp(&liquidity(b)))?;

    // DexScreener reports priceUsd as a string
    let price_usd = match &pair["priceUsd"] {
        serde_json::Value::String(s) => s.parse::<f64>().ok()?,
        other => other.as_f64()?,
    };

    Some(MarketMetrics {
        symbol: pair["baseToken"]["symbol"].as_str().unwrap_or("?").to_string(),
        price_usd,
        change_24h: pair["priceChange"]["h24"].as_f64().unwrap_or(0.0),
        volume_24h: pair["volume"]["h24"].as_f64().unwrap_or(0.0),
        liquidity_usd: pair["liquidity"]["usd"].as_f64(),
        pair_address: pair["pairAddress"].as_str().map(|s| s.to_string()),
        dex: pair["dexId"].as_str().map(|s| s.to_string()),
    })
}

impl MarketDataFetcher for DexScreenerFetcher {
    fn fetch(&self, agent_name: &str) -> Result<Option<MarketMetrics>> {
        let Some(token) = self.token_for(agent_name) else {
            return Ok(None);
        };

        let url = format!("{}/latest/dex/tokens/{}", self.api_base, token);
        let response = http::get_json(&self.agent, &url, &[])
            .with_context(|| format!("Failed to fetch market data for {}", agent_name))?;

        Ok(best_pair(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_pair_picks_most_liquid() {
        let response = serde_json::json!({
            "pairs": [
                {
                    "dexId": "raydium",
                    "pairAddress": "small",
                    "baseToken": {"symbol": "AI16Z"},
                    "priceUsd": "0.50",
                    "priceChange": {"h24": 4.0},
                    "volume": {"h24": 1000.0},
                    "liquidity": {"usd": 10.0}
                },
                {
                    "dexId": "orca",
                    "pairAddress": "deep",
                    "baseToken": {"symbol": "AI16Z"},
                    "priceUsd": "0.52",
                    "priceChange": {"h24": -3.5},
                    "volume": {"h24": 2500000.0},
                    "liquidity": {"usd": 900000.0}
                }
            ]
        });

        let metrics = best_pair(&response).unwrap();
        assert_eq!(metrics.pair_address.as_deref(), Some("deep"));
        assert_eq!(metrics.dex.as_deref(), Some("orca"));
        assert_eq!(metrics.symbol, "AI16Z");
        assert!((metrics.price_usd - 0.52).abs() < 1e-9);
        assert_eq!(metrics.change_24h, -3.5);
    }

    #[test]
    fn test_best_pair_without_pairs() {
        assert!(best_pair(&serde_json::json!({"pairs": null})).is_none());
        assert!(best_pair(&serde_json::json!({"pairs": []})).is_none());
    }

    #[test]
    fn test_unmapped_agent_is_skipped_without_request() {
        let config = CrawlerConfig {
            market_api: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let fetcher = DexScreenerFetcher::new(&config);
        assert!(fetcher.fetch("Nobody Maps This").unwrap().is_none());
    }

    #[test]
    fn test_token_lookup_ignores_case() {
        let fetcher = DexScreenerFetcher::new(&CrawlerConfig::default());
        assert!(fetcher.token_for("elizaos").is_some());
        assert!(fetcher.token_for("ELIZAOS").is_some());
        assert!(fetcher.token_for("Rig").is_none());
    }
}
