//! Blockchain RPC collaborator
//!
//! The built-in skills only see the `ChainClient` trait and the result shapes
//! below. `RpcChainClient` talks Solana JSON-RPC for wallet, transaction and
//! network data and a CoinGecko-style endpoint for prices.

use chrono::{DateTime, TimeZone, Utc};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ChainConfig;
use crate::http;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    pub lamports: u64,
    pub balance_sol: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub id: String,
    pub price_usd: f64,
    pub change_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<DateTime<Utc>>,
    pub success: bool,
    pub confirmation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub epoch: u64,
    pub slot: u64,
    pub block_height: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    pub version: Option<String>,
}

impl NetworkStatus {
    /// Progress through the current epoch as a percentage
    pub fn epoch_progress(&self) -> f64 {
        if self.slots_in_epoch == 0 {
            return 0.0;
        }
        self.slot_index as f64 / self.slots_in_epoch as f64 * 100.0
    }
}

/// Blockchain operations consumed by the built-in skills
pub trait ChainClient: Send + Sync {
    fn wallet_info(&self, address: &str) -> Result<WalletInfo>;

    fn prices(&self, ids: &[String]) -> Result<Vec<TokenPrice>>;

    fn transactions(&self, address: &str, limit: usize) -> Result<Vec<TransactionSummary>>;

    fn network_status(&self) -> Result<NetworkStatus>;
}

/// JSON-RPC backed chain client
pub struct RpcChainClient {
    rpc_url: String,
    price_api: String,
    agent: ureq::Agent,
}

impl RpcChainClient {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            rpc_url: config.rpc_url.clone(),
            price_api: config.price_api.trim_end_matches('/').to_string(),
            agent: http::agent(Duration::from_secs(config.timeout_secs)),
        }
    }

    fn rpc(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        log::debug!("RPC {} -> {}", method, self.rpc_url);
        let mut response = http::post_json(&self.agent, &self.rpc_url, &request)?;

        if let Some(error) = response.get("error") {
            let message = error["message"].as_str().unwrap_or("unknown error");
            eyre::bail!("RPC {} failed: {}", method, message);
        }

        Ok(response["result"].take())
    }
}

impl ChainClient for RpcChainClient {
    fn wallet_info(&self, address: &str) -> Result<WalletInfo> {
        let result = self.rpc("getBalance", serde_json::json!([address]))?;
        let lamports = result["value"]
            .as_u64()
            .ok_or_else(|| eyre::eyre!("No balance in getBalance response"))?;

        Ok(WalletInfo {
            address: address.to_string(),
            lamports,
            balance_sol: lamports as f64 / LAMPORTS_PER_SOL,
        })
    }

    fn prices(&self, ids: &[String]) -> Result<Vec<TokenPrice>> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.price_api,
            ids.join(",")
        );
        let response = http::get_json(&self.agent, &url, &[]).context("Failed to fetch prices")?;

        let prices = ids
            .iter()
            .filter_map(|id| {
                let entry = response.get(id)?;
                Some(TokenPrice {
                    id: id.clone(),
                    price_usd: entry["usd"].as_f64()?,
                    change_24h: entry["usd_24h_change"].as_f64(),
                })
            })
            .collect();

        Ok(prices)
    }

    fn transactions(&self, address: &str, limit: usize) -> Result<Vec<TransactionSummary>> {
        let result = self.rpc("getSignaturesForAddress", serde_json::json!([address, { "limit": limit }]))?;
        let entries = result
            .as_array()
            .ok_or_else(|| eyre::eyre!("Unexpected getSignaturesForAddress response"))?;

        let transactions = entries
            .iter()
            .filter_map(|entry| {
                Some(TransactionSummary {
                    signature: entry["signature"].as_str()?.to_string(),
                    slot: entry["slot"].as_u64().unwrap_or(0),
                    block_time: entry["blockTime"]
                        .as_i64()
                        .and_then(|t| Utc.timestamp_opt(t, 0).single()),
                    success: entry["err"].is_null(),
                    confirmation: entry["confirmationStatus"].as_str().map(|s| s.to_string()),
                })
            })
            .collect();

        Ok(transactions)
    }

    fn network_status(&self) -> Result<NetworkStatus> {
        let epoch = self.rpc("getEpochInfo", serde_json::json!([]))?;
        let version = match self.rpc("getVersion", serde_json::json!([])) {
            Ok(v) => v["solana-core"].as_str().map(|s| s.to_string()),
            Err(e) => {
                log::warn!("getVersion failed: {}", e);
                None
            }
        };

        Ok(NetworkStatus {
            epoch: epoch["epoch"].as_u64().unwrap_or(0),
            slot: epoch["absoluteSlot"].as_u64().unwrap_or(0),
            block_height: epoch["blockHeight"].as_u64().unwrap_or(0),
            slot_index: epoch["slotIndex"].as_u64().unwrap_or(0),
            slots_in_epoch: epoch["slotsInEpoch"].as_u64().unwrap_or(0),
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_progress() {
        let status = NetworkStatus {
            epoch: 600,
            slot: 1,
            block_height: 1,
            slot_index: 108_000,
            slots_in_epoch: 432_000,
            version: None,
        };
        assert!((status.epoch_progress() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_epoch_progress_empty_epoch() {
        let status = NetworkStatus {
            epoch: 0,
            slot: 0,
            block_height: 0,
            slot_index: 0,
            slots_in_epoch: 0,
            version: None,
        };
        assert_eq!(status.epoch_progress(), 0.0);
    }

    #[test]
    fn test_price_api_trailing_slash_trimmed() {
        let config = ChainConfig {
            price_api: "https://prices.example.com/api/v3/".to_string(),
            ..Default::default()
        };
        let client = RpcChainClient::new(&config);
        assert_eq!(client.price_api, "https://prices.example.com/api/v3");
    }
}
