//! Built-in blockchain skills
//!
//! Each handler closes over the shared chain client and returns already
//! formatted text.

use eyre::Result;
use std::sync::Arc;

use super::{SkillHandler, SkillManager};
use crate::chain::ChainClient;
use crate::registry::{NewSkill, ParamBag, ParamType, ParamValue, SkillCategory, SkillParameter};

const DEFAULT_HISTORY_LIMIT: usize = 5;
const MAX_HISTORY_LIMIT: usize = 25;

struct WalletBalance {
    chain: Arc<dyn ChainClient>,
}

impl SkillHandler for WalletBalance {
    fn handle(&self, params: &ParamBag) -> Result<String> {
        let address = required_str(params, "address")?;
        let wallet = self.chain.wallet_info(address)?;
        Ok(format!(
            "Wallet {}\nBalance: {:.4} SOL ({} lamports)",
            wallet.address, wallet.balance_sol, wallet.lamports
        ))
    }
}

struct TokenPrices {
    chain: Arc<dyn ChainClient>,
    defaults: Vec<String>,
}

impl SkillHandler for TokenPrices {
    fn handle(&self, params: &ParamBag) -> Result<String> {
        let ids: Vec<String> = match params.get("tokens").and_then(ParamValue::as_str) {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => self.defaults.clone(),
        };
        if ids.is_empty() {
            eyre::bail!("No tokens requested");
        }

        let prices = self.chain.prices(&ids)?;
        if prices.is_empty() {
            return Ok(format!("No prices available for: {}", ids.join(", ")));
        }

        let lines: Vec<String> = prices
            .iter()
            .map(|p| match p.change_24h {
                Some(change) => format!("{}: ${:.4} ({:+.2}% 24h)", p.id, p.price_usd, change),
                None => format!("{}: ${:.4}", p.id, p.price_usd),
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

struct TransactionHistory {
    chain: Arc<dyn ChainClient>,
}

impl SkillHandler for TransactionHistory {
    fn handle(&self, params: &ParamBag) -> Result<String> {
        let address = required_str(params, "address")?;
        let limit = params
            .get("limit")
            .and_then(ParamValue::as_f64)
            .map(|n| n.max(1.0) as usize)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT);

        let transactions = self.chain.transactions(address, limit)?;
        if transactions.is_empty() {
            return Ok(format!("No transactions found for {}", address));
        }

        let mut out = format!("Last {} transaction(s) for {}:", transactions.len(), address);
        for tx in &transactions {
            let when = tx
                .block_time
                .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "unknown time".to_string());
            let status = if tx.success { "ok" } else { "failed" };
            out.push_str(&format!("\n  {} [{}] slot {} at {}", short(&tx.signature), status, tx.slot, when));
        }
        Ok(out)
    }
}

struct NetworkStatusSkill {
    chain: Arc<dyn ChainClient>,
}

impl SkillHandler for NetworkStatusSkill {
    fn handle(&self, _params: &ParamBag) -> Result<String> {
        let status = self.chain.network_status()?;
        Ok(format!(
            "Epoch {} ({:.1}% complete)\nSlot: {}\nBlock height: {}\nVersion: {}",
            status.epoch,
            status.epoch_progress(),
            status.slot,
            status.block_height,
            status.version.as_deref().unwrap_or("unknown")
        ))
    }
}

fn required_str<'a>(params: &'a ParamBag, name: &str) -> Result<&'a str> {
    params
        .get(name)
        .and_then(ParamValue::as_str)
        .ok_or_else(|| eyre::eyre!("Parameter '{}' must be a string", name))
}

fn short(signature: &str) -> String {
    if signature.len() <= 16 {
        return signature.to_string();
    }
    format!("{}...{}", &signature[..8], &signature[signature.len() - 8..])
}

fn skill(name: &str, description: &str, category: SkillCategory, handler: &str, parameters: Vec<SkillParameter>) -> NewSkill {
    NewSkill {
        name: name.to_string(),
        description: description.to_string(),
        category,
        token: None,
        handler: handler.to_string(),
        parameters,
        price: None,
        royalty_percent: None,
    }
}

/// Register the four built-in skills; returns their ids in registration order
pub fn register_builtin(
    manager: &mut SkillManager,
    chain: Arc<dyn ChainClient>,
    default_tokens: Vec<String>,
) -> Vec<String> {
    vec![
        manager.register_skill(
            skill(
                "Wallet Balance",
                "Look up the SOL balance of a wallet",
                SkillCategory::Defi,
                "wallet-balance",
                vec![SkillParameter::required("address", ParamType::Address, "Wallet address")],
            ),
            Box::new(WalletBalance { chain: chain.clone() }),
        ),
        manager.register_skill(
            skill(
                "Token Prices",
                "List current USD prices with 24h change",
                SkillCategory::Trading,
                "token-prices",
                vec![SkillParameter::optional(
                    "tokens",
                    ParamType::String,
                    "Comma-separated price ids",
                    None,
                )],
            ),
            Box::new(TokenPrices {
                chain: chain.clone(),
                defaults: default_tokens,
            }),
        ),
        manager.register_skill(
            skill(
                "Transaction History",
                "Recent transactions for a wallet",
                SkillCategory::Analytics,
                "transaction-history",
                vec![
                    SkillParameter::required("address", ParamType::Address, "Wallet address"),
                    SkillParameter::optional(
                        "limit",
                        ParamType::Number,
                        "Number of transactions",
                        Some(ParamValue::Number(DEFAULT_HISTORY_LIMIT as f64)),
                    ),
                ],
            ),
            Box::new(TransactionHistory { chain: chain.clone() }),
        ),
        manager.register_skill(
            skill(
                "Network Status",
                "Current epoch, slot and node version",
                SkillCategory::Utility,
                "network-status",
                Vec::new(),
            ),
            Box::new(NetworkStatusSkill { chain }),
        ),
    ]
}
