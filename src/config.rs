use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::registry::AgentLinks;

/// Main agentreg configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub agent: AgentConfig,
    pub crawler: CrawlerConfig,
    pub chain: ChainConfig,
}

/// Log verbosity when RUST_LOG is not set
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// The local agent this process registers for itself
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub version: String,
    pub public_key: Option<String>,
    pub links: AgentLinks,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Seconds between crawl cycles
    pub interval_secs: u64,
    /// Pause between consecutive source-control fetches
    pub source_control_delay_ms: u64,
    /// Per-request timeout for both signal sources
    pub timeout_secs: u64,
    pub github_api: String,
    /// Falls back to the GITHUB_TOKEN environment variable
    pub github_token: Option<String>,
    pub market_api: String,
    /// Agent name -> token address used for market-data lookups
    pub tokens: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub price_api: String,
    /// Price ids listed when the price skill is invoked without `tokens`
    pub default_tokens: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agentreg".to_string(),
            description: "Registry agent tracking skills, tasks and reputation for a simulated agent marketplace"
                .to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            public_key: None,
            links: AgentLinks::default(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30 * 60,
            source_control_delay_ms: 1000,
            timeout_secs: 10,
            github_api: "https://api.github.com".to_string(),
            github_token: None,
            market_api: "https://api.dexscreener.com".to_string(),
            tokens: default_tokens(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            price_api: "https://api.coingecko.com/api/v3".to_string(),
            default_tokens: vec!["solana".to_string(), "bitcoin".to_string(), "ethereum".to_string()],
            timeout_secs: 10,
        }
    }
}

/// Token addresses for the seeded reference agents
fn default_tokens() -> IndexMap<String, String> {
    [
        ("ElizaOS", "HeLp6NuQkmYB4pYWo2zYs22mESHXPQYzXbB8n4V98jwC"),
        ("Virtuals Protocol", "0x0b3e328455c4059EEb9e3f84b5543F74E24e7E1b"),
        ("AIXBT", "0x4F9Fd6Be4a90f2620860d680c0d4d5Fb53d1A825"),
        ("Griffain", "KENJSUYLASHUMfHyy5o4Hp2FdNqZg1AsUPhfH2kYvEP"),
        ("Zerebro", "8x5VqbHA8D7NkD52uNuS5nnt3PwA8pLD34ymskeSo2Wn"),
    ]
    .into_iter()
    .map(|(name, token)| (name.to_string(), token.to_string()))
    .collect()
}

impl CrawlerConfig {
    /// Configured token, else the GITHUB_TOKEN environment variable
    pub fn resolved_github_token(&self) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("AGENTREG_CONFIG") {
            let path = Self::expand_path(Path::new(&env_path));
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from AGENTREG_CONFIG: {}", e);
                    }
                }
            }
        }

        let candidates = [
            Self::agentreg_dir().join("agentreg.yaml"),
            PathBuf::from("agentreg.yaml"),
        ];
        for path in candidates {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// AGENTREG_DIR, else ~/.config/agentreg
    pub fn agentreg_dir() -> PathBuf {
        std::env::var("AGENTREG_DIR")
            .map(|dir| Self::expand_path(Path::new(&dir)))
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("agentreg")
            })
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
