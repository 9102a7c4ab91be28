//! Registry data model
//!
//! Field names serialize in camelCase; snapshots and manifest exports are
//! consumed by outside tooling that expects exactly these names.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Agent category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Framework,
    Trading,
    Defi,
    Nft,
    Analytics,
    Utility,
    #[default]
    Other,
}

impl AgentCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "framework" => Some(Self::Framework),
            "trading" => Some(Self::Trading),
            "defi" => Some(Self::Defi),
            "nft" => Some(Self::Nft),
            "analytics" => Some(Self::Analytics),
            "utility" => Some(Self::Utility),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Framework => "framework",
            Self::Trading => "trading",
            Self::Defi => "defi",
            Self::Nft => "nft",
            Self::Analytics => "analytics",
            Self::Utility => "utility",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Skill category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Defi,
    Nft,
    Analytics,
    Trading,
    Utility,
}

impl SkillCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "defi" => Some(Self::Defi),
            "nft" => Some(Self::Nft),
            "analytics" => Some(Self::Analytics),
            "trading" => Some(Self::Trading),
            "utility" => Some(Self::Utility),
            _ => None,
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Defi => "defi",
            Self::Nft => "nft",
            Self::Analytics => "analytics",
            Self::Trading => "trading",
            Self::Utility => "utility",
        };
        write!(f, "{}", s)
    }
}

/// External links for an agent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

/// A single advertised capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub version: String,
    pub enabled: bool,
}

impl Capability {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: name.to_string(),
            version: "1.0.0".to_string(),
            enabled: true,
        }
    }
}

/// Source-control activity for an agent's repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceControlMetrics {
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub commits_30d: u32,
    pub last_push: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release: Option<String>,
}

/// Market activity for an agent's token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub symbol: String,
    pub price_usd: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dex: Option<String>,
}

/// External signal source that contributed to a live-data snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalSource {
    SourceControl,
    MarketData,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceControl => write!(f, "source-control"),
            Self::MarketData => write!(f, "market-data"),
        }
    }
}

/// Most recent external-signal snapshot attached to a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLiveData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<SourceControlMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketMetrics>,
    pub crawled_at: DateTime<Utc>,
    pub sources: Vec<SignalSource>,
    pub live_score: i32,
}

/// Identity and reputation record for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default)]
    pub links: AgentLinks,
    pub category: AgentCategory,
    #[serde(default)]
    pub tags: IndexSet<String>,
    pub is_external: bool,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    pub reputation: u8,
    pub tasks_completed: u64,
    pub success_rate: f64,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_data: Option<AgentLiveData>,
}

/// Everything needed to register an agent; the store assigns id and timestamps.
///
/// `reputation`, `tasks_completed` and `success_rate` are left `None` to take
/// the store defaults, or pre-supplied to preserve seeded values.
#[derive(Debug, Clone, Default)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub version: String,
    pub public_key: Option<String>,
    pub links: AgentLinks,
    pub category: AgentCategory,
    pub tags: IndexSet<String>,
    pub is_external: bool,
    pub capabilities: Vec<Capability>,
    pub reputation: Option<u8>,
    pub tasks_completed: Option<u64>,
    pub success_rate: Option<f64>,
}

/// Declared type of a skill parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Address,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Address => "address",
        };
        write!(f, "{}", s)
    }
}

/// A typed parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ParamValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Address(String),
}

impl ParamValue {
    /// Parse a raw command-line value according to the declared type
    pub fn parse_as(raw: &str, ty: ParamType) -> Option<Self> {
        match ty {
            ParamType::String => Some(Self::String(raw.to_string())),
            ParamType::Address => Some(Self::Address(raw.to_string())),
            ParamType::Number => raw.parse::<f64>().ok().map(Self::Number),
            ParamType::Boolean => match raw.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(Self::Boolean(true)),
                "false" | "no" | "0" => Some(Self::Boolean(false)),
                _ => None,
            },
        }
    }

    /// Whether this value is acceptable for a parameter of the given type.
    /// Addresses are strings on the wire, so a plain string satisfies `address`.
    pub fn conforms_to(&self, ty: ParamType) -> bool {
        matches!(
            (self, ty),
            (Self::String(_), ParamType::String)
                | (Self::Number(_), ParamType::Number)
                | (Self::Boolean(_), ParamType::Boolean)
                | (Self::Address(_), ParamType::Address)
                | (Self::String(_), ParamType::Address)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Address(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Address(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Parameter bag passed to skill handlers and stored on tasks
pub type ParamBag = BTreeMap<String, ParamValue>;

/// Declared parameter of a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl SkillParameter {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str, default: Option<ParamValue>) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: false,
            default,
        }
    }
}

/// Tokenization metadata; carried on skills but not used by registry logic
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<u64>,
}

/// A named, invokable capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SkillToken>,
    /// Stable key of the handler bound to this skill
    pub handler: String,
    #[serde(default)]
    pub parameters: Vec<SkillParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub royalty_percent: Option<f64>,
    pub usage_count: u64,
    pub rating: f64,
}

/// Skill metadata without the store-assigned fields
#[derive(Debug, Clone)]
pub struct NewSkill {
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    pub token: Option<SkillToken>,
    pub handler: String,
    pub parameters: Vec<SkillParameter>,
    pub price: Option<f64>,
    pub royalty_percent: Option<f64>,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Payment attached to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayment {
    pub amount: f64,
    pub currency: String,
    pub payer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// One unit of requested work and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTask {
    pub id: String,
    pub agent_id: String,
    pub skill_id: String,
    pub description: String,
    #[serde(default)]
    pub parameters: ParamBag,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<TaskPayment>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Short reference to a ranked agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAgent {
    pub id: String,
    pub name: String,
    pub reputation: u8,
}

/// Registry-wide aggregate counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_agents: usize,
    pub total_skills: usize,
    pub total_tasks: usize,
    pub running_tasks: usize,
    pub completed_tasks: usize,
    pub average_reputation: f64,
    pub top_agents: Vec<RankedAgent>,
}
