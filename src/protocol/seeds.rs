//! Reference agents seeded at initialization
//!
//! Real-world agent projects with pre-supplied reputation so the registry has
//! something meaningful to rank and crawl from the start.

use crate::registry::{AgentCategory, AgentLinks, Capability, NewAgent};

struct Seed {
    name: &'static str,
    description: &'static str,
    category: AgentCategory,
    github: Option<&'static str>,
    website: Option<&'static str>,
    twitter: Option<&'static str>,
    capabilities: &'static [&'static str],
    tags: &'static [&'static str],
    reputation: u8,
    tasks_completed: u64,
    success_rate: f64,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "ElizaOS",
        description: "Open-source framework for autonomous multi-platform agents",
        category: AgentCategory::Framework,
        github: Some("https://github.com/elizaOS/eliza"),
        website: Some("https://elizaos.ai"),
        twitter: Some("https://x.com/elizaOS"),
        capabilities: &["Social Posting", "Plugin System", "Memory"],
        tags: &["framework", "typescript", "social"],
        reputation: 92,
        tasks_completed: 15_400,
        success_rate: 96.0,
    },
    Seed {
        name: "Virtuals Protocol",
        description: "Launchpad and co-ownership layer for tokenized AI agents",
        category: AgentCategory::Framework,
        github: None,
        website: Some("https://virtuals.io"),
        twitter: Some("https://x.com/virtuals_io"),
        capabilities: &["Agent Tokenization", "Agent Launchpad"],
        tags: &["base", "tokenization"],
        reputation: 88,
        tasks_completed: 9_800,
        success_rate: 94.0,
    },
    Seed {
        name: "AIXBT",
        description: "Market intelligence agent tracking crypto narratives",
        category: AgentCategory::Analytics,
        github: None,
        website: None,
        twitter: Some("https://x.com/aixbt_agent"),
        capabilities: &["Market Analysis", "Narrative Tracking"],
        tags: &["analytics", "alpha"],
        reputation: 85,
        tasks_completed: 21_000,
        success_rate: 91.0,
    },
    Seed {
        name: "Solana Agent Kit",
        description: "Toolkit connecting agents to Solana protocols",
        category: AgentCategory::Defi,
        github: Some("https://github.com/sendaifun/solana-agent-kit"),
        website: Some("https://kit.sendai.fun"),
        twitter: None,
        capabilities: &["Token Swaps", "Wallet Management", "Staking"],
        tags: &["solana", "defi", "toolkit"],
        reputation: 84,
        tasks_completed: 6_200,
        success_rate: 95.0,
    },
    Seed {
        name: "Griffain",
        description: "Agent engine executing on-chain actions from natural language",
        category: AgentCategory::Trading,
        github: None,
        website: Some("https://griffain.com"),
        twitter: Some("https://x.com/griffaindotcom"),
        capabilities: &["Token Swaps", "Portfolio Management"],
        tags: &["solana", "trading"],
        reputation: 80,
        tasks_completed: 4_300,
        success_rate: 90.0,
    },
    Seed {
        name: "GOAT",
        description: "Great Onchain Agent Toolkit for wallets and protocol plugins",
        category: AgentCategory::Utility,
        github: Some("https://github.com/goat-sdk/goat"),
        website: None,
        twitter: None,
        capabilities: &["Wallet Management", "Plugin System"],
        tags: &["toolkit", "multichain"],
        reputation: 78,
        tasks_completed: 2_100,
        success_rate: 93.0,
    },
    Seed {
        name: "Rig",
        description: "Rust library for building modular LLM-powered agents",
        category: AgentCategory::Framework,
        github: Some("https://github.com/0xPlaygrounds/rig"),
        website: Some("https://rig.rs"),
        twitter: None,
        capabilities: &["LLM Orchestration", "Retrieval"],
        tags: &["rust", "framework"],
        reputation: 76,
        tasks_completed: 1_500,
        success_rate: 97.0,
    },
    Seed {
        name: "Zerebro",
        description: "Autonomous creative agent publishing art and music",
        category: AgentCategory::Nft,
        github: None,
        website: Some("https://zerebro.org"),
        twitter: Some("https://x.com/0xzerebro"),
        capabilities: &["Content Creation", "NFT Minting"],
        tags: &["creative", "nft"],
        reputation: 72,
        tasks_completed: 3_400,
        success_rate: 88.0,
    },
];

/// Registrations for every reference agent
pub fn reference_agents() -> Vec<NewAgent> {
    SEEDS
        .iter()
        .map(|seed| NewAgent {
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            version: "1.0.0".to_string(),
            public_key: None,
            links: AgentLinks {
                website: seed.website.map(str::to_string),
                github: seed.github.map(str::to_string),
                twitter: seed.twitter.map(str::to_string),
            },
            category: seed.category,
            tags: seed.tags.iter().map(|t| t.to_string()).collect(),
            is_external: true,
            capabilities: seed.capabilities.iter().map(|c| Capability::named(c)).collect(),
            reputation: Some(seed.reputation),
            tasks_completed: Some(seed.tasks_completed),
            success_rate: Some(seed.success_rate),
        })
        .collect()
}
