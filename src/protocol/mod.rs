//! Protocol facade
//!
//! Composition root over the entity store and skill manager. Owns the local
//! agent identity, seeds the reference agents and exposes the read/write
//! paths the CLI drives.

use std::sync::Arc;

use eyre::Result;
use serde::{Deserialize, Serialize};

pub mod manifest;
pub mod profile;
pub mod seeds;

use crate::config::AgentConfig;
use crate::registry::{
    AgentCategory, AgentLinks, AgentProfile, AgentSkill, AgentTask, Capability, EntityStore, NewAgent, ParamBag,
    RegistryError, RegistryStats, SkillCategory, TaskStatus,
};
use crate::skill::SkillManager;
use manifest::{ExportedAgent, ExportedStats, ProtocolExport, ProtocolInfo};

pub const PROTOCOL_NAME: &str = "agentreg";
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error text stored on tasks recorded as failed
pub const TASK_FAILED_MESSAGE: &str = "Task execution failed";

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Registration data for an agent outside this process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalAgent {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub public_key: Option<String>,
    pub links: AgentLinks,
    pub category: AgentCategory,
    pub tags: Vec<String>,
    pub capabilities: Vec<String>,
}

/// Filters for [`Protocol::list_agents`]
#[derive(Debug, Clone, Default)]
pub struct AgentQuery {
    pub category: Option<AgentCategory>,
    /// Case-insensitive substring over name, description, tags and capabilities
    pub search: Option<String>,
    /// Enabled capability name, case-insensitive substring
    pub capability: Option<String>,
    pub limit: Option<usize>,
}

impl AgentQuery {
    fn matches(&self, agent: &AgentProfile) -> bool {
        if let Some(category) = self.category {
            if agent.category != category {
                return false;
            }
        }
        let Some(search) = &self.search else {
            return true;
        };
        let needle = search.to_lowercase();
        agent.name.to_lowercase().contains(&needle)
            || agent.description.to_lowercase().contains(&needle)
            || agent.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            || agent.capabilities.iter().any(|c| c.name.to_lowercase().contains(&needle))
    }
}

pub struct Protocol {
    store: Arc<EntityStore>,
    skills: SkillManager,
    identity: AgentConfig,
    local_agent_id: Option<String>,
    initialized: bool,
}

impl Protocol {
    pub fn new(store: Arc<EntityStore>, skills: SkillManager, identity: AgentConfig) -> Self {
        Self {
            store,
            skills,
            identity,
            local_agent_id: None,
            initialized: false,
        }
    }

    /// Register the local profile and seed the reference agents. A second
    /// call only logs a warning.
    pub fn initialize(&mut self, name: &str, description: &str, version: &str) {
        if self.initialized {
            log::warn!("Protocol already initialized, ignoring repeat initialization");
            return;
        }

        let skills = self.skills.list();
        let id = profile::bootstrap_local_profile(&self.store, &self.identity, name, description, version, &skills);
        log::info!("Local agent registered: {} ({})", name, id);
        self.local_agent_id = Some(id);

        let seeded = seeds::reference_agents();
        let count = seeded.len();
        for agent in seeded {
            self.store.register_agent(agent);
        }
        log::info!("Seeded {} reference agents", count);

        self.initialized = true;
    }

    /// Initialize from a snapshot instead of seeding. The local profile is the
    /// non-external agent named like the configured identity, else the first
    /// non-external agent; a fresh one is registered when neither exists.
    pub fn resume(&mut self, blob: &str, name: &str, description: &str, version: &str) -> Result<(), RegistryError> {
        if self.initialized {
            log::warn!("Protocol already initialized, ignoring snapshot resume");
            return Ok(());
        }

        self.skills.import_snapshot(blob)?;

        let locals: Vec<AgentProfile> = self
            .store
            .list_agents()
            .into_iter()
            .filter(|a| !a.is_external)
            .collect();
        let local = locals
            .iter()
            .find(|a| a.name == name)
            .or_else(|| locals.first())
            .map(|a| a.id.clone());

        let id = match local {
            Some(id) => id,
            None => {
                log::warn!("Snapshot has no local agent, registering {}", name);
                let skills = self.skills.list();
                profile::bootstrap_local_profile(&self.store, &self.identity, name, description, version, &skills)
            }
        };
        log::info!("Resumed from snapshot with local agent {}", id);
        self.local_agent_id = Some(id);
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn local_agent_id(&self) -> Option<&str> {
        self.local_agent_id.as_deref()
    }

    pub fn local_agent(&self) -> Option<AgentProfile> {
        self.local_agent_id.as_deref().and_then(|id| self.store.get_agent(id))
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn skill_manager(&self) -> &SkillManager {
        &self.skills
    }

    pub fn register_external_agent(&self, agent: ExternalAgent) -> Result<String, RegistryError> {
        if agent.name.trim().is_empty() {
            return Err(RegistryError::MissingField("name"));
        }
        if agent.description.trim().is_empty() {
            return Err(RegistryError::MissingField("description"));
        }

        let name = agent.name.clone();
        let id = self.store.register_agent(NewAgent {
            name: agent.name,
            description: agent.description,
            version: agent.version.unwrap_or_else(|| "1.0.0".to_string()),
            public_key: agent.public_key,
            links: agent.links,
            category: agent.category,
            tags: agent.tags.into_iter().collect(),
            is_external: true,
            capabilities: agent.capabilities.iter().map(|c| Capability::named(c)).collect(),
            reputation: Some(0),
            tasks_completed: Some(0),
            success_rate: Some(100.0),
        });
        log::info!("External agent registered: {} ({})", name, id);
        Ok(id)
    }

    /// Record a finished task for the local agent against a skill named
    /// exactly (ignoring case). Returns the task id, or `None` when nothing
    /// was recorded.
    pub fn record_task(&self, description: &str, skill_name: &str, success: bool) -> Option<String> {
        if !self.initialized {
            log::warn!("Task not recorded: protocol not initialized");
            return None;
        }
        let Some(agent) = self.local_agent() else {
            log::warn!("Task not recorded: local agent profile missing");
            return None;
        };
        let Some(skill) = self.skills.find_by_name(skill_name) else {
            log::warn!("Task not recorded: no skill named '{}'", skill_name);
            return None;
        };

        let task_id = self.store.create_task(&agent.id, &skill.id, description, ParamBag::new());
        let updated = if success {
            self.store
                .update_task_status(&task_id, TaskStatus::Completed, Some(description.to_string()), None)
        } else {
            self.store
                .update_task_status(&task_id, TaskStatus::Failed, None, Some(TASK_FAILED_MESSAGE.to_string()))
        };
        if !updated {
            log::warn!("Task {} created but its outcome was not applied", task_id);
        }
        Some(task_id)
    }

    /// Agents matching the query, highest reputation first
    pub fn list_agents(&self, query: &AgentQuery) -> Vec<AgentProfile> {
        let candidates = match &query.capability {
            Some(capability) => self.store.find_agents_by_capability(capability),
            None => self.store.list_agents(),
        };
        let mut agents: Vec<AgentProfile> = candidates.into_iter().filter(|a| query.matches(a)).collect();
        agents.sort_by(|a, b| b.reputation.cmp(&a.reputation));
        if let Some(limit) = query.limit {
            agents.truncate(limit);
        }
        agents
    }

    pub fn agent(&self, id: &str) -> Result<AgentProfile, RegistryError> {
        self.store
            .get_agent(id)
            .ok_or_else(|| RegistryError::agent_not_found(id))
    }

    /// Tasks of one agent, newest first
    pub fn task_history(&self, agent_id: &str, limit: Option<usize>) -> Vec<AgentTask> {
        let mut tasks = self.store.list_tasks_by_agent(agent_id);
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.truncate(limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
        tasks
    }

    pub fn skills(&self) -> Vec<AgentSkill> {
        self.skills.list()
    }

    pub fn skills_in_category(&self, category: SkillCategory) -> Vec<AgentSkill> {
        self.skills.in_category(category)
    }

    pub fn stats(&self) -> RegistryStats {
        self.store.get_stats()
    }

    /// Human-readable digest of the local agent and the registry
    pub fn summary(&self) -> String {
        let stats = self.stats();
        let mut out = String::new();

        match self.local_agent() {
            Some(agent) => {
                out.push_str(&format!("{} v{}\n", agent.name, agent.version));
                out.push_str(&format!("{}\n", agent.description));
                out.push_str(&format!(
                    "Reputation: {}/100 | Tasks: {} | Success rate: {:.1}%\n",
                    agent.reputation, agent.tasks_completed, agent.success_rate
                ));
            }
            None => out.push_str("Local agent not initialized\n"),
        }

        out.push_str(&format!(
            "\nRegistry: {} agents, {} skills, {} tasks ({} completed, {} running)\n",
            stats.total_agents, stats.total_skills, stats.total_tasks, stats.completed_tasks, stats.running_tasks
        ));
        out.push_str(&format!("Average reputation: {:.1}\n", stats.average_reputation));

        if !stats.top_agents.is_empty() {
            out.push_str("\nTop agents:\n");
            for (rank, agent) in stats.top_agents.iter().enumerate() {
                out.push_str(&format!("  {}. {} ({})\n", rank + 1, agent.name, agent.reputation));
            }
        }

        let skills = self.skills();
        if !skills.is_empty() {
            out.push_str("\nSkills:\n");
            for skill in skills {
                out.push_str(&format!("  - {}: {} (used {}x)\n", skill.name, skill.description, skill.usage_count));
            }
        }

        out
    }

    pub fn export_for_openclaw(&self) -> Result<ProtocolExport, RegistryError> {
        let agent = self
            .local_agent()
            .ok_or_else(|| RegistryError::agent_not_found(self.local_agent_id().unwrap_or("local")))?;
        let stats = self.stats();

        Ok(ProtocolExport {
            protocol: ProtocolInfo {
                name: PROTOCOL_NAME.to_string(),
                version: PROTOCOL_VERSION.to_string(),
            },
            agent: ExportedAgent {
                id: agent.id,
                name: agent.name,
                description: agent.description,
                version: agent.version,
                public_key: agent.public_key,
                capabilities: agent.capabilities,
                reputation: agent.reputation,
            },
            skills: self.skills.listings(),
            stats: ExportedStats {
                total_agents: stats.total_agents,
                total_skills: stats.total_skills,
                total_tasks: stats.total_tasks,
                average_reputation: stats.average_reputation,
            },
        })
    }

    pub fn create_openclaw_manifest(&self) -> Result<String> {
        let export = self.export_for_openclaw()?;
        manifest::render_manifest(&export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainClient;
    use crate::skill::builtin::{self, tests::FakeChain};

    fn protocol() -> Protocol {
        let store = Arc::new(EntityStore::new());
        let mut skills = SkillManager::new(store.clone());
        let chain: Arc<dyn ChainClient> = Arc::new(FakeChain);
        builtin::register_builtin(&mut skills, chain, vec!["solana".to_string()]);
        Protocol::new(store, skills, AgentConfig::default())
    }

    fn initialized() -> Protocol {
        let mut protocol = protocol();
        protocol.initialize("Local", "Local test agent", "0.1.0");
        protocol
    }

    #[test]
    fn test_initialize_registers_local_and_seeds() {
        let protocol = initialized();
        assert!(protocol.is_initialized());

        let local = protocol.local_agent().unwrap();
        assert_eq!(local.name, "Local");
        assert!(!local.is_external);
        assert_eq!(local.capabilities.len(), 4);

        let stats = protocol.stats();
        assert_eq!(stats.total_agents, 1 + seeds::reference_agents().len());
        assert_eq!(stats.total_skills, 4);
    }

    #[test]
    fn test_initialize_twice_is_noop() {
        let mut protocol = initialized();
        let before = protocol.stats().total_agents;
        let local = protocol.local_agent_id().map(str::to_string);

        protocol.initialize("Other", "Again", "9.9.9");
        assert_eq!(protocol.stats().total_agents, before);
        assert_eq!(protocol.local_agent_id().map(str::to_string), local);
    }

    #[test]
    fn test_seeded_agents_keep_preset_stats() {
        let protocol = initialized();
        let eliza = protocol
            .list_agents(&AgentQuery {
                search: Some("elizaos".to_string()),
                ..Default::default()
            })
            .into_iter()
            .next()
            .unwrap();
        assert!(eliza.is_external);
        assert_eq!(eliza.reputation, 92);
        assert_eq!(eliza.tasks_completed, 15_400);
    }

    #[test]
    fn test_register_external_agent_defaults() {
        let protocol = initialized();
        let id = protocol
            .register_external_agent(ExternalAgent {
                name: "X".to_string(),
                description: "External agent".to_string(),
                capabilities: vec!["Balance Checks".to_string()],
                ..Default::default()
            })
            .unwrap();

        let agent = protocol.agent(&id).unwrap();
        assert!(agent.is_external);
        assert_eq!(agent.reputation, 0);
        assert_eq!(agent.tasks_completed, 0);
        assert_eq!(agent.success_rate, 100.0);
        assert_eq!(agent.capabilities[0].name, "Balance Checks");
        assert!(agent.capabilities[0].enabled);
    }

    #[test]
    fn test_register_external_agent_requires_name_and_description() {
        let protocol = initialized();
        let err = protocol
            .register_external_agent(ExternalAgent {
                description: "no name".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingField("name")));

        let err = protocol
            .register_external_agent(ExternalAgent {
                name: "Nameless".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingField("description")));
    }

    #[test]
    fn test_record_task_success() {
        let protocol = initialized();
        let before = protocol.local_agent().unwrap();

        let task_id = protocol.record_task("checked status", "network status", true).unwrap();
        let task = protocol.store().get_task(&task_id).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_deref(), Some("checked status"));

        let after = protocol.local_agent().unwrap();
        assert_eq!(after.tasks_completed, before.tasks_completed + 1);
        assert_eq!(after.reputation, before.reputation + 1);

        let skill = protocol.skill_manager().find_by_name("Network Status").unwrap();
        assert_eq!(skill.usage_count, 1);
    }

    #[test]
    fn test_record_task_failure_uses_fixed_error() {
        let protocol = initialized();
        let task_id = protocol.record_task("tried", "Wallet Balance", false).unwrap();
        let task = protocol.store().get_task(&task_id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error.as_deref(), Some(TASK_FAILED_MESSAGE));
        assert!(task.result.is_none());
    }

    #[test]
    fn test_record_task_unknown_skill_is_noop() {
        let protocol = initialized();
        let before = protocol.stats();
        let local_before = protocol.local_agent().unwrap();

        assert!(protocol.record_task("desc", "Nonexistent Skill", true).is_none());

        assert_eq!(protocol.stats(), before);
        let local_after = protocol.local_agent().unwrap();
        assert_eq!(local_after.tasks_completed, local_before.tasks_completed);
        assert_eq!(local_after.reputation, local_before.reputation);
    }

    #[test]
    fn test_record_task_before_initialize_is_noop() {
        let protocol = protocol();
        assert!(protocol.record_task("desc", "Network Status", true).is_none());
        assert_eq!(protocol.stats().total_tasks, 0);
    }

    #[test]
    fn test_list_agents_sorted_and_filtered() {
        let protocol = initialized();
        let all = protocol.list_agents(&AgentQuery::default());
        assert!(all.windows(2).all(|w| w[0].reputation >= w[1].reputation));

        let frameworks = protocol.list_agents(&AgentQuery {
            category: Some(AgentCategory::Framework),
            ..Default::default()
        });
        assert!(!frameworks.is_empty());
        assert!(frameworks.iter().all(|a| a.category == AgentCategory::Framework));

        let limited = protocol.list_agents(&AgentQuery {
            limit: Some(3),
            ..Default::default()
        });
        assert_eq!(limited.len(), 3);
        assert_eq!(limited[0].id, all[0].id);

        let by_capability = protocol.list_agents(&AgentQuery {
            search: Some("token swaps".to_string()),
            ..Default::default()
        });
        assert_eq!(by_capability.len(), 2);

        let wallets = protocol.list_agents(&AgentQuery {
            capability: Some("wallet".to_string()),
            ..Default::default()
        });
        let names: Vec<&str> = wallets.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"Solana Agent Kit"));
        assert!(names.contains(&"GOAT"));
        // The local agent advertises the Wallet Balance skill
        assert!(names.contains(&"Local"));
        assert_eq!(wallets.len(), 3);
    }

    #[test]
    fn test_skills_in_category() {
        let protocol = initialized();
        let trading = protocol.skills_in_category(SkillCategory::Trading);
        assert_eq!(trading.len(), 1);
        assert_eq!(trading[0].name, "Token Prices");
        assert!(protocol.skills_in_category(SkillCategory::Nft).is_empty());
    }

    #[test]
    fn test_agent_not_found() {
        let protocol = initialized();
        let err = protocol.agent("agent_missing").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_task_history_newest_first_and_capped() {
        let protocol = initialized();
        for i in 0..3 {
            protocol.record_task(&format!("task {}", i), "Network Status", true);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        let local = protocol.local_agent_id().unwrap().to_string();

        let history = protocol.task_history(&local, None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].description, "task 2");
        assert_eq!(history[2].description, "task 0");

        assert_eq!(protocol.task_history(&local, Some(1)).len(), 1);
    }

    #[test]
    fn test_export_for_openclaw() {
        let protocol = initialized();
        protocol.record_task("ok", "Token Prices", true);

        let export = protocol.export_for_openclaw().unwrap();
        assert_eq!(export.protocol.name, PROTOCOL_NAME);
        assert_eq!(export.agent.name, "Local");
        assert_eq!(export.skills.len(), 4);
        assert_eq!(export.stats.total_tasks, 1);
        assert_eq!(export.stats.total_agents, protocol.stats().total_agents);
    }

    #[test]
    fn test_export_requires_initialization() {
        let protocol = protocol();
        assert!(protocol.export_for_openclaw().is_err());
        assert!(protocol.create_openclaw_manifest().is_err());
    }

    #[test]
    fn test_resume_restores_local_agent_and_tasks() {
        let original = initialized();
        original.record_task("first", "Network Status", true);
        let local_id = original.local_agent_id().unwrap().to_string();
        let blob = original.store().export_data().unwrap();

        let mut resumed = protocol();
        resumed.resume(&blob, "Local", "Local test agent", "0.1.0").unwrap();
        assert!(resumed.is_initialized());
        assert_eq!(resumed.local_agent_id(), Some(local_id.as_str()));
        assert_eq!(resumed.stats().total_agents, original.stats().total_agents);
        assert_eq!(resumed.task_history(&local_id, None).len(), 1);

        let task_id = resumed.record_task("second", "Network Status", true).unwrap();
        assert!(resumed.store().get_task(&task_id).is_some());
        let skill = resumed.skill_manager().find_by_name("Network Status").unwrap();
        assert_eq!(skill.usage_count, 2);
    }

    #[test]
    fn test_resume_malformed_snapshot_fails() {
        let mut protocol = protocol();
        let err = protocol.resume("[1, 2", "Local", "desc", "0.1.0").unwrap_err();
        assert!(matches!(err, RegistryError::MalformedImport(_)));
        assert!(!protocol.is_initialized());
    }

    #[test]
    fn test_manifest_and_summary_mention_local_agent() {
        let protocol = initialized();
        let manifest = protocol.create_openclaw_manifest().unwrap();
        assert!(manifest.contains("name: local"));
        assert!(manifest.contains("### Wallet Balance (`wallet-balance`)"));

        let summary = protocol.summary();
        assert!(summary.contains("Local v0.1.0"));
        assert!(summary.contains("Top agents:"));
        assert!(summary.contains("Network Status"));
    }
}
