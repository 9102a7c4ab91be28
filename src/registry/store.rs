//! In-memory entity store
//!
//! The store owns the agent, skill and task maps for the lifetime of the
//! process. Every operation takes the internal lock exactly once, so each
//! mutation is a single step from the caller's point of view. Lookups on
//! unknown ids are absorbed: readers get `None`, bookkeeping calls are no-ops.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::RegistryError;
use super::reputation;
use super::types::{
    AgentLiveData, AgentProfile, AgentSkill, AgentTask, NewAgent, NewSkill, ParamBag, RankedAgent, RegistryStats,
    SkillCategory, TaskStatus,
};

/// Reputation assigned when a registration does not pre-supply one
pub const DEFAULT_REPUTATION: u8 = 50;

/// Number of agents reported in `RegistryStats::top_agents`
const TOP_AGENTS: usize = 5;

/// Serializable dump of all three maps, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub agents: IndexMap<String, AgentProfile>,
    #[serde(default)]
    pub skills: IndexMap<String, AgentSkill>,
    #[serde(default)]
    pub tasks: IndexMap<String, AgentTask>,
}

#[derive(Debug, Default)]
struct StoreData {
    maps: Snapshot,
    next_seq: u64,
}

impl StoreData {
    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_seq += 1;
            let id = format!("{}_{:x}_{}", prefix, Utc::now().timestamp_millis(), self.next_seq);
            let taken = self.maps.agents.contains_key(&id)
                || self.maps.skills.contains_key(&id)
                || self.maps.tasks.contains_key(&id);
            if !taken {
                return id;
            }
        }
    }

    fn apply_reputation(&mut self, id: &str, success: bool) -> bool {
        let Some(agent) = self.maps.agents.get_mut(id) else {
            log::debug!("Reputation update for unknown agent {} ignored", id);
            return false;
        };
        agent.tasks_completed += 1;
        agent.reputation = reputation::apply_task_outcome(agent.reputation, success);
        agent.success_rate = reputation::success_rate(agent.reputation, agent.tasks_completed);
        agent.last_active = Utc::now();
        true
    }

    fn bump_skill_usage(&mut self, id: &str) -> bool {
        match self.maps.skills.get_mut(id) {
            Some(skill) => {
                skill.usage_count += 1;
                true
            }
            None => {
                log::debug!("Usage increment for unknown skill {} ignored", id);
                false
            }
        }
    }
}

/// Authoritative registry of agents, skills and tasks
#[derive(Debug, Default)]
pub struct EntityStore {
    data: Mutex<StoreData>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- agents ---

    /// Register an agent and return its new id
    pub fn register_agent(&self, agent: NewAgent) -> String {
        let mut data = self.lock();
        let id = data.next_id("agent");
        let now = Utc::now();
        let reputation = agent.reputation.unwrap_or(DEFAULT_REPUTATION).min(reputation::MAX_REPUTATION);

        let profile = AgentProfile {
            id: id.clone(),
            name: agent.name,
            description: agent.description,
            version: agent.version,
            public_key: agent.public_key,
            links: agent.links,
            category: agent.category,
            tags: agent.tags,
            is_external: agent.is_external,
            capabilities: agent.capabilities,
            reputation,
            tasks_completed: agent.tasks_completed.unwrap_or(0),
            success_rate: agent.success_rate.unwrap_or(100.0).clamp(0.0, 100.0),
            created_at: now,
            last_active: now,
            live_data: None,
        };

        log::debug!("Registered agent {} ({})", profile.name, id);
        data.maps.agents.insert(id.clone(), profile);
        id
    }

    pub fn get_agent(&self, id: &str) -> Option<AgentProfile> {
        self.lock().maps.agents.get(id).cloned()
    }

    /// Snapshot of all agents in insertion order
    pub fn list_agents(&self) -> Vec<AgentProfile> {
        self.lock().maps.agents.values().cloned().collect()
    }

    /// Agents with an enabled capability whose name contains `name` (case-insensitive)
    pub fn find_agents_by_capability(&self, name: &str) -> Vec<AgentProfile> {
        let query = name.to_lowercase();
        self.lock()
            .maps
            .agents
            .values()
            .filter(|a| {
                a.capabilities
                    .iter()
                    .any(|c| c.enabled && c.name.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }

    /// Apply one task outcome to an agent's reputation. Unknown ids are ignored.
    pub fn update_reputation(&self, id: &str, success: bool) -> bool {
        self.lock().apply_reputation(id, success)
    }

    /// Replace an agent's live-data snapshot wholesale
    pub fn set_live_data(&self, id: &str, live_data: AgentLiveData) -> bool {
        match self.lock().maps.agents.get_mut(id) {
            Some(agent) => {
                agent.live_data = Some(live_data);
                true
            }
            None => {
                log::debug!("Live data for unknown agent {} dropped", id);
                false
            }
        }
    }

    // --- skills ---

    pub fn register_skill(&self, skill: NewSkill) -> String {
        let mut data = self.lock();
        let id = data.next_id("skill");
        let skill = AgentSkill {
            id: id.clone(),
            name: skill.name,
            description: skill.description,
            category: skill.category,
            token: skill.token,
            handler: skill.handler,
            parameters: skill.parameters,
            price: skill.price,
            royalty_percent: skill.royalty_percent,
            usage_count: 0,
            rating: 0.0,
        };
        log::debug!("Registered skill {} ({})", skill.name, id);
        data.maps.skills.insert(id.clone(), skill);
        id
    }

    pub fn get_skill(&self, id: &str) -> Option<AgentSkill> {
        self.lock().maps.skills.get(id).cloned()
    }

    pub fn list_skills(&self) -> Vec<AgentSkill> {
        self.lock().maps.skills.values().cloned().collect()
    }

    pub fn find_skills_by_category(&self, category: SkillCategory) -> Vec<AgentSkill> {
        self.lock()
            .maps
            .skills
            .values()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    pub fn increment_skill_usage(&self, id: &str) -> bool {
        self.lock().bump_skill_usage(id)
    }

    // --- tasks ---

    pub fn create_task(&self, agent_id: &str, skill_id: &str, description: &str, parameters: ParamBag) -> String {
        let mut data = self.lock();
        let id = data.next_id("task");
        let task = AgentTask {
            id: id.clone(),
            agent_id: agent_id.to_string(),
            skill_id: skill_id.to_string(),
            description: description.to_string(),
            parameters,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            payment: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };
        data.maps.tasks.insert(id.clone(), task);
        id
    }

    pub fn get_task(&self, id: &str) -> Option<AgentTask> {
        self.lock().maps.tasks.get(id).cloned()
    }

    /// Move a task to `status`.
    ///
    /// Allowed transitions: pending -> running, pending|running -> completed|failed.
    /// Terminal tasks are immutable, so each task contributes at most one
    /// reputation update and one skill-usage increment. Returns whether the
    /// transition was applied.
    pub fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
        result: Option<String>,
        error: Option<String>,
    ) -> bool {
        let mut data = self.lock();
        let Some(task) = data.maps.tasks.get_mut(id) else {
            log::debug!("Status update for unknown task {} ignored", id);
            return false;
        };

        let allowed = matches!(
            (task.status, status),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending | TaskStatus::Running, TaskStatus::Completed | TaskStatus::Failed)
        );
        if !allowed {
            log::warn!("Task {}: ignoring transition {} -> {}", id, task.status, status);
            return false;
        }

        let now = Utc::now();
        task.status = status;

        if status == TaskStatus::Running {
            task.started_at.get_or_insert(now);
            return true;
        }

        task.completed_at = Some(now);
        task.result = result;
        task.error = error;
        let agent_id = task.agent_id.clone();
        let skill_id = task.skill_id.clone();

        data.apply_reputation(&agent_id, status == TaskStatus::Completed);
        data.bump_skill_usage(&skill_id);
        true
    }

    /// All tasks owned by an agent, in creation order
    pub fn list_tasks_by_agent(&self, agent_id: &str) -> Vec<AgentTask> {
        self.lock()
            .maps
            .tasks
            .values()
            .filter(|t| t.agent_id == agent_id)
            .cloned()
            .collect()
    }

    // --- aggregates ---

    pub fn get_stats(&self) -> RegistryStats {
        let data = self.lock();
        let agents: Vec<&AgentProfile> = data.maps.agents.values().collect();

        let average_reputation = if agents.is_empty() {
            0.0
        } else {
            agents.iter().map(|a| a.reputation as f64).sum::<f64>() / agents.len() as f64
        };

        let mut ranked = agents.clone();
        ranked.sort_by(|a, b| b.reputation.cmp(&a.reputation));
        let top_agents = ranked
            .into_iter()
            .take(TOP_AGENTS)
            .map(|a| RankedAgent {
                id: a.id.clone(),
                name: a.name.clone(),
                reputation: a.reputation,
            })
            .collect();

        let count_status = |status: TaskStatus| data.maps.tasks.values().filter(|t| t.status == status).count();

        RegistryStats {
            total_agents: agents.len(),
            total_skills: data.maps.skills.len(),
            total_tasks: data.maps.tasks.len(),
            running_tasks: count_status(TaskStatus::Running),
            completed_tasks: count_status(TaskStatus::Completed),
            average_reputation,
            top_agents,
        }
    }

    // --- snapshots ---

    /// Serialize all three maps to JSON
    pub fn export_data(&self) -> eyre::Result<String> {
        let data = self.lock();
        Ok(serde_json::to_string_pretty(&data.maps)?)
    }

    /// Replace all three maps from a JSON snapshot.
    ///
    /// On malformed input the failure is logged and the current state is kept.
    pub fn import_data(&self, blob: &str) -> Result<Snapshot, RegistryError> {
        let snapshot: Snapshot = match serde_json::from_str(blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Snapshot import failed, keeping current state: {}", e);
                return Err(RegistryError::MalformedImport(e.to_string()));
            }
        };

        let mut data = self.lock();
        data.maps = snapshot.clone();
        log::info!(
            "Imported snapshot: {} agents, {} skills, {} tasks",
            snapshot.agents.len(),
            snapshot.skills.len(),
            snapshot.tasks.len()
        );
        Ok(snapshot)
    }
}
