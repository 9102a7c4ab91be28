//! Local agent profile bootstrap

use crate::config::AgentConfig;
use crate::registry::{AgentCategory, AgentSkill, Capability, EntityStore, NewAgent};

/// Register this process's own agent. Capabilities mirror the registered skills.
pub fn bootstrap_local_profile(
    store: &EntityStore,
    agent: &AgentConfig,
    name: &str,
    description: &str,
    version: &str,
    skills: &[AgentSkill],
) -> String {
    let capabilities = skills
        .iter()
        .map(|s| Capability {
            name: s.name.clone(),
            description: s.description.clone(),
            version: version.to_string(),
            enabled: true,
        })
        .collect();

    store.register_agent(NewAgent {
        name: name.to_string(),
        description: description.to_string(),
        version: version.to_string(),
        public_key: agent.public_key.clone(),
        links: agent.links.clone(),
        category: AgentCategory::Utility,
        tags: ["local".to_string()].into_iter().collect(),
        is_external: false,
        capabilities,
        reputation: None,
        tasks_completed: None,
        success_rate: None,
    })
}
