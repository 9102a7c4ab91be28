//! Skill registration and dispatch
//!
//! This module handles:
//! - Binding skill metadata (kept in the entity store) to executable handlers
//! - Validating parameter bags before a handler runs
//! - Searching skills and producing the stable export listing
//!
//! Metadata and handler are always registered together, so every skill id the
//! manager hands out resolves to a handler.

use std::collections::HashMap;
use std::sync::Arc;

pub mod builtin;
pub mod listing;

use crate::registry::store::Snapshot;
use crate::registry::{AgentSkill, EntityStore, NewSkill, ParamBag, RegistryError, SkillCategory};
use listing::SkillListing;

/// Executable side of a skill
pub trait SkillHandler: Send + Sync {
    /// Run the skill. The returned text is passed back to the caller unmodified.
    fn handle(&self, params: &ParamBag) -> eyre::Result<String>;
}

impl<F> SkillHandler for F
where
    F: Fn(&ParamBag) -> eyre::Result<String> + Send + Sync,
{
    fn handle(&self, params: &ParamBag) -> eyre::Result<String> {
        self(params)
    }
}

/// Skill manager: handler table keyed by skill id
pub struct SkillManager {
    store: Arc<EntityStore>,
    handlers: HashMap<String, Box<dyn SkillHandler>>,
}

impl SkillManager {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            handlers: HashMap::new(),
        }
    }

    /// Store the metadata and bind the handler under the new id
    pub fn register_skill(&mut self, skill: NewSkill, handler: Box<dyn SkillHandler>) -> String {
        let name = skill.name.clone();
        let id = self.store.register_skill(skill);
        self.handlers.insert(id.clone(), handler);
        log::info!("Skill registered: {} ({})", name, id);
        id
    }

    /// Validate parameters, run the handler and count the use
    pub fn execute_skill(&self, id: &str, params: ParamBag) -> Result<String, RegistryError> {
        let skill = self
            .store
            .get_skill(id)
            .ok_or_else(|| RegistryError::skill_not_found(id))?;
        let handler = self
            .handlers
            .get(id)
            .ok_or_else(|| RegistryError::skill_not_found(id))?;

        let params = validate_parameters(&skill, params)?;

        log::debug!("Executing skill {} with {} parameter(s)", skill.name, params.len());
        let output = handler.handle(&params).map_err(|e| {
            log::warn!("Skill {} failed: {:#}", skill.name, e);
            RegistryError::Handler(format!("{:#}", e))
        })?;

        self.store.increment_skill_usage(id);
        Ok(output)
    }

    /// Case-insensitive exact name match
    pub fn find_by_name(&self, name: &str) -> Option<AgentSkill> {
        let name = name.to_lowercase();
        self.store
            .list_skills()
            .into_iter()
            .find(|s| s.name.to_lowercase() == name && self.handlers.contains_key(&s.id))
    }

    /// Resolve an id, exact name or slug to a skill
    pub fn resolve(&self, name_or_id: &str) -> Option<AgentSkill> {
        if let Some(skill) = self.store.get_skill(name_or_id).filter(|s| self.handlers.contains_key(&s.id)) {
            return Some(skill);
        }
        self.find_by_name(name_or_id).or_else(|| {
            self.list()
                .into_iter()
                .find(|s| listing::slugify(&s.name) == name_or_id)
        })
    }

    /// Case-insensitive substring search over name, description and category
    pub fn search_skills(&self, query: &str) -> Vec<AgentSkill> {
        let query_lower = query.to_lowercase();
        self.list()
            .into_iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&query_lower)
                    || s.description.to_lowercase().contains(&query_lower)
                    || s.category.to_string().contains(&query_lower)
            })
            .collect()
    }

    /// Skills that have a bound handler
    pub fn list(&self) -> Vec<AgentSkill> {
        self.store
            .list_skills()
            .into_iter()
            .filter(|s| self.handlers.contains_key(&s.id))
            .collect()
    }

    /// Skills of one category that have a bound handler
    pub fn in_category(&self, category: SkillCategory) -> Vec<AgentSkill> {
        self.store
            .find_skills_by_category(category)
            .into_iter()
            .filter(|s| self.handlers.contains_key(&s.id))
            .collect()
    }

    /// Stable external representation of every skill
    pub fn listings(&self) -> Vec<SkillListing> {
        self.list().iter().map(SkillListing::from).collect()
    }

    /// Replace the store contents with a snapshot, then rebind handlers to
    /// the imported skill ids through their handler keys. Bound skills the
    /// snapshot lacks are registered again with fresh counters.
    pub fn import_snapshot(&mut self, blob: &str) -> Result<Snapshot, RegistryError> {
        let bound = self.list();
        let snapshot = self.store.import_data(blob)?;

        let mut by_key: HashMap<String, (AgentSkill, Box<dyn SkillHandler>)> = HashMap::new();
        for skill in bound {
            if let Some(handler) = self.handlers.remove(&skill.id) {
                by_key.insert(skill.handler.clone(), (skill, handler));
            }
        }
        self.handlers.clear();

        for skill in self.store.list_skills() {
            if let Some((_, handler)) = by_key.remove(&skill.handler) {
                self.handlers.insert(skill.id, handler);
            } else {
                log::debug!("Imported skill {} has no handler and stays unreachable", skill.name);
            }
        }

        for (_, (skill, handler)) in by_key {
            self.register_skill(
                NewSkill {
                    name: skill.name,
                    description: skill.description,
                    category: skill.category,
                    token: skill.token,
                    handler: skill.handler,
                    parameters: skill.parameters,
                    price: skill.price,
                    royalty_percent: skill.royalty_percent,
                },
                handler,
            );
        }

        Ok(snapshot)
    }
}

/// Check required parameters are present and supplied values match their
/// declared type; fill absent optional parameters from their defaults.
fn validate_parameters(skill: &AgentSkill, mut params: ParamBag) -> Result<ParamBag, RegistryError> {
    for declared in &skill.parameters {
        match params.get(&declared.name) {
            Some(value) => {
                if !value.conforms_to(declared.param_type) {
                    return Err(RegistryError::InvalidParameter {
                        skill: skill.name.clone(),
                        parameter: declared.name.clone(),
                        expected: declared.param_type.to_string(),
                    });
                }
            }
            None if declared.required => {
                return Err(RegistryError::MissingParameter {
                    skill: skill.name.clone(),
                    parameter: declared.name.clone(),
                });
            }
            None => {
                if let Some(default) = &declared.default {
                    params.insert(declared.name.clone(), default.clone());
                }
            }
        }
    }
    Ok(params)
}
