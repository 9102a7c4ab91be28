//! Registry error taxonomy

use thiserror::Error;

/// Errors surfaced to callers of the registry, skill manager and facade
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Skill '{skill}' requires parameter '{parameter}'")]
    MissingParameter { skill: String, parameter: String },

    #[error("Skill '{skill}' expects parameter '{parameter}' to be a {expected}")]
    InvalidParameter {
        skill: String,
        parameter: String,
        expected: String,
    },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed snapshot: {0}")]
    MalformedImport(String),

    #[error("Skill handler failed: {0}")]
    Handler(String),
}

impl RegistryError {
    pub fn agent_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Agent",
            id: id.to_string(),
        }
    }

    pub fn skill_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Skill",
            id: id.to_string(),
        }
    }
}
