//! Agent registry
//!
//! This module handles:
//! - The agent/skill/task data model
//! - The in-memory entity store that owns all three maps
//! - Reputation arithmetic driven by task outcomes
//! - The error taxonomy shared by the registry, skills and facade

pub mod error;
pub mod reputation;
pub mod store;
pub mod types;

pub use error::RegistryError;
pub use store::EntityStore;
pub use types::*;
