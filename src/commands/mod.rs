//! CLI command implementations
//!
//! Every command works against a freshly built [`Protocol`]: built-in skills
//! bound to the configured chain RPC, then either the seeded registry or a
//! `--load` snapshot.

use eyre::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub mod agents;
pub mod completions;
pub mod crawl;
pub mod manifest;
pub mod skills;
pub mod snapshot;
pub mod stats;
pub mod tasks;

use crate::chain::{ChainClient, RpcChainClient};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::protocol::Protocol;
use crate::registry::EntityStore;
use crate::skill::{SkillManager, builtin};

/// Wire up the store, skills and facade for one invocation
pub fn build_protocol(config: &Config, load: Option<&Path>) -> Result<Protocol> {
    let store = Arc::new(EntityStore::new());
    let mut skills = SkillManager::new(store.clone());
    let chain: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(&config.chain));
    builtin::register_builtin(&mut skills, chain, config.chain.default_tokens.clone());

    let agent = &config.agent;
    let mut protocol = Protocol::new(store, skills, agent.clone());

    match load {
        Some(path) => {
            let path = Config::expand_path(path);
            let blob = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
            protocol
                .resume(&blob, &agent.name, &agent.description, &agent.version)
                .with_context(|| format!("Failed to load snapshot: {}", path.display()))?;
        }
        None => protocol.initialize(&agent.name, &agent.description, &agent.version),
    }

    Ok(protocol)
}

/// Write the current registry snapshot to `path`
pub fn save_snapshot(protocol: &Protocol, path: &Path) -> Result<()> {
    let path = Config::expand_path(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let blob = protocol.store().export_data().context("Failed to serialize registry")?;
    fs::write(&path, blob).with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
    log::info!("Snapshot written to {}", path.display());
    Ok(())
}

/// Print a value as JSON or YAML; `Text` is handled by the caller
fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
