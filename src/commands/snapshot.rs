//! Snapshot commands

use colored::*;
use eyre::Result;

use crate::cli::SnapshotAction;
use crate::config::Config;
use crate::protocol::Protocol;

pub fn run(action: SnapshotAction, protocol: &Protocol, quiet: bool) -> Result<()> {
    match action {
        SnapshotAction::Export { path } => {
            super::save_snapshot(protocol, &path)?;
            if !quiet {
                let stats = protocol.stats();
                println!(
                    "{} Wrote {} agents, {} skills, {} tasks to {}",
                    "✓".green(),
                    stats.total_agents,
                    stats.total_skills,
                    stats.total_tasks,
                    Config::expand_path(&path).display()
                );
            }
            Ok(())
        }
    }
}
