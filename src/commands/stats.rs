//! Registry statistics and summary

use colored::*;
use eyre::Result;

use super::print_structured;
use crate::cli::OutputFormat;
use crate::protocol::Protocol;

pub fn run(protocol: &Protocol, format: OutputFormat) -> Result<()> {
    let stats = protocol.stats();

    if format != OutputFormat::Text {
        return print_structured(format, &stats);
    }

    println!("{}", "Registry".bold());
    println!("  Agents:     {}", stats.total_agents);
    println!("  Skills:     {}", stats.total_skills);
    println!(
        "  Tasks:      {} ({} completed, {} running)",
        stats.total_tasks, stats.completed_tasks, stats.running_tasks
    );
    println!("  Avg. rep.:  {:.1}", stats.average_reputation);

    if !stats.top_agents.is_empty() {
        println!();
        println!("{}", "Top agents".bold());
        for (rank, agent) in stats.top_agents.iter().enumerate() {
            println!("  {}. {} {}", rank + 1, agent.name.green(), format!("({})", agent.reputation).dimmed());
        }
    }
    Ok(())
}

pub fn summary(protocol: &Protocol) -> Result<()> {
    print!("{}", protocol.summary());
    Ok(())
}
