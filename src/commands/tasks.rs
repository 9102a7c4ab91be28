//! Task commands

use colored::*;
use eyre::{Result, bail, eyre};

use super::print_structured;
use crate::cli::{OutputFormat, TasksAction};
use crate::protocol::Protocol;
use crate::registry::TaskStatus;

pub fn run(action: TasksAction, protocol: &Protocol, quiet: bool) -> Result<()> {
    match action {
        TasksAction::List { agent, limit, format } => {
            list_tasks(protocol, agent.as_deref(), limit, OutputFormat::resolve(format))
        }
        TasksAction::Record {
            description,
            skill,
            failed,
        } => {
            let Some(task_id) = protocol.record_task(&description, &skill, !failed) else {
                bail!("Task not recorded: no skill named '{}'", skill);
            };
            if quiet {
                println!("{}", task_id);
            } else {
                let outcome = if failed { "failed".red() } else { "completed".green() };
                println!("{} Recorded task {} ({})", "✓".green(), task_id, outcome);
            }
            Ok(())
        }
    }
}

fn list_tasks(protocol: &Protocol, agent: Option<&str>, limit: usize, format: OutputFormat) -> Result<()> {
    let agent_id = match agent {
        Some(id) => protocol.agent(id)?.id,
        None => protocol
            .local_agent_id()
            .map(str::to_string)
            .ok_or_else(|| eyre!("No local agent registered"))?,
    };

    let tasks = protocol.task_history(&agent_id, Some(limit));

    if format != OutputFormat::Text {
        return print_structured(format, &tasks);
    }

    if tasks.is_empty() {
        println!("No tasks recorded for {}.", agent_id);
        return Ok(());
    }

    println!("{} {}", "Tasks for".bold(), agent_id.bold());
    for task in &tasks {
        let status = match task.status {
            TaskStatus::Completed => task.status.to_string().green(),
            TaskStatus::Failed => task.status.to_string().red(),
            TaskStatus::Running => task.status.to_string().yellow(),
            TaskStatus::Pending => task.status.to_string().dimmed(),
        };
        let skill = protocol
            .store()
            .get_skill(&task.skill_id)
            .map(|s| s.name)
            .unwrap_or_else(|| task.skill_id.clone());
        println!(
            "  {} [{}] {} {}",
            task.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            status,
            task.description,
            format!("({})", skill).dimmed()
        );
        if let Some(error) = &task.error {
            println!("      {}", error.red());
        }
    }
    Ok(())
}
