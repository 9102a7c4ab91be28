//! Agent commands

use colored::*;
use eyre::{Result, bail};

use super::print_structured;
use crate::cli::{AgentsAction, OutputFormat};
use crate::protocol::{AgentQuery, ExternalAgent, Protocol};
use crate::registry::{AgentCategory, AgentLinks, AgentProfile};

pub fn run(action: AgentsAction, protocol: &Protocol, quiet: bool) -> Result<()> {
    match action {
        AgentsAction::List {
            category,
            search,
            capability,
            limit,
            format,
        } => {
            let category = match category.as_deref() {
                Some(raw) => match AgentCategory::parse(raw) {
                    Some(c) => Some(c),
                    None => bail!("Unknown category '{}'", raw),
                },
                None => None,
            };
            let query = AgentQuery {
                category,
                search,
                capability,
                limit,
            };
            list_agents(protocol, &query, OutputFormat::resolve(format))
        }
        AgentsAction::Show { id, format } => show_agent(protocol, &id, OutputFormat::resolve(format)),
        AgentsAction::Register {
            name,
            description,
            category,
            capabilities,
            tags,
            github,
            website,
        } => {
            let Some(category) = AgentCategory::parse(&category) else {
                bail!("Unknown category '{}'", category);
            };
            let id = protocol.register_external_agent(ExternalAgent {
                name: name.clone(),
                description,
                category,
                capabilities,
                tags,
                links: AgentLinks {
                    github,
                    website,
                    twitter: None,
                },
                ..Default::default()
            })?;
            if quiet {
                println!("{}", id);
            } else {
                println!("{} Registered agent {} ({})", "✓".green(), name.bold(), id);
            }
            Ok(())
        }
    }
}

fn list_agents(protocol: &Protocol, query: &AgentQuery, format: OutputFormat) -> Result<()> {
    let agents = protocol.list_agents(query);

    if format != OutputFormat::Text {
        return print_structured(format, &agents);
    }

    if agents.is_empty() {
        println!("No agents found.");
        return Ok(());
    }

    println!("{}", "Agents:".bold());
    for agent in &agents {
        let marker = if agent.is_external { "○".dimmed() } else { "●".green() };
        println!(
            "  {} {} {} {}",
            marker,
            agent.name.bold(),
            format!("[{}]", agent.category).cyan(),
            format!("rep {} | {} tasks", agent.reputation, agent.tasks_completed).dimmed()
        );
        println!("      {} {}", agent.id.dimmed(), agent.description);
    }
    println!();
    println!("Total: {} agent(s)", agents.len());
    Ok(())
}

fn show_agent(protocol: &Protocol, id: &str, format: OutputFormat) -> Result<()> {
    let agent = protocol.agent(id)?;

    if format != OutputFormat::Text {
        return print_structured(format, &agent);
    }

    print_agent(&agent);
    Ok(())
}

fn print_agent(agent: &AgentProfile) {
    println!("{} {}", "Agent:".bold(), agent.name.green().bold());
    println!("{} {}", "Id:".bold(), agent.id);
    println!("{} {}", "Description:".bold(), agent.description);
    println!("{} {}", "Version:".bold(), agent.version);
    println!("{} {}", "Category:".bold(), agent.category.to_string().cyan());
    println!("{} {}", "External:".bold(), agent.is_external);
    println!(
        "{} {}/100 | {} tasks | {:.1}% success rate",
        "Reputation:".bold(),
        agent.reputation,
        agent.tasks_completed,
        agent.success_rate
    );
    if let Some(key) = &agent.public_key {
        println!("{} {}", "Public key:".bold(), key);
    }

    let links = [
        ("website", &agent.links.website),
        ("github", &agent.links.github),
        ("twitter", &agent.links.twitter),
    ];
    if links.iter().any(|(_, link)| link.is_some()) {
        println!();
        println!("{}", "Links:".bold());
        for (label, link) in links {
            if let Some(link) = link {
                println!("  {}: {}", label, link);
            }
        }
    }

    if !agent.tags.is_empty() {
        let tags: Vec<&str> = agent.tags.iter().map(String::as_str).collect();
        println!("{} {}", "Tags:".bold(), tags.join(", "));
    }

    if !agent.capabilities.is_empty() {
        println!();
        println!("{}", "Capabilities:".bold());
        for capability in &agent.capabilities {
            let marker = if capability.enabled { "✓".green() } else { "✗".red() };
            println!("  {} {}", marker, capability.name);
        }
    }

    if let Some(live) = &agent.live_data {
        println!();
        println!(
            "{} score {} (crawled {})",
            "Live data:".bold(),
            live.live_score,
            live.crawled_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(github) = &live.github {
            println!(
                "  github: {} stars, {} forks, {} commits in 30d, last push {}",
                github.stars,
                github.forks,
                github.commits_30d,
                github.last_push.format("%Y-%m-%d")
            );
        }
        if let Some(market) = &live.market {
            println!(
                "  market: {} ${} ({:+.1}% 24h, ${:.0} volume)",
                market.symbol, market.price_usd, market.change_24h, market.volume_24h
            );
        }
    }
}
