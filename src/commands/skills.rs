//! Skill commands

use colored::*;
use eyre::{Result, bail, eyre};

use super::print_structured;
use crate::cli::{OutputFormat, SkillsAction};
use crate::protocol::Protocol;
use crate::registry::{AgentSkill, ParamBag, ParamValue, SkillCategory};
use crate::skill::listing::SkillListing;

pub fn run(action: SkillsAction, protocol: &Protocol) -> Result<()> {
    match action {
        SkillsAction::List { category, format } => {
            let skills = match category.as_deref() {
                Some(raw) => {
                    let Some(category) = SkillCategory::parse(raw) else {
                        bail!("Unknown skill category '{}'", raw);
                    };
                    protocol.skills_in_category(category)
                }
                None => protocol.skills(),
            };
            print_skills(&skills, OutputFormat::resolve(format))
        }
        SkillsAction::Search { query, format } => {
            let found = protocol.skill_manager().search_skills(&query);
            print_skills(&found, OutputFormat::resolve(format))
        }
        SkillsAction::Run { skill, params } => run_skill(protocol, &skill, &params),
    }
}

fn print_skills(skills: &[AgentSkill], format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Text {
        let listings: Vec<SkillListing> = skills.iter().map(SkillListing::from).collect();
        return print_structured(format, &listings);
    }

    if skills.is_empty() {
        println!("No skills found.");
        return Ok(());
    }

    println!("{}", "Skills:".bold());
    for skill in skills {
        println!(
            "  {} {} {} {}",
            "●".green(),
            skill.name.bold(),
            format!("[{}]", skill.category).cyan(),
            format!("used {}x", skill.usage_count).dimmed()
        );
        println!("      {}", skill.description);
        for param in &skill.parameters {
            let requirement = if param.required { "required".yellow() } else { "optional".dimmed() };
            println!("      - {} ({}, {})", param.name, param.param_type, requirement);
        }
    }
    println!();
    println!("Total: {} skill(s)", skills.len());
    Ok(())
}

fn run_skill(protocol: &Protocol, name: &str, raw_params: &[String]) -> Result<()> {
    let manager = protocol.skill_manager();
    let Some(skill) = manager.resolve(name) else {
        bail!("Skill not found: {}\nRun 'agentreg skills list' to see available skills.", name);
    };

    let params = parse_params(&skill, raw_params)?;
    let output = manager.execute_skill(&skill.id, params)?;
    println!("{}", output);
    Ok(())
}

/// Turn `key=value` arguments into a parameter bag using the declared types.
/// Undeclared keys are passed through as strings.
pub fn parse_params(skill: &AgentSkill, raw_params: &[String]) -> Result<ParamBag> {
    let mut params = ParamBag::new();
    for raw in raw_params {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| eyre!("Parameter '{}' is not in key=value form", raw))?;

        let parsed = match skill.parameters.iter().find(|p| p.name == key) {
            Some(declared) => ParamValue::parse_as(value, declared.param_type).ok_or_else(|| {
                eyre!(
                    "Parameter '{}' of {} expects a {}, got '{}'",
                    key,
                    skill.name,
                    declared.param_type,
                    value
                )
            })?,
            None => ParamValue::String(value.to_string()),
        };
        params.insert(key.to_string(), parsed);
    }
    Ok(params)
}
