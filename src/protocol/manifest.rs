//! Machine-readable export and the SKILL.md-style manifest rendered from it

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::registry::Capability;
use crate::skill::listing::SkillListing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub name: String,
    pub version: String,
}

/// Subset of the local profile exposed to outside tooling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAgent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    pub capabilities: Vec<Capability>,
    pub reputation: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedStats {
    pub total_agents: usize,
    pub total_skills: usize,
    pub total_tasks: usize,
    pub average_reputation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolExport {
    pub protocol: ProtocolInfo,
    pub agent: ExportedAgent,
    pub skills: Vec<SkillListing>,
    pub stats: ExportedStats,
}

#[derive(Serialize)]
struct Frontmatter<'a> {
    name: String,
    description: &'a str,
    version: &'a str,
    protocol: String,
    tags: Vec<String>,
}

/// Render the export as a SKILL.md document with YAML frontmatter
pub fn render_manifest(export: &ProtocolExport) -> Result<String> {
    let frontmatter = Frontmatter {
        name: crate::skill::listing::slugify(&export.agent.name),
        description: &export.agent.description,
        version: &export.agent.version,
        protocol: format!("{}/{}", export.protocol.name, export.protocol.version),
        tags: export
            .skills
            .iter()
            .map(|s| s.category.to_string())
            .fold(Vec::new(), |mut tags, tag| {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
                tags
            }),
    };
    let yaml = serde_yaml::to_string(&frontmatter).context("Failed to render manifest frontmatter")?;

    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n\n");

    out.push_str(&format!("# {}\n\n", export.agent.name));
    out.push_str(&format!("{}\n\n", export.agent.description));

    out.push_str("## USE WHEN\n\n");
    if export.skills.is_empty() {
        out.push_str("- No skills are registered yet\n");
    }
    for skill in &export.skills {
        out.push_str(&format!("- {}\n", skill.description));
    }

    out.push_str("\n## SKILLS\n");
    for skill in &export.skills {
        out.push_str(&format!("\n### {} (`{}`)\n\n", skill.name, skill.slug));
        out.push_str(&format!("{} | category: {}", skill.description, skill.category));
        if let Some(price) = skill.price {
            out.push_str(&format!(" | price: {}", price));
        }
        out.push('\n');

        if skill.parameters.is_empty() {
            out.push_str("\nNo parameters.\n");
            continue;
        }
        out.push('\n');
        for param in &skill.parameters {
            let requirement = if param.required { "required" } else { "optional" };
            out.push_str(&format!(
                "- `{}` ({}, {}): {}",
                param.name, param.param_type, requirement, param.description
            ));
            if let Some(default) = &param.default {
                out.push_str(&format!(" [default: {}]", default));
            }
            out.push('\n');
        }
    }

    out.push_str("\n## REGISTRY\n\n");
    out.push_str(&format!("- Agent id: `{}`\n", export.agent.id));
    out.push_str(&format!("- Reputation: {}/100\n", export.agent.reputation));
    out.push_str(&format!(
        "- Agents: {} | Skills: {} | Tasks: {}\n",
        export.stats.total_agents, export.stats.total_skills, export.stats.total_tasks
    ));
    out.push_str(&format!(
        "- Average reputation: {:.1}\n",
        export.stats.average_reputation
    ));

    Ok(out)
}
