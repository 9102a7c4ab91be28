//! Export view of skills for outside tooling
//!
//! The listing never exposes the handler key.

use lazy_regex::regex_replace_all;
use serde::{Deserialize, Serialize};

use crate::registry::{AgentSkill, ParamType, ParamValue, SkillCategory};

/// Lowercase, with every run of non-alphanumerics collapsed to a single dash
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    regex_replace_all!(r"[^a-z0-9]+", &lower, "-")
        .trim_matches('-')
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterShape {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillListing {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: SkillCategory,
    pub parameters: Vec<ParameterShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub usage_count: u64,
    pub rating: f64,
}

impl From<&AgentSkill> for SkillListing {
    fn from(skill: &AgentSkill) -> Self {
        Self {
            id: skill.id.clone(),
            name: skill.name.clone(),
            slug: slugify(&skill.name),
            description: skill.description.clone(),
            category: skill.category,
            parameters: skill
                .parameters
                .iter()
                .map(|p| ParameterShape {
                    name: p.name.clone(),
                    param_type: p.param_type,
                    description: p.description.clone(),
                    required: p.required,
                    default: p.default.clone(),
                })
                .collect(),
            price: skill.price,
            usage_count: skill.usage_count,
            rating: skill.rating,
        }
    }
}
