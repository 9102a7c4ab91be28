//! GitHub repository statistics

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use eyre::{Context, Result};
use lazy_regex::regex_captures;
use std::time::Duration as StdDuration;

use super::SourceControlFetcher;
use crate::config::CrawlerConfig;
use crate::http;
use crate::registry::SourceControlMetrics;

/// Split a repository URL or `owner/name` shorthand into its parts
pub fn parse_repo_ref(repo: &str) -> Option<(String, String)> {
    let repo = repo.trim();
    let (owner, name) = if let Some((_, owner, name)) =
        regex_captures!(r"^(?:https?://)?(?:www\.)?github\.com/([^/\s]+)/([^/\s#?]+)", repo)
    {
        (owner, name)
    } else if let Some((_, owner, name)) = regex_captures!(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$", repo) {
        (owner, name)
    } else {
        return None;
    };

    let name = name.trim_end_matches(".git");
    if name.is_empty() {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

pub struct GithubFetcher {
    api_base: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl GithubFetcher {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            api_base: config.github_api.trim_end_matches('/').to_string(),
            token: config.resolved_github_token(),
            agent: http::agent(StdDuration::from_secs(config.timeout_secs)),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        match &self.token {
            Some(token) => vec![("Authorization", format!("Bearer {}", token))],
            None => Vec::new(),
        }
    }

    /// Commits in the trailing 30 days, counted from a single page of up to 100
    fn commits_30d(&self, repo_url: &str) -> u32 {
        let since = (Utc::now() - Duration::days(30)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = format!("{}/commits?since={}&per_page=100", repo_url, since);
        match http::get_json(&self.agent, &url, &self.headers()) {
            Ok(commits) => commits.as_array().map(|c| c.len() as u32).unwrap_or(0),
            Err(e) => {
                log::debug!("Commit count unavailable for {}: {:#}", repo_url, e);
                0
            }
        }
    }

    fn latest_release(&self, repo_url: &str) -> Option<String> {
        let url = format!("{}/releases/latest", repo_url);
        match http::get_json(&self.agent, &url, &self.headers()) {
            Ok(release) => release["tag_name"].as_str().map(|s| s.to_string()),
            Err(e) => {
                log::debug!("No latest release for {}: {:#}", repo_url, e);
                None
            }
        }
    }
}

impl SourceControlFetcher for GithubFetcher {
    fn fetch(&self, repo: &str) -> Result<SourceControlMetrics> {
        let (owner, name) = parse_repo_ref(repo).ok_or_else(|| eyre::eyre!("Not a GitHub repository: {}", repo))?;
        let repo_url = format!("{}/repos/{}/{}", self.api_base, owner, name);

        let info = http::get_json(&self.agent, &repo_url, &self.headers())
            .with_context(|| format!("Failed to fetch {}/{}", owner, name))?;

        let last_push = info["pushed_at"]
            .as_str()
            .ok_or_else(|| eyre::eyre!("No pushed_at for {}/{}", owner, name))
            .and_then(|s| DateTime::parse_from_rfc3339(s).context("Invalid pushed_at timestamp"))?
            .with_timezone(&Utc);

        Ok(SourceControlMetrics {
            stars: info["stargazers_count"].as_u64().unwrap_or(0),
            forks: info["forks_count"].as_u64().unwrap_or(0),
            open_issues: info["open_issues_count"].as_u64().unwrap_or(0),
            commits_30d: self.commits_30d(&repo_url),
            last_push,
            latest_release: self.latest_release(&repo_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert_eq!(
            parse_repo_ref("https://github.com/elizaOS/eliza"),
            Some(("elizaOS".to_string(), "eliza".to_string()))
        );
        assert_eq!(
            parse_repo_ref("https://github.com/sendaifun/solana-agent-kit.git"),
            Some(("sendaifun".to_string(), "solana-agent-kit".to_string()))
        );
        assert_eq!(
            parse_repo_ref("github.com/0xPlaygrounds/rig/tree/main"),
            Some(("0xPlaygrounds".to_string(), "rig".to_string()))
        );
    }

    #[test]
    fn test_parse_shorthand() {
        assert_eq!(
            parse_repo_ref("goat-sdk/goat"),
            Some(("goat-sdk".to_string(), "goat".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        assert_eq!(parse_repo_ref("https://gitlab.com/owner/repo"), None);
        assert_eq!(parse_repo_ref("not a repo"), None);
        assert_eq!(parse_repo_ref(""), None);
    }

    #[test]
    fn test_api_base_trimmed() {
        let config = CrawlerConfig {
            github_api: "https://ghe.example.com/api/v3/".to_string(),
            github_token: Some("t".to_string()),
            ..Default::default()
        };
        let fetcher = GithubFetcher::new(&config);
        assert_eq!(fetcher.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(fetcher.headers(), vec![("Authorization", "Bearer t".to_string())]);
    }
}
