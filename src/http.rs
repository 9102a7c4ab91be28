//! Shared HTTP plumbing for the external collaborators

use eyre::{Context, Result};
use std::time::Duration;

/// Build an agent whose requests give up after `timeout`
pub fn agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// GET a URL and parse the body as JSON
pub fn get_json(agent: &ureq::Agent, url: &str, headers: &[(&str, String)]) -> Result<serde_json::Value> {
    let mut request = agent.get(url).header("Accept", "application/json");
    for (name, value) in headers {
        request = request.header(*name, value);
    }

    let mut response = request.call().with_context(|| format!("GET {} failed", url))?;
    let body = response
        .body_mut()
        .read_to_string()
        .context("Failed to read response")?;
    serde_json::from_str(&body).with_context(|| format!("Failed to parse response from {}", url))
}

/// POST a JSON body and parse the response as JSON
pub fn post_json(agent: &ureq::Agent, url: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
    let request_body = serde_json::to_string(payload).context("Failed to serialize request")?;

    let mut response = agent
        .post(url)
        .header("Content-Type", "application/json")
        .send(request_body.as_bytes())
        .with_context(|| format!("POST {} failed", url))?;
    let body = response
        .body_mut()
        .read_to_string()
        .context("Failed to read response")?;
    serde_json::from_str(&body).with_context(|| format!("Failed to parse response from {}", url))
}
