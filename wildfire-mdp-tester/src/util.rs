use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use wildfire_mdp::{PolicySpec, SwmConfig};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a `;`-separated list of comma-separated parameter vectors.
pub fn parse_candidates(s: &str) -> Result<Vec<Vec<f64>>> {
    let candidates = s
        .split(';')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(|group| {
            split_csv(group)
                .iter()
                .map(|token| {
                    token
                        .parse::<f64>()
                        .with_context(|| format!("invalid candidate parameter {token:?}"))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    if candidates.is_empty() {
        bail!("no candidate policies given");
    }
    Ok(candidates)
}

pub fn parse_policy(s: &str) -> Result<PolicySpec> {
    s.parse::<PolicySpec>()
        .with_context(|| format!("invalid policy {s:?}"))
}

/// Defaults, or the defaults overridden by a JSON file.
pub fn load_config(path: Option<&Path>) -> Result<SwmConfig> {
    let Some(path) = path else {
        return Ok(SwmConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    SwmConfig::from_json(&text).with_context(|| format!("invalid configuration {}", path.display()))
}
