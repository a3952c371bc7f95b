//! CLI configuration from environment.

use anyhow::{Context, Result};
use mission_core::PipelineRules;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file overriding the default stage envelopes.
    pub rules_path: Option<PathBuf>,
    pub author: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            rules_path: env::var_os("MISSION_RULES_PATH").map(PathBuf::from),
            author: env::var("MISSION_AUTHOR")
                .unwrap_or_else(|_| mission_core::pipeline::DEFAULT_AUTHOR.to_string()),
            log_json: env::var("MISSION_LOG_JSON")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn load_rules(&self) -> Result<PipelineRules> {
        let Some(path) = &self.rules_path else {
            return Ok(PipelineRules::default());
        };
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading rules file {}", path.display()))?;
        let rules = PipelineRules::from_json(&bytes)
            .with_context(|| format!("parsing rules file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded pipeline rules");
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rules_path_uses_defaults() {
        let config = Config {
            rules_path: None,
            author: "ops".to_string(),
            log_json: false,
        };
        assert_eq!(config.load_rules().unwrap(), PipelineRules::default());
    }

    #[test]
    fn unreadable_rules_file_is_reported() {
        let config = Config {
            rules_path: Some(PathBuf::from("/nonexistent/mission-rules.json")),
            author: "ops".to_string(),
            log_json: false,
        };
        let err = config.load_rules().unwrap_err();
        assert!(err.to_string().contains("mission-rules.json"), "{err}");
    }
}
