//! Configuration loading
//!
//! Optional `taintriage.toml` next to the findings being triaged, plus
//! `.env` loading for API keys. CLI flags override file values; the
//! analysis core itself consumes no configuration or environment.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "taintriage.toml";

fn default_context_radius() -> u32 {
    5
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Lines of context around the source/sink pair
    pub context_radius: u32,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            context_radius: default_context_radius(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Backend name: openai, openrouter, deepinfra, ollama
    pub backend: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            backend: None,
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub analysis: AnalysisSection,
    pub llm: LlmSection,
}

impl TriageConfig {
    /// Load `taintriage.toml` from the given directory, falling back to
    /// defaults when the file is absent.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid {}: {e}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Load `KEY=value` pairs from a `.env` file in the given directory into
/// the process environment. Existing variables are not overwritten;
/// comments and blank lines are skipped.
pub fn load_dotenv(dir: &Path) {
    let path = dir.join(".env");
    let Ok(content) = std::fs::read_to_string(&path) else {
        return;
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !key.is_empty() && std::env::var_os(key).is_none() {
            std::env::set_var(key, value);
        }
    }
    debug!(path = %path.display(), "loaded .env");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = TriageConfig::load(dir.path()).unwrap();
        assert_eq!(config.analysis.context_radius, 5);
        assert_eq!(config.llm.max_tokens, 4096);
        assert!(config.llm.model.is_none());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[analysis]\ncontext_radius = 9\n\n[llm]\nbackend = \"ollama\"\nmodel = \"qwen2.5-coder:7b\"\n",
        )
        .unwrap();
        let config = TriageConfig::load(dir.path()).unwrap();
        assert_eq!(config.analysis.context_radius, 9);
        assert_eq!(config.llm.backend.as_deref(), Some("ollama"));
        assert_eq!(config.llm.max_tokens, 4096);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "analysis = 3").unwrap();
        assert!(TriageConfig::load(dir.path()).is_err());
    }

    #[test]
    fn dotenv_sets_missing_variables_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "# comment\nTAINTRIAGE_TEST_A=\"alpha\"\nTAINTRIAGE_TEST_B=beta\n",
        )
        .unwrap();
        std::env::set_var("TAINTRIAGE_TEST_B", "preset");
        load_dotenv(dir.path());
        assert_eq!(std::env::var("TAINTRIAGE_TEST_A").unwrap(), "alpha");
        assert_eq!(std::env::var("TAINTRIAGE_TEST_B").unwrap(), "preset");
        std::env::remove_var("TAINTRIAGE_TEST_A");
        std::env::remove_var("TAINTRIAGE_TEST_B");
    }
}
