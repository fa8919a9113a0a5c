//! Configuration management for Forge
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FORGE_*)
//! 3. Config file (~/.config/forge/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::review::VerdictPolicy;
use crate::secrets::Secrets;
use crate::{Error, Result};

/// Chat-completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// api.openai.com
    OpenAi,
    /// Groq's OpenAI-compatible endpoint
    Groq,
}

impl Provider {
    /// Base URL used when the config does not name one
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Model used when the config does not name one
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4",
            Provider::Groq => "llama3-70b-8192",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

/// Chat-completion settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider to use; chosen from available API keys when unset
    pub provider: Option<Provider>,

    /// Override for the provider's base URL
    pub base_url: Option<String>,

    /// Override for the provider's default model
    pub model: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            base_url: None,
            model: None,
            temperature: 0.2,
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmConfig {
    /// Resolve the provider: explicit setting first, then OpenAI if a key
    /// is available, Groq otherwise.
    pub fn provider_for(&self, secrets: &Secrets) -> Provider {
        self.provider.unwrap_or_else(|| {
            if secrets.api_key(Provider::OpenAi).is_some() {
                Provider::OpenAi
            } else {
                Provider::Groq
            }
        })
    }

    /// Effective base URL for a provider
    pub fn base_url_for(&self, provider: Provider) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string())
    }

    /// Effective model for a provider
    pub fn model_for(&self, provider: Provider) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string())
    }
}

/// Pipeline behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Revision budget for the review gate
    pub max_review_iterations: u32,

    /// Root directory artifacts are written under
    pub output_dir: PathBuf,

    /// How reviewer replies are classified
    pub verdict_policy: VerdictPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_review_iterations: 3,
            output_dir: PathBuf::from("output"),
            verdict_policy: VerdictPolicy::default(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Chat-completion configuration
    pub llm: LlmConfig,

    /// Pipeline configuration
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/forge/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("forge").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - FORGE_MODEL: Model to use
    /// - FORGE_BASE_URL: Chat-completion base URL
    /// - FORGE_OUTPUT_DIR: Artifact output directory
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("FORGE_MODEL") {
            self.llm.model = Some(model);
        }

        if let Ok(base_url) = std::env::var("FORGE_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        if let Ok(dir) = std::env::var("FORGE_OUTPUT_DIR") {
            self.pipeline.output_dir = PathBuf::from(dir);
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, model: Option<String>, output_dir: Option<PathBuf>) -> Self {
        if let Some(m) = model {
            self.llm.model = Some(m);
        }

        if let Some(dir) = output_dir {
            self.pipeline.output_dir = dir;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(model: Option<String>, output_dir: Option<PathBuf>) -> Result<Self> {
        Self::load()?
            .with_env_overrides()
            .with_cli_overrides(model, output_dir)
            .validated()
    }

    /// Reject values the pipeline cannot run with
    pub fn validated(self) -> Result<Self> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }

        if let Some(ref base_url) = self.llm.base_url {
            url::Url::parse(base_url)
                .map_err(|e| Error::Config(format!("Invalid base_url {}: {}", base_url, e)))?;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::ProviderSecrets;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.llm.model.is_none());
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.llm.timeout, Duration::from_secs(120));
        assert_eq!(config.pipeline.max_review_iterations, 3);
        assert_eq!(config.pipeline.output_dir, PathBuf::from("output"));
        assert_eq!(config.pipeline.verdict_policy, VerdictPolicy::Substring);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_cli_overrides(Some("gpt-4o".to_string()), Some(PathBuf::from("/tmp/out")));

        assert_eq!(config.llm.model, Some("gpt-4o".to_string()));
        assert_eq!(config.pipeline.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[llm]
provider = "groq"
model = "llama3-8b-8192"
timeout = "30s"

[pipeline]
max_review_iterations = 5
verdict_policy = "token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.provider, Some(Provider::Groq));
        assert_eq!(config.llm.model, Some("llama3-8b-8192".to_string()));
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert_eq!(config.pipeline.max_review_iterations, 5);
        assert_eq!(config.pipeline.verdict_policy, VerdictPolicy::Token);
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[pipeline]
output_dir = "generated"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // llm section should use defaults
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.pipeline.output_dir, PathBuf::from("generated"));
        assert_eq!(config.pipeline.max_review_iterations, 3);
    }

    #[test]
    fn test_provider_defaults() {
        let llm = LlmConfig::default();
        assert_eq!(llm.base_url_for(Provider::Groq), "https://api.groq.com/openai/v1");
        assert_eq!(llm.model_for(Provider::Groq), "llama3-70b-8192");
        assert_eq!(llm.model_for(Provider::OpenAi), "gpt-4");
    }

    #[test]
    fn test_explicit_provider_wins() {
        let llm = LlmConfig {
            provider: Some(Provider::Groq),
            ..Default::default()
        };
        let secrets = Secrets {
            openai: ProviderSecrets {
                api_key: Some("sk-test".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(llm.provider_for(&secrets), Provider::Groq);
    }

    #[test]
    fn test_model_override() {
        let llm = LlmConfig {
            model: Some("custom".to_string()),
            base_url: Some("http://localhost:8080/v1".to_string()),
            ..Default::default()
        };
        assert_eq!(llm.model_for(Provider::OpenAi), "custom");
        assert_eq!(llm.base_url_for(Provider::OpenAi), "http://localhost:8080/v1");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validated().is_err());

        let mut config = Config::default();
        config.llm.base_url = Some("not a url".to_string());
        assert!(config.validated().is_err());

        assert!(Config::default().validated().is_ok());
    }
}
