//! Secrets management for Forge
//!
//! API keys are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/forge/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (OPENAI_API_KEY, GROQ_API_KEY)
//! 2. Secrets file (~/.config/forge/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Provider;
use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// OpenAI credentials
    pub openai: ProviderSecrets,
    /// Groq credentials
    pub groq: ProviderSecrets,
}

/// Credentials for one provider
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderSecrets {
    /// API key sent as a bearer token
    pub api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        for key in [&mut secrets.openai.api_key, &mut secrets.groq.api_key]
            .into_iter()
            .flatten()
        {
            *key = key.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/forge/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("forge").join("secrets.toml"))
    }

    /// Get the API key for a provider with environment variable override
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        if let Ok(key) = std::env::var(provider.api_key_env()) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                debug!(provider = %provider, "Using API key from environment");
                return Some(key);
            }
        }

        self.file_api_key(provider)
    }

    /// API key from the secrets file only
    pub fn file_api_key(&self, provider: Provider) -> Option<String> {
        let stored = match provider {
            Provider::OpenAi => &self.openai.api_key,
            Provider::Groq => &self.groq.api_key,
        };

        stored.as_ref().filter(|k| !k.is_empty()).cloned()
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# Forge Secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[openai]
# Used when set; takes priority over Groq
api_key = ""

[groq]
api_key = ""
"#;

        std::fs::write(&path, template).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms).map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your API keys");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_secrets() {
        let secrets = Secrets::default();
        assert!(secrets.openai.api_key.is_none());
        assert!(secrets.groq.api_key.is_none());
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[groq]
api_key = "gsk_xxxxxxxx"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.file_api_key(Provider::Groq), Some("gsk_xxxxxxxx".to_string()));
        assert_eq!(secrets.file_api_key(Provider::OpenAi), None);
    }

    #[test]
    fn test_empty_key_ignored() {
        let secrets = Secrets {
            openai: ProviderSecrets {
                api_key: Some(String::new()),
            },
            ..Default::default()
        };
        assert_eq!(secrets.file_api_key(Provider::OpenAi), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[openai]\napi_key = \"sk-test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted_and_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[openai]\napi_key = \"  sk-test  \"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.openai.api_key, Some("sk-test".to_string()));
    }
}
