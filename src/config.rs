use crate::error::{AppError, AppResult};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Region used when neither `AWS_DEFAULT_REGION` nor `aws.region` is set.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Environment variable that selects the service region.
pub const REGION_ENV: &str = "AWS_DEFAULT_REGION";

/// AWS connection settings
#[derive(Debug, Deserialize, Clone)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint override for KMS (localstack and similar)
    #[serde(default)]
    pub kms_endpoint: Option<String>,
    /// Endpoint override for Secrets Manager
    #[serde(default)]
    pub secrets_endpoint: Option<String>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            kms_endpoint: None,
            secrets_endpoint: None,
        }
    }
}

/// Secret provisioning settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProvisionerConfig {
    /// Alias that `rotate_secret` encrypts under. There is deliberately
    /// no fallback value.
    #[serde(default)]
    pub rotation_alias: Option<String>,
}

impl ProvisionerConfig {
    /// The configured rotation alias, or a configuration error telling the
    /// operator how to set one.
    pub fn rotation_alias(&self) -> AppResult<&str> {
        match self.rotation_alias.as_deref().map(str::trim) {
            Some(alias) if !alias.is_empty() => Ok(alias),
            _ => Err(AppError::configuration(
                "No rotation key alias configured. Set provisioner.rotation_alias in \
                 config/default.toml or the CREDFORGE_PROVISIONER__ROTATION_ALIAS env var.",
            )),
        }
    }
}

/// Token issuance settings
#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    #[serde(default = "default_validity_minutes")]
    pub validity_minutes: u32,
    #[serde(default = "default_refresh_validity_minutes")]
    pub refresh_validity_minutes: u32,
    /// Secrets Manager entry holding the JSON signing key pair
    #[serde(default = "default_signing_secret_name")]
    pub signing_secret_name: String,
}

fn default_validity_minutes() -> u32 {
    15
}

fn default_refresh_validity_minutes() -> u32 {
    7 * 24 * 60
}

fn default_signing_secret_name() -> String {
    "JWT_SECRET".to_string()
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            validity_minutes: default_validity_minutes(),
            refresh_validity_minutes: default_refresh_validity_minutes(),
            signing_secret_name: default_signing_secret_name(),
        }
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub provisioner: ProvisionerConfig,
    #[serde(default)]
    pub token: TokenConfig,
}

impl AppConfig {
    /// Load configuration from files and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading environment variables from `vars`
    /// instead of the process environment when given.
    pub fn load_from(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let region = match &vars {
            Some(vars) => vars.get(REGION_ENV).cloned(),
            None => std::env::var(REGION_ENV).ok(),
        }
        .filter(|r| !r.trim().is_empty());

        let config = Config::builder()
            .set_default("aws.region", DEFAULT_REGION)?
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: CREDFORGE_)
            // e.g., CREDFORGE_PROVISIONER__ROTATION_ALIAS, CREDFORGE_TOKEN__VALIDITY_MINUTES
            .add_source(
                Environment::with_prefix("CREDFORGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            // The standard AWS region variable wins over everything else
            .set_override_option("aws.region", region)?
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::load_from(Some(HashMap::new())).unwrap();
        assert_eq!(config.aws.region, DEFAULT_REGION);
        assert_eq!(config.token.validity_minutes, 15);
        assert_eq!(config.token.refresh_validity_minutes, 10_080);
        assert_eq!(config.token.signing_secret_name, "JWT_SECRET");
        assert!(config.provisioner.rotation_alias().is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::load_from(Some(vars(&[
            ("AWS_DEFAULT_REGION", "us-west-2"),
            ("CREDFORGE_PROVISIONER__ROTATION_ALIAS", "app-secrets"),
            ("CREDFORGE_TOKEN__VALIDITY_MINUTES", "5"),
        ])))
        .unwrap();

        assert_eq!(config.aws.region, "us-west-2");
        assert_eq!(config.provisioner.rotation_alias().unwrap(), "app-secrets");
        assert_eq!(config.token.validity_minutes, 5);
    }

    #[test]
    fn test_blank_rotation_alias_is_rejected() {
        let provisioner = ProvisionerConfig {
            rotation_alias: Some("   ".to_string()),
        };
        let err = provisioner.rotation_alias().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("CREDFORGE_PROVISIONER__ROTATION_ALIAS"));
    }
}
