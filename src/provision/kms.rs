//! Narrow view of a key-management service.

use crate::provider::ProviderError;
use async_trait::async_trait;

const ALIAS_PREFIX: &str = "alias/";

/// The two key-management operations provisioning relies on.
#[async_trait]
pub trait KeyManagementService: Send + Sync {
    /// Full names (`alias/...`) of every alias visible in `region`.
    async fn list_aliases(&self, region: &str) -> Result<Vec<String>, ProviderError>;

    /// Encrypt `plaintext` under `key_id` and return the ciphertext as is.
    async fn encrypt(
        &self,
        region: &str,
        key_id: &str,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;
}

/// Strip an optional `alias/` prefix so callers can pass either form.
pub fn bare_alias(alias: &str) -> &str {
    alias.trim().strip_prefix(ALIAS_PREFIX).unwrap_or(alias.trim())
}

/// Service-side name of an alias: `alias/<name>`.
pub fn alias_key_id(alias: &str) -> String {
    format!("{}{}", ALIAS_PREFIX, bare_alias(alias))
}

/// The AWS CLI command that creates `alias` in `region`.
pub fn create_alias_command(alias: &str, region: &str) -> String {
    format!(
        "aws kms create-alias --alias-name {} --target-key-id <key-id> --region {}",
        alias_key_id(alias),
        region
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_forms() {
        assert_eq!(bare_alias("billing"), "billing");
        assert_eq!(bare_alias("alias/billing"), "billing");
        assert_eq!(alias_key_id("billing"), "alias/billing");
        assert_eq!(alias_key_id(" alias/billing "), "alias/billing");
    }

    #[test]
    fn test_create_alias_command() {
        assert_eq!(
            create_alias_command("billing", "eu-central-1"),
            "aws kms create-alias --alias-name alias/billing --target-key-id <key-id> --region eu-central-1"
        );
    }
}
