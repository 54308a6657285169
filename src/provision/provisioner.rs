use crate::config::{AppConfig, ProvisionerConfig};
use crate::error::{AppError, AppResult};
use crate::provider::ProviderError;
use crate::provision::credentials::{validate_environment_credentials, CredentialEnvironment};
use crate::provision::kms::{alias_key_id, bare_alias, create_alias_command, KeyManagementService};
use crate::provision::secret::{generate_secret, EncryptedBlob, Secret};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const REQUIRED_PERMISSIONS: &str = "'kms:ListAliases', 'kms:Encrypt', 'kms:CreateKey' and 'kms:CreateAlias'";

/// Check that `alias` exists among the aliases of `region`.
#[instrument(skip(kms))]
pub async fn resolve_key_alias(
    kms: &dyn KeyManagementService,
    alias: &str,
    region: &str,
) -> AppResult<()> {
    let alias = bare_alias(alias);
    if alias.is_empty() {
        return Err(AppError::configuration("A KMS key alias must be provided."));
    }

    let aliases = kms.list_aliases(region).await.map_err(|e| {
        warn!("Listing KMS aliases failed: {}", e);
        match e {
            ProviderError::AccessDenied(detail) => AppError::authorization(format!(
                "Access denied while trying to list KMS aliases in region '{region}'. Ensure your \
                 IAM identity has the necessary permissions, including {REQUIRED_PERMISSIONS}. ({detail})"
            )),
            ProviderError::MissingCredentials(detail) => AppError::authorization(format!(
                "AWS credentials not found while listing KMS aliases: {detail}"
            )),
            other => AppError::service(format!(
                "An error occurred while validating the KMS key alias: {other}"
            )),
        }
    })?;

    if aliases.is_empty() {
        return Err(AppError::configuration(format!(
            "No KMS aliases found in region '{region}'. Please create an alias using the AWS CLI:\n{}",
            create_alias_command(alias, region)
        )));
    }

    let wanted = alias_key_id(alias);
    if !aliases.iter().any(|name| *name == wanted) {
        return Err(AppError::configuration(format!(
            "The specified KMS key alias '{alias}' was not found in region '{region}'. \
             Please ensure the alias exists in AWS KMS."
        )));
    }

    debug!(alias, region, "KMS alias resolved");
    Ok(())
}

/// Encrypts freshly generated secrets through a key-management service.
///
/// Region, rotation alias and the credential snapshot are fixed at
/// construction; nothing is read from the process environment afterwards.
pub struct SecretProvisioner {
    kms: Arc<dyn KeyManagementService>,
    region: String,
    settings: ProvisionerConfig,
    credentials: CredentialEnvironment,
}

impl std::fmt::Debug for SecretProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretProvisioner")
            .field("region", &self.region)
            .field("rotation_alias", &self.settings.rotation_alias)
            .finish_non_exhaustive()
    }
}

impl SecretProvisioner {
    pub fn new(
        kms: Arc<dyn KeyManagementService>,
        config: &AppConfig,
        credentials: CredentialEnvironment,
    ) -> Self {
        Self {
            kms,
            region: config.aws.region.clone(),
            settings: config.provisioner.clone(),
            credentials,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn validate_credentials(&self) -> AppResult<()> {
        validate_environment_credentials(&self.credentials)
    }

    pub async fn resolve_key_alias(&self, alias: &str) -> AppResult<()> {
        resolve_key_alias(self.kms.as_ref(), alias, &self.region).await
    }

    /// Encrypt `secret` under `alias` after checking credentials and alias.
    ///
    /// The alias can disappear between the listing and the encrypt call.
    /// That case surfaces as a configuration error; it is not retried.
    #[instrument(skip(self, secret), fields(region = %self.region))]
    pub async fn encrypt_secret(&self, secret: &Secret, alias: &str) -> AppResult<EncryptedBlob> {
        self.validate_credentials()?;
        self.resolve_key_alias(alias).await?;

        let alias = bare_alias(alias);
        let region = self.region.as_str();
        let ciphertext = self
            .kms
            .encrypt(region, &alias_key_id(alias), secret.as_bytes())
            .await
            .map_err(|e| {
                warn!("KMS encrypt failed: {}", e);
                match e {
                    ProviderError::NotFound(_) => AppError::configuration(format!(
                        "The specified KMS key alias '{alias}' was not found in region '{region}'. \
                         Please ensure the alias exists in AWS KMS. You can create it using the AWS CLI:\n{}",
                        create_alias_command(alias, region)
                    )),
                    ProviderError::MissingCredentials(_) => AppError::authorization(
                        "AWS credentials not found. Configure them before encrypting secrets.",
                    ),
                    ProviderError::AccessDenied(detail) => AppError::authorization(format!(
                        "Access denied while encrypting with KMS alias '{alias}'. Ensure your IAM \
                         identity is allowed 'kms:Encrypt' on the key. ({detail})"
                    )),
                    ProviderError::Other(detail) => {
                        AppError::service(format!("KMS encrypt failed: {detail}"))
                    }
                }
            })?;

        info!(alias, bytes = ciphertext.len(), "Secret encrypted");
        Ok(EncryptedBlob::new(ciphertext))
    }

    /// Generate a new secret and encrypt it under the configured rotation alias.
    pub async fn rotate_secret(&self) -> AppResult<EncryptedBlob> {
        let alias = self.settings.rotation_alias()?;
        let secret = generate_secret();
        let blob = self.encrypt_secret(&secret, alias).await?;
        info!(alias, "Secret rotated and stored securely");
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Echoes the plaintext back reversed, aliases fixed at construction.
    struct StaticKms {
        aliases: Result<Vec<String>, ProviderError>,
    }

    #[async_trait]
    impl KeyManagementService for StaticKms {
        async fn list_aliases(&self, _region: &str) -> Result<Vec<String>, ProviderError> {
            self.aliases.clone()
        }

        async fn encrypt(
            &self,
            _region: &str,
            _key_id: &str,
            plaintext: &[u8],
        ) -> Result<Vec<u8>, ProviderError> {
            Ok(plaintext.iter().rev().copied().collect())
        }
    }

    fn kms(aliases: Result<Vec<&str>, ProviderError>) -> StaticKms {
        StaticKms {
            aliases: aliases.map(|a| a.into_iter().map(str::to_string).collect()),
        }
    }

    #[tokio::test]
    async fn test_resolve_existing_alias() {
        let kms = kms(Ok(vec!["alias/aws/s3", "alias/billing"]));
        assert!(resolve_key_alias(&kms, "billing", "eu-central-1").await.is_ok());
        assert!(resolve_key_alias(&kms, "alias/billing", "eu-central-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_empty_listing() {
        let kms = kms(Ok(vec![]));
        let err = resolve_key_alias(&kms, "billing", "eu-west-1").await.unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains(
            "aws kms create-alias --alias-name alias/billing --target-key-id <key-id> --region eu-west-1"
        ));
    }

    #[tokio::test]
    async fn test_resolve_error_mapping() {
        let denied = kms(Err(ProviderError::AccessDenied("nope".into())));
        let err = resolve_key_alias(&denied, "billing", "eu-west-1").await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
        assert!(err.to_string().contains("kms:ListAliases"));

        let anonymous = kms(Err(ProviderError::MissingCredentials("no provider".into())));
        let err = resolve_key_alias(&anonymous, "billing", "eu-west-1").await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
        assert!(err.to_string().contains("no provider"));

        let broken = kms(Err(ProviderError::Other("ThrottlingException: slow down".into())));
        let err = resolve_key_alias(&broken, "billing", "eu-west-1").await.unwrap_err();
        assert!(matches!(err, AppError::Service(_)));
        assert!(err.to_string().contains("ThrottlingException: slow down"));
    }

    #[tokio::test]
    async fn test_empty_alias_is_rejected() {
        let kms = kms(Ok(vec!["alias/billing"]));
        let err = resolve_key_alias(&kms, "  ", "eu-west-1").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
