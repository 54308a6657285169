use super::classify_sdk_error;
use crate::provider::ProviderError;
use crate::token::keys::SecretStore;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client;
use tracing::debug;

/// Secrets Manager lookup for signing key material.
#[derive(Clone, Debug)]
pub struct AwsSecretStore {
    client: Client,
}

impl AwsSecretStore {
    pub fn new(sdk: &SdkConfig, endpoint: Option<&str>) -> Self {
        let mut builder = aws_sdk_secretsmanager::config::Builder::from(sdk);
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            builder = builder.endpoint_url(endpoint);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn secret_string(&self, name: &str) -> Result<Option<String>, ProviderError> {
        debug!("Attempting to retrieve secret: {}", name);
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(output.secret_string().map(str::to_string))
    }
}
