use super::classify_sdk_error;
use crate::provider::ProviderError;
use crate::provision::kms::KeyManagementService;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kms::config::Region;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client;
use tracing::debug;

/// KMS client factory keyed by region.
///
/// A client is built per call from the shared SDK configuration, so one
/// instance serves any region.
#[derive(Clone)]
pub struct AwsKms {
    sdk: SdkConfig,
    endpoint: Option<String>,
}

impl std::fmt::Debug for AwsKms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsKms")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl AwsKms {
    pub fn new(sdk: &SdkConfig, endpoint: Option<String>) -> Self {
        Self {
            sdk: sdk.clone(),
            endpoint: endpoint.filter(|e| !e.trim().is_empty()),
        }
    }

    fn client(&self, region: &str) -> Client {
        let mut builder =
            aws_sdk_kms::config::Builder::from(&self.sdk).region(Region::new(region.to_string()));
        if let Some(endpoint) = self.endpoint.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }
        Client::from_conf(builder.build())
    }
}

#[async_trait]
impl KeyManagementService for AwsKms {
    async fn list_aliases(&self, region: &str) -> Result<Vec<String>, ProviderError> {
        let client = self.client(region);
        let mut aliases = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            debug!(region, ?marker, "Listing KMS aliases");
            let output = client
                .list_aliases()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(classify_sdk_error)?;

            aliases.extend(
                output
                    .aliases()
                    .iter()
                    .filter_map(|entry| entry.alias_name().map(str::to_string)),
            );

            match output.next_marker() {
                Some(next) if output.truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(aliases)
    }

    async fn encrypt(
        &self,
        region: &str,
        key_id: &str,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        debug!(region, key_id, "Calling KMS encrypt");
        let output = self
            .client(region)
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext.to_vec()))
            .send()
            .await
            .map_err(classify_sdk_error)?;

        output
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| ProviderError::Other("KMS encrypt returned no ciphertext".into()))
    }
}
