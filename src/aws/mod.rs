//! AWS-backed implementations of the remote capabilities.

pub mod kms;
pub mod secrets_manager;

pub use kms::AwsKms;
pub use secrets_manager::AwsSecretStore;

use crate::config::AwsConfig;
use crate::provider::ProviderError;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_kms::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Load the shared SDK configuration for the configured region.
///
/// Credentials are resolved lazily by the SDK on the first call.
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(aws.region.clone()))
        .load()
        .await
}

/// Sort an SDK failure into a [`ProviderError`] bucket.
pub(crate) fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(context) => classify_code(context.err().code(), detail),
        _ if mentions_missing_credentials(&detail) => ProviderError::MissingCredentials(detail),
        _ => ProviderError::Other(detail),
    }
}

fn classify_code(code: Option<&str>, detail: String) -> ProviderError {
    match code {
        Some("AccessDeniedException") | Some("AccessDenied") => ProviderError::AccessDenied(detail),
        Some("NotFoundException") | Some("ResourceNotFoundException") => {
            ProviderError::NotFound(detail)
        }
        Some("UnrecognizedClientException") | Some("InvalidClientTokenId") => {
            ProviderError::MissingCredentials(detail)
        }
        _ => ProviderError::Other(detail),
    }
}

/// Identity resolution failures never reach the service, so they only
/// show up in the error text.
fn mentions_missing_credentials(detail: &str) -> bool {
    let detail = detail.to_ascii_lowercase();
    detail.contains("no credentials") || detail.contains("credentials provider")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_service_codes() {
        assert_eq!(
            classify_code(Some("AccessDeniedException"), "d".into()),
            ProviderError::AccessDenied("d".into())
        );
        assert_eq!(
            classify_code(Some("NotFoundException"), "d".into()),
            ProviderError::NotFound("d".into())
        );
        assert_eq!(
            classify_code(Some("ResourceNotFoundException"), "d".into()),
            ProviderError::NotFound("d".into())
        );
        assert_eq!(
            classify_code(Some("KMSInternalException"), "d".into()),
            ProviderError::Other("d".into())
        );
        assert_eq!(classify_code(None, "d".into()), ProviderError::Other("d".into()));
    }

    #[test]
    fn test_missing_credentials_detection() {
        assert!(mentions_missing_credentials(
            "dispatch failure: an error occurred while loading credentials: No credentials in the property bag"
        ));
        assert!(!mentions_missing_credentials("io error: connection refused"));
    }
}
