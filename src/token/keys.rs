//! Signing key material and where it is loaded from.
//!
//! The key pair is kept in a secrets store as one JSON document:
//!
//! ```json
//! { "JWT_SECRET": "...", "JWT_REFRESH_SECRET": "..." }
//! ```

use crate::error::{AppError, AppResult};
use crate::provider::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Characters accepted in a secret name besides ASCII alphanumerics.
const SECRET_NAME_PUNCTUATION: &str = "-/_+=.@!";

/// HMAC key used to sign and verify tokens. Never empty.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> AppResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AppError::configuration("Signing key must not be empty."));
        }
        Ok(Self(bytes))
    }

    /// Parse a hex-encoded key, as printed by `credforge-admin generate`.
    pub fn from_hex(encoded: &str) -> AppResult<Self> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| AppError::configuration(format!("Signing key is not valid hex: {e}")))?;
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Access and refresh keys loaded together.
#[derive(Clone, Debug)]
pub struct SigningKeys {
    pub access: SigningKey,
    pub refresh: SigningKey,
}

/// Read-only view of a secrets store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// The string value of secret `name`, or `None` if it only has binary data.
    async fn secret_string(&self, name: &str) -> Result<Option<String>, ProviderError>;
}

/// Stored form of the key pair.
#[derive(Deserialize)]
struct KeyPairPayload {
    #[serde(rename = "JWT_SECRET", default)]
    access: Option<String>,
    #[serde(rename = "JWT_REFRESH_SECRET", default)]
    refresh: Option<String>,
}

impl Drop for KeyPairPayload {
    fn drop(&mut self) {
        if let Some(ref mut key) = self.access {
            key.zeroize();
        }
        if let Some(ref mut key) = self.refresh {
            key.zeroize();
        }
    }
}

/// Reject secret names the store would not accept.
pub fn validate_secret_name(name: &str) -> AppResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SECRET_NAME_PUNCTUATION.contains(c));
    if valid {
        Ok(())
    } else {
        Err(AppError::configuration(format!(
            "Invalid secret name '{name}'. Must contain only alphanumeric characters or {SECRET_NAME_PUNCTUATION}"
        )))
    }
}

/// Fetch the access/refresh key pair stored under `name`.
pub async fn load_signing_keys(store: &dyn SecretStore, name: &str) -> AppResult<SigningKeys> {
    validate_secret_name(name)?;

    let raw = store.secret_string(name).await.map_err(|e| {
        warn!("Failed to retrieve secret {}: {}", name, e);
        match e {
            ProviderError::NotFound(_) => {
                AppError::configuration(format!("Secret '{name}' does not exist."))
            }
            ProviderError::AccessDenied(detail) => AppError::authorization(format!(
                "Access denied reading secret '{name}'. Ensure your IAM identity is allowed \
                 'secretsmanager:GetSecretValue'. ({detail})"
            )),
            ProviderError::MissingCredentials(detail) => AppError::authorization(format!(
                "AWS credentials not found while reading secret '{name}': {detail}"
            )),
            ProviderError::Other(detail) => AppError::service(detail),
        }
    })?;

    let mut raw = raw.ok_or_else(|| {
        AppError::configuration(format!(
            "Secret '{name}' has no string value; binary secrets are not supported."
        ))
    })?;

    let parsed = serde_json::from_str::<KeyPairPayload>(&raw);
    raw.zeroize();
    let payload = parsed.map_err(|e| {
        AppError::configuration(format!("Secret '{name}' is not a JSON key pair: {e}"))
    })?;

    let key = |value: &Option<String>, field: &str| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::configuration(format!("Missing expected key {field} in secret '{name}'"))
            })
            .and_then(|v| SigningKey::new(v.as_bytes()))
    };

    let keys = SigningKeys {
        access: key(&payload.access, "JWT_SECRET")?,
        refresh: key(&payload.refresh, "JWT_REFRESH_SECRET")?,
    };

    info!("Signing keys loaded from {}", name);
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, Result<Option<String>, ProviderError>>);

    #[async_trait]
    impl SecretStore for MapStore {
        async fn secret_string(&self, name: &str) -> Result<Option<String>, ProviderError> {
            self.0
                .get(name)
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::NotFound(name.to_string())))
        }
    }

    fn store(name: &str, value: Result<Option<&str>, ProviderError>) -> MapStore {
        let mut map = HashMap::new();
        map.insert(name.to_string(), value.map(|v| v.map(str::to_string)));
        MapStore(map)
    }

    #[test]
    fn test_secret_name_validation() {
        assert!(validate_secret_name("JWT_SECRET").is_ok());
        assert!(validate_secret_name("prod/app-keys@v1+x=y.z!").is_ok());
        assert!(validate_secret_name("").is_err());
        assert!(validate_secret_name("has space").is_err());
        assert!(validate_secret_name("semi;colon").is_err());
    }

    #[test]
    fn test_empty_signing_key_rejected() {
        assert!(matches!(SigningKey::new(Vec::<u8>::new()), Err(AppError::Configuration(_))));
        assert!(SigningKey::from_hex("zz").is_err());
        assert_eq!(SigningKey::from_hex("0a0b").unwrap().as_bytes(), &[10, 11]);
    }

    #[tokio::test]
    async fn test_load_key_pair() {
        let store = store(
            "JWT_SECRET",
            Ok(Some(r#"{"JWT_SECRET":"access-key","JWT_REFRESH_SECRET":"refresh-key"}"#)),
        );
        let keys = load_signing_keys(&store, "JWT_SECRET").await.unwrap();
        assert_eq!(keys.access.as_bytes(), b"access-key");
        assert_eq!(keys.refresh.as_bytes(), b"refresh-key");
    }

    #[tokio::test]
    async fn test_incomplete_key_pair() {
        let store = store("JWT_SECRET", Ok(Some(r#"{"JWT_SECRET":"access-key"}"#)));
        let err = load_signing_keys(&store, "JWT_SECRET").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("JWT_REFRESH_SECRET"));
    }

    #[tokio::test]
    async fn test_unusable_secret_values() {
        let binary = store("JWT_SECRET", Ok(None));
        assert!(matches!(
            load_signing_keys(&binary, "JWT_SECRET").await,
            Err(AppError::Configuration(_))
        ));

        let garbage = store("JWT_SECRET", Ok(Some("not json")));
        assert!(matches!(
            load_signing_keys(&garbage, "JWT_SECRET").await,
            Err(AppError::Configuration(_))
        ));

        let denied = store("JWT_SECRET", Err(ProviderError::AccessDenied("no".into())));
        assert!(matches!(
            load_signing_keys(&denied, "JWT_SECRET").await,
            Err(AppError::Authorization(_))
        ));

        assert!(matches!(
            load_signing_keys(&denied, "bad name").await,
            Err(AppError::Configuration(_))
        ));
    }
}
