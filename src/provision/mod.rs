//! Secret provisioning through a key-management service.
//!
//! A provisioning run generates a 256-bit secret, checks that AWS
//! credentials are discoverable, confirms the target key alias exists and
//! then hands the secret to KMS for encryption. Only the ciphertext leaves
//! this module; storing it is the caller's business.
//!
//! ## Usage
//!
//! ```ignore
//! let kms = Arc::new(AwsKms::new(&sdk_config, config.aws.kms_endpoint.clone()));
//! let provisioner = SecretProvisioner::new(kms, &config, CredentialEnvironment::from_process());
//!
//! let secret = generate_secret();
//! let blob = provisioner.encrypt_secret(&secret, "app-secrets").await?;
//! ```

pub mod credentials;
pub mod kms;
pub mod provisioner;
pub mod secret;

pub use credentials::{validate_environment_credentials, CredentialEnvironment};
pub use kms::{alias_key_id, create_alias_command, KeyManagementService};
pub use provisioner::{resolve_key_alias, SecretProvisioner};
pub use secret::{generate_secret, EncryptedBlob, Secret, SECRET_LEN};
