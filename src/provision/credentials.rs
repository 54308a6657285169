//! Discovery of AWS credential material.
//!
//! Only checks that credentials *could* be found by the SDK. Nothing is read
//! from the credentials file and nothing is ever written.

use crate::error::{AppError, AppResult};
use std::path::PathBuf;
use tracing::debug;

pub const ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const SHARED_CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";

const CONFIGURE_GUIDE_URL: &str =
    "https://docs.aws.amazon.com/cli/latest/userguide/cli-configure-files.html";

/// Snapshot of the environment values that decide whether credentials exist.
#[derive(Debug, Clone, Default)]
pub struct CredentialEnvironment {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Path of the shared credentials file, if one could be determined
    pub credentials_file: Option<PathBuf>,
}

impl CredentialEnvironment {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        let credentials_file = std::env::var_os(SHARED_CREDENTIALS_FILE_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")));

        Self {
            access_key_id: std::env::var(ACCESS_KEY_ID_ENV).ok(),
            secret_access_key: std::env::var(SECRET_ACCESS_KEY_ENV).ok(),
            credentials_file,
        }
    }

    fn has_env_keys(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|v| !v.trim().is_empty());
        set(&self.access_key_id) && set(&self.secret_access_key)
    }

    fn has_credentials_file(&self) -> bool {
        self.credentials_file
            .as_deref()
            .is_some_and(|path| path.is_file())
    }
}

/// Check that credentials are available either from the two access key
/// variables or from the shared credentials file.
pub fn validate_environment_credentials(env: &CredentialEnvironment) -> AppResult<()> {
    if env.has_env_keys() {
        debug!("AWS credentials found in environment");
        return Ok(());
    }

    if env.has_credentials_file() {
        debug!(path = ?env.credentials_file, "AWS credentials file found");
        return Ok(());
    }

    let file = env
        .credentials_file
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.aws/credentials".to_string());

    Err(AppError::configuration(format!(
        "AWS credentials are not set. Please configure {ACCESS_KEY_ID_ENV} and \
         {SECRET_ACCESS_KEY_ENV} as environment variables or set up the AWS credentials \
         file at {file}. Refer to {CONFIGURE_GUIDE_URL} for guidance."
    )))
}
