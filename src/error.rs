use thiserror::Error;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Missing credentials, missing alias, missing signing key and similar.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider refused the call.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Any other provider-side failure, with the provider's own message.
    #[error("Service error: {0}")]
    Service(String),

    #[error("Token signature does not match the signing key")]
    InvalidSignature,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token is not yet valid (nbf claim)")]
    TokenNotYetValid,

    #[error("Invalid issued at (iat claim)")]
    InvalidIssuedAt,

    #[error("Token validation failed: {0}")]
    TokenValidation(String),
}

impl AppError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn authorization<S: Into<String>>(msg: S) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn service<S: Into<String>>(msg: S) -> Self {
        Self::Service(msg.into())
    }

    pub fn token_validation<S: Into<String>>(msg: S) -> Self {
        Self::TokenValidation(msg.into())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_detail() {
        let err = AppError::configuration("alias 'billing' missing");
        assert_eq!(err.to_string(), "Configuration error: alias 'billing' missing");

        let err = AppError::service("throttled");
        assert!(err.to_string().contains("throttled"));
    }
}
