use crate::config::TokenConfig;
use crate::error::{AppError, AppResult};
use crate::token::claims::Claims;
use crate::token::clock::{Clock, SystemClock};
use crate::token::keys::SigningKeys;
use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Validity window used when the caller does not pick one.
pub const DEFAULT_VALIDITY_MINUTES: u32 = 15;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Access token plus the longer-lived refresh token issued alongside it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates HS256 tokens against an injectable clock.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer<C = SystemClock> {
    clock: C,
}

impl TokenIssuer<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> TokenIssuer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Sign a fresh claim set valid for `validity` from now.
    #[instrument(skip(self, signing_key))]
    pub fn issue(&self, signing_key: &[u8], validity: Duration) -> AppResult<String> {
        ensure_key(signing_key)?;

        let claims = Claims::new(self.clock.now(), validity);
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(signing_key),
        )
        .map_err(|e| AppError::token_validation(format!("Failed to encode token: {e}")))?;

        debug!(exp = claims.exp, "Issued token");
        Ok(token)
    }

    pub fn issue_token(&self, signing_key: &[u8], validity_minutes: u32) -> AppResult<String> {
        self.issue(signing_key, Duration::minutes(i64::from(validity_minutes)))
    }

    pub fn issue_refresh_token(&self, signing_key: &[u8], config: &TokenConfig) -> AppResult<String> {
        self.issue_token(signing_key, config.refresh_validity_minutes)
    }

    /// Issue an access token and a refresh token, each under its own key.
    pub fn issue_pair(&self, keys: &SigningKeys, config: &TokenConfig) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access: self.issue_token(keys.access.as_bytes(), config.validity_minutes)?,
            refresh: self.issue_refresh_token(keys.refresh.as_bytes(), config)?,
        })
    }

    /// Verify signature and time claims, returning the claim set as signed,
    /// including claims this issuer never sets.
    ///
    /// Checks run in a fixed order: signature, `exp`, `nbf`, `iat`.
    /// A token is expired from the second its `exp` is reached.
    pub fn validate_token(&self, token: &str, signing_key: &[u8]) -> AppResult<Claims> {
        ensure_key(signing_key)?;

        let mut validation = Validation::new(ALGORITHM);
        // Time claims are checked below against our own clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        let payload = decode::<Map<String, Value>>(
            token,
            &DecodingKey::from_secret(signing_key),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AppError::InvalidSignature,
            _ => AppError::token_validation(e.to_string()),
        })?
        .claims;

        let now = self.clock.now().timestamp();

        let exp = timestamp_claim(&payload, "exp")
            .ok_or_else(|| AppError::token_validation("exp claim is not an integer timestamp"))?;
        if now >= exp {
            return Err(AppError::TokenExpired);
        }

        let nbf = timestamp_claim(&payload, "nbf")
            .ok_or_else(|| AppError::token_validation("nbf claim is not an integer timestamp"))?;
        if now < nbf {
            return Err(AppError::TokenNotYetValid);
        }

        match timestamp_claim(&payload, "iat") {
            Some(iat) if iat <= now => {}
            _ => return Err(AppError::InvalidIssuedAt),
        }

        serde_json::from_value(Value::Object(payload))
            .map_err(|e| AppError::token_validation(format!("Unexpected claim set: {e}")))
    }
}

fn ensure_key(signing_key: &[u8]) -> AppResult<()> {
    if signing_key.is_empty() {
        return Err(AppError::configuration(
            "A signing key is required to issue or validate tokens.",
        ));
    }
    Ok(())
}

fn timestamp_claim(payload: &Map<String, Value>, name: &str) -> Option<i64> {
    payload.get(name).and_then(Value::as_i64)
}

/// Issue a token with the wall clock.
pub fn issue_token(signing_key: &[u8], validity_minutes: u32) -> AppResult<String> {
    TokenIssuer::new().issue_token(signing_key, validity_minutes)
}

/// Validate a token with the wall clock.
pub fn validate_token(token: &str, signing_key: &[u8]) -> AppResult<Claims> {
    TokenIssuer::new().validate_token(token, signing_key)
}
