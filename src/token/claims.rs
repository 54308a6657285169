use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role carried by every issued token.
pub const ROLE: &str = "user";

/// Permissions carried by every issued token, in order.
pub const PERMISSIONS: [&str; 2] = ["read", "write"];

/// Claim set of a token. Timestamps are seconds since the epoch.
///
/// Tokens issued here always carry `role` and `permissions`; a verified
/// token from elsewhere may omit them, and any other claims it carries are
/// kept in `extra` as signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Claims for a token issued at `now`, valid for `validity`.
    pub fn new(now: DateTime<Utc>, validity: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            exp: iat + validity.num_seconds(),
            iat,
            nbf: iat,
            role: Some(ROLE.to_string()),
            permissions: Some(PERMISSIONS.iter().map(|p| p.to_string()).collect()),
            extra: Map::new(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
