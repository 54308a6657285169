//! Short-lived signed tokens.
//!
//! Tokens are compact HS256 JWTs carrying `exp`, `iat`, `nbf` and a fixed
//! `role`/`permissions` pair. Validation reports which check failed:
//!
//! | Failure                         | Error                          |
//! |---------------------------------|--------------------------------|
//! | signature mismatch              | `AppError::InvalidSignature`   |
//! | `now >= exp`                    | `AppError::TokenExpired`       |
//! | `now < nbf`                     | `AppError::TokenNotYetValid`   |
//! | `iat` missing or in the future  | `AppError::InvalidIssuedAt`    |
//! | anything else                   | `AppError::TokenValidation`    |

pub mod claims;
pub mod clock;
pub mod issuer;
pub mod keys;

pub use claims::{Claims, PERMISSIONS, ROLE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use issuer::{issue_token, validate_token, TokenIssuer, TokenPair, DEFAULT_VALIDITY_MINUTES};
pub use keys::{load_signing_keys, validate_secret_name, SecretStore, SigningKey, SigningKeys};
