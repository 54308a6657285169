//! Random secrets and the ciphertext KMS hands back for them.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a generated secret in bytes (256 bits).
pub const SECRET_LEN: usize = 32;

/// A freshly generated secret.
///
/// The bytes live only in memory and are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    /// Draw a new secret from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex rendering, for display only.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Generate a 256-bit secret.
pub fn generate_secret() -> Secret {
    Secret::generate()
}

/// Ciphertext returned by the key-management service, untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_length_and_uniqueness() {
        let a = generate_secret();
        let b = generate_secret();

        assert_eq!(a.as_bytes().len(), SECRET_LEN);
        assert_eq!(b.as_bytes().len(), SECRET_LEN);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_secret_hex_and_debug() {
        let secret = generate_secret();
        let hex = secret.to_hex();
        assert_eq!(hex.len(), SECRET_LEN * 2);
        assert_eq!(hex::decode(&hex).unwrap(), secret.as_bytes());

        // Never leak the bytes through Debug
        assert_eq!(format!("{:?}", secret), "Secret(<redacted>)");
    }

    #[test]
    fn test_blob_is_passed_through() {
        let blob = EncryptedBlob::new(vec![1, 2, 3, 250]);
        assert_eq!(blob.as_bytes(), &[1, 2, 3, 250]);
        assert_eq!(blob.to_base64(), "AQID+g==");
        assert_eq!(blob.into_bytes(), vec![1, 2, 3, 250]);
    }
}
