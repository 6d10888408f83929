use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

/// AES-256 key shared with every other copy of the tool.
/// Changing it makes existing session files unreadable.
const CIPHER_KEY: &[u8; 32] = b"C4QSNKR4GNPIZAH3B0RPWAIV29E7QZ66";

/// Fixed GCM nonce. Reused for every message; see the module docs.
const CIPHER_NONCE: &[u8; 12] = b"KC9DvYrNGnPW";

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("ciphertext was not produced by this key")]
    AuthenticationFailure,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("invalid encoding: {0}")]
    Encoding(String),
}

pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    pub fn new() -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(CIPHER_KEY)),
        }
    }

    /// Encrypt `plaintext`, returning ciphertext followed by the GCM tag.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.cipher
            .encrypt(Nonce::from_slice(CIPHER_NONCE), plaintext)
            .map_err(|_| CipherError::EncryptionFailed)
    }

    /// Decrypt and authenticate `ciphertext`.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.cipher
            .decrypt(Nonce::from_slice(CIPHER_NONCE), ciphertext)
            .map_err(|_| CipherError::AuthenticationFailure)
    }

    pub fn encrypt_to_base64(&self, plaintext: &str) -> Result<String, CipherError> {
        let ciphertext = self.encrypt(plaintext.as_bytes())?;
        Ok(STANDARD.encode(ciphertext))
    }

    pub fn decrypt_from_base64(&self, encoded: &str) -> Result<String, CipherError> {
        let ciphertext = STANDARD
            .decode(encoded)
            .map_err(|e| CipherError::Encoding(e.to_string()))?;
        let plaintext = self.decrypt(&ciphertext)?;
        String::from_utf8(plaintext).map_err(|e| CipherError::Encoding(e.to_string()))
    }
}

impl Default for SessionCipher {
    fn default() -> Self {
        Self::new()
    }
}
