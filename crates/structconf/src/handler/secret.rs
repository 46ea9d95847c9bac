//! Encrypted secret resolver.
//!
//! Secrets travel as base64 (standard alphabet) RSA-OAEP ciphertexts using
//! SHA-256. Private keys are exchanged as PKCS#1 PEM, public keys as
//! SubjectPublicKeyInfo PEM.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use miette::Diagnostic;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use super::Handler;
use crate::{Context, Error, Field, Value};

/// Key handling and encryption failures.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum CryptoError {
    /// No private key is configured.
    #[error("no private key configured")]
    #[diagnostic(
        code(structconf::crypto::no_private_key),
        help("load a key with RsaSecret::private_key_from_pem")
    )]
    MissingPrivateKey,

    /// No public key is configured.
    #[error("no public key configured")]
    #[diagnostic(code(structconf::crypto::no_public_key))]
    MissingPublicKey,

    /// The ciphertext is not valid base64.
    #[error("ciphertext is not valid base64")]
    #[diagnostic(code(structconf::crypto::base64))]
    Base64(#[from] base64::DecodeError),

    /// An RSA operation failed.
    #[error("RSA operation failed")]
    #[diagnostic(code(structconf::crypto::rsa))]
    Rsa(#[from] rsa::Error),

    /// A private key could not be encoded or decoded.
    #[error("invalid PKCS#1 private key")]
    #[diagnostic(code(structconf::crypto::private_key))]
    PrivateKey(#[from] rsa::pkcs1::Error),

    /// A public key could not be encoded or decoded.
    #[error("invalid public key")]
    #[diagnostic(code(structconf::crypto::public_key))]
    PublicKey(#[from] rsa::pkcs8::spki::Error),

    /// The decrypted secret is not UTF-8 text.
    #[error("decrypted secret is not valid UTF-8")]
    #[diagnostic(code(structconf::crypto::utf8))]
    NotUtf8(#[from] std::string::FromUtf8Error),

    /// The value to decrypt is not text.
    #[error("expected base64 text, got {found}")]
    #[diagnostic(code(structconf::crypto::not_text))]
    NotText {
        /// Type name of the offending value.
        found: &'static str,
    },
}

/// Decrypts fields marked `secret`.
///
/// The ciphertext is the proposed value, or the field's current string
/// value if nothing was proposed. An empty ciphertext resolves to nothing.
///
/// # Example
///
/// ```rust,no_run
/// use structconf::handler::RsaSecret;
///
/// let mut secret = RsaSecret::new();
/// let (private_pem, _public_pem) = secret.generate_pem_key_pair(2048)?;
/// let ciphertext = secret.encrypt(b"hunter2")?;
///
/// let reader = RsaSecret::from_private_key_pem(&private_pem)?;
/// assert_eq!(reader.decrypt(&ciphertext)?, b"hunter2");
/// # Ok::<(), structconf::handler::CryptoError>(())
/// ```
#[derive(Clone, Default)]
pub struct RsaSecret {
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
    label: Option<String>,
}

impl RsaSecret {
    /// Creates a resolver with no keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from a PKCS#1 PEM private key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PrivateKey`] if the PEM is invalid.
    pub fn from_private_key_pem(pem: &str) -> Result<Self, CryptoError> {
        let mut secret = Self::new();
        secret.private_key_from_pem(pem)?;
        Ok(secret)
    }

    /// Uses `key` for decryption and its public half for encryption.
    #[must_use]
    pub fn with_private_key(mut self, key: RsaPrivateKey) -> Self {
        self.public_key = Some(key.to_public_key());
        self.private_key = Some(key);
        self
    }

    /// Sets the non-secret OAEP label. Both sides must use the same label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns `true` if a private key is configured.
    #[must_use]
    pub const fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Generates a key pair, keeps it, and returns it as
    /// `(pkcs1_private_pem, spki_public_pem)`.
    ///
    /// # Errors
    ///
    /// Returns an error if generation or encoding fails.
    pub fn generate_pem_key_pair(&mut self, bits: usize) -> Result<(String, String), CryptoError> {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)?;
        let public = key.to_public_key();

        let private_pem = key.to_pkcs1_pem(LineEnding::LF)?.to_string();
        let public_pem = public.to_public_key_pem(LineEnding::LF)?;

        self.private_key = Some(key);
        self.public_key = Some(public);

        Ok((private_pem, public_pem))
    }

    /// Loads a PKCS#1 PEM private key. Its public half replaces any
    /// configured public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PrivateKey`] if the PEM is invalid.
    pub fn private_key_from_pem(&mut self, pem: &str) -> Result<(), CryptoError> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem)?;
        self.public_key = Some(key.to_public_key());
        self.private_key = Some(key);
        Ok(())
    }

    /// Loads a SubjectPublicKeyInfo PEM public key for encryption.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PublicKey`] if the PEM is invalid.
    pub fn public_key_from_pem(&mut self, pem: &str) -> Result<(), CryptoError> {
        self.public_key = Some(RsaPublicKey::from_public_key_pem(pem)?);
        Ok(())
    }

    fn padding(&self) -> Oaep {
        match &self.label {
            Some(label) => Oaep::new_with_label::<Sha256, _>(label),
            None => Oaep::new::<Sha256>(),
        }
    }

    /// Encrypts `plaintext` and returns it base64-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error without a public key or if the message is too long
    /// for the key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let key = self.public_key.as_ref().ok_or(CryptoError::MissingPublicKey)?;
        let ciphertext = key.encrypt(&mut rand::thread_rng(), self.padding(), plaintext)?;
        Ok(STANDARD.encode(ciphertext))
    }

    /// Decrypts a base64-encoded ciphertext.
    ///
    /// # Errors
    ///
    /// Returns an error without a private key, for invalid base64, or if
    /// decryption fails.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
        let key = self
            .private_key
            .as_ref()
            .ok_or(CryptoError::MissingPrivateKey)?;
        let raw = STANDARD.decode(ciphertext)?;
        Ok(key.decrypt(self.padding(), &raw)?)
    }

    fn decrypt_text(&self, ciphertext: &str) -> Result<String, CryptoError> {
        Ok(String::from_utf8(self.decrypt(ciphertext)?)?)
    }
}

impl std::fmt::Debug for RsaSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSecret")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key.is_some())
            .field("label", &self.label)
            .finish()
    }
}

impl Handler for RsaSecret {
    fn handle(
        &self,
        ctx: &Context,
        field: &Field<'_>,
        proposed: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        if field.lookup_tag("secret").is_none() {
            return Ok(None);
        }

        let fail = |source| Error::Secret {
            field: field.name().to_owned(),
            source,
        };

        let ciphertext = match proposed.or_else(|| field.value()) {
            Some(Value::String(text)) => text,
            Some(other) => {
                return Err(fail(CryptoError::NotText {
                    found: other.type_name(),
                }));
            }
            None => {
                return Err(fail(CryptoError::NotText {
                    found: field.type_name(),
                }));
            }
        };

        if ciphertext.is_empty() {
            return Ok(None);
        }

        ctx.check()?;

        #[cfg(feature = "tracing")]
        tracing::trace!(field = field.name(), "decrypting secret");

        self.decrypt_text(&ciphertext)
            .map(|plaintext| Some(Value::String(plaintext)))
            .map_err(fail)
    }
}
