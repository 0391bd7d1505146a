// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! JWE compact serialization for encrypted result batches, on top of
//! `josekit`.
//!
//! Supported key management: `RSA-OAEP-256` (RSA public key wraps a random
//! content key) and `dir` (a shared 256-bit key is the content key).
//! Content is always encrypted with `A256GCM`. Compressed (`zip`) payloads
//! are refused.

use std::cell::Cell;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use josekit::JoseError;
use josekit::JoseHeader;
use josekit::jwe::{self, Dir, JweDecrypter, JweEncrypter, JweHeader, RSA_OAEP_256};
use log::debug;
use prost::Message;
use rand_core::{OsRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::proto::RowBatchData;

pub const ALG_RSA_OAEP_256: &str = "RSA-OAEP-256";
pub const ALG_DIR: &str = "dir";
pub const ENC_A256GCM: &str = "A256GCM";

/// Smallest RSA modulus accepted for `RSA-OAEP-256`.
pub const MIN_RSA_BITS: usize = 2048;

const KEY_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("malformed JWE: {0}")]
    Malformed(String),
    #[error("unsupported JWE: {0}")]
    Unsupported(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("token was issued for a different key")]
    KeyMismatch,
    #[error("decryption failed: {0}")]
    Decrypt(#[source] JoseError),
    #[error("encryption failed: {0}")]
    Encrypt(#[source] JoseError),
    #[error("decrypted payload is not a row batch: {0}")]
    Payload(#[from] prost::DecodeError),
}

fn invalid_key(err: impl fmt::Display) -> CryptoError {
    CryptoError::InvalidKey(err.to_string())
}

enum PublicMaterial {
    Rsa(RsaPublicKey),
    Direct([u8; KEY_LEN]),
}

enum PrivateMaterial {
    Rsa(RsaPrivateKey),
    Direct([u8; KEY_LEN]),
}

/// Key used by producers to encrypt.
pub struct EncryptionKey {
    kid: Option<String>,
    material: PublicMaterial,
}

/// Key used by the client to decrypt. Knows its public half.
pub struct DecryptionKey {
    kid: Option<String>,
    material: PrivateMaterial,
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("alg", &self.algorithm())
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("alg", &self.algorithm())
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

/// JSON Web Key, restricted to the fields used here.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Jwk {
    kty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    e: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    d: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    k: Option<String>,
}

impl Jwk {
    fn parse(json: &str) -> Result<Self, CryptoError> {
        serde_json::from_str(json).map_err(|e| CryptoError::InvalidKey(format!("JWK: {e}")))
    }

    fn big_uint(field: &Option<String>, name: &str) -> Result<BigUint, CryptoError> {
        let encoded = field
            .as_deref()
            .ok_or_else(|| CryptoError::InvalidKey(format!("JWK is missing {name:?}")))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidKey(format!("JWK field {name:?}: {e}")))?;
        Ok(BigUint::from_bytes_be(&bytes))
    }

    fn octet_key(&self) -> Result<[u8; KEY_LEN], CryptoError> {
        let encoded = self
            .k
            .as_deref()
            .ok_or_else(|| CryptoError::InvalidKey("JWK is missing \"k\"".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidKey(format!("JWK field \"k\": {e}")))?;
        direct_key(&bytes)
    }

    fn public_key(&self) -> Result<RsaPublicKey, CryptoError> {
        let n = Self::big_uint(&self.n, "n")?;
        let e = Self::big_uint(&self.e, "e")?;
        RsaPublicKey::new(n, e).map_err(invalid_key)
    }

    fn private_key(&self) -> Result<RsaPrivateKey, CryptoError> {
        let n = Self::big_uint(&self.n, "n")?;
        let e = Self::big_uint(&self.e, "e")?;
        let d = Self::big_uint(&self.d, "d")?;
        let p = Self::big_uint(&self.p, "p")?;
        let q = Self::big_uint(&self.q, "q")?;
        let key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(invalid_key)?;
        key.validate()
            .map_err(invalid_key)?;
        Ok(key)
    }

    fn from_public(kid: Option<String>, key: &RsaPublicKey) -> Self {
        Self {
            kty: "RSA".to_string(),
            kid,
            alg: Some(ALG_RSA_OAEP_256.to_string()),
            n: Some(URL_SAFE_NO_PAD.encode(key.n().to_bytes_be())),
            e: Some(URL_SAFE_NO_PAD.encode(key.e().to_bytes_be())),
            ..Default::default()
        }
    }

    fn from_octets(kid: Option<String>, key: &[u8; KEY_LEN]) -> Self {
        Self {
            kty: "oct".to_string(),
            kid,
            alg: Some(ALG_DIR.to_string()),
            k: Some(URL_SAFE_NO_PAD.encode(key)),
            ..Default::default()
        }
    }

    fn to_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string(self).map_err(invalid_key)
    }
}

fn direct_key(bytes: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
    <[u8; KEY_LEN]>::try_from(bytes).map_err(|_| {
        CryptoError::InvalidKey(format!(
            "direct key must be {KEY_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}

fn unsupported_kty(kty: &str) -> CryptoError {
    CryptoError::Unsupported(format!("key type {kty:?}"))
}

impl EncryptionKey {
    pub fn direct(key: [u8; KEY_LEN]) -> Self {
        Self {
            kid: None,
            material: PublicMaterial::Direct(key),
        }
    }

    pub fn from_jwk(json: &str) -> Result<Self, CryptoError> {
        let jwk = Jwk::parse(json)?;
        let material = match jwk.kty.as_str() {
            "RSA" => PublicMaterial::Rsa(jwk.public_key()?),
            "oct" => PublicMaterial::Direct(jwk.octet_key()?),
            other => return Err(unsupported_kty(other)),
        };
        Ok(Self {
            kid: jwk.kid,
            material,
        })
    }

    /// SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| CryptoError::InvalidKey(format!("PEM public key: {e}")))?;
        Ok(Self {
            kid: None,
            material: PublicMaterial::Rsa(key),
        })
    }

    /// Accepts either a JWK document or a PEM block.
    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();
        if text.starts_with('{') {
            Self::from_jwk(text)
        } else if text.starts_with("-----BEGIN") {
            Self::from_pem(text)
        } else {
            Err(CryptoError::InvalidKey(
                "expected a JWK or a PEM block".to_string(),
            ))
        }
    }

    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    pub fn algorithm(&self) -> &'static str {
        match self.material {
            PublicMaterial::Rsa(_) => ALG_RSA_OAEP_256,
            PublicMaterial::Direct(_) => ALG_DIR,
        }
    }

    pub fn to_jwk_json(&self) -> Result<String, CryptoError> {
        match &self.material {
            PublicMaterial::Rsa(key) => Jwk::from_public(self.kid.clone(), key),
            PublicMaterial::Direct(key) => Jwk::from_octets(self.kid.clone(), key),
        }
        .to_json()
    }

    fn encrypter(&self) -> Result<Box<dyn JweEncrypter>, CryptoError> {
        let encrypter: Box<dyn JweEncrypter> = match &self.material {
            PublicMaterial::Rsa(key) => {
                let der = key.to_public_key_der().map_err(invalid_key)?;
                Box::new(
                    RSA_OAEP_256
                        .encrypter_from_der(der.as_bytes())
                        .map_err(invalid_key)?,
                )
            }
            PublicMaterial::Direct(key) => {
                Box::new(Dir.encrypter_from_bytes(key).map_err(invalid_key)?)
            }
        };
        Ok(encrypter)
    }

    pub fn to_pem(&self) -> Result<String, CryptoError> {
        match &self.material {
            PublicMaterial::Rsa(key) => key
                .to_public_key_pem(LineEnding::LF)
                .map_err(invalid_key),
            PublicMaterial::Direct(_) => Err(CryptoError::Unsupported(
                "direct keys have no PEM form".to_string(),
            )),
        }
    }
}

impl DecryptionKey {
    pub fn direct(key: [u8; KEY_LEN]) -> Self {
        Self {
            kid: None,
            material: PrivateMaterial::Direct(key),
        }
    }

    /// A fresh random 256-bit direct key.
    pub fn generate_direct() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self::direct(key)
    }

    pub fn generate_rsa(bits: usize) -> Result<Self, CryptoError> {
        if bits < MIN_RSA_BITS {
            return Err(CryptoError::InvalidKey(format!(
                "RSA keys need at least {MIN_RSA_BITS} bits, got {bits}"
            )));
        }
        let key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(invalid_key)?;
        Ok(Self {
            kid: None,
            material: PrivateMaterial::Rsa(key),
        })
    }

    pub fn from_jwk(json: &str) -> Result<Self, CryptoError> {
        let jwk = Jwk::parse(json)?;
        let material = match jwk.kty.as_str() {
            "RSA" => PrivateMaterial::Rsa(jwk.private_key()?),
            "oct" => PrivateMaterial::Direct(jwk.octet_key()?),
            other => return Err(unsupported_kty(other)),
        };
        Ok(Self {
            kid: jwk.kid,
            material,
        })
    }

    /// PKCS#8 (`PRIVATE KEY`) or PKCS#1 (`RSA PRIVATE KEY`) PEM.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| CryptoError::InvalidKey(format!("PEM private key: {e}")))?;
        Ok(Self {
            kid: None,
            material: PrivateMaterial::Rsa(key),
        })
    }

    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();
        if text.starts_with('{') {
            Self::from_jwk(text)
        } else if text.starts_with("-----BEGIN") {
            Self::from_pem(text)
        } else {
            Err(CryptoError::InvalidKey(
                "expected a JWK or a PEM block".to_string(),
            ))
        }
    }

    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    pub fn algorithm(&self) -> &'static str {
        match self.material {
            PrivateMaterial::Rsa(_) => ALG_RSA_OAEP_256,
            PrivateMaterial::Direct(_) => ALG_DIR,
        }
    }

    /// The matching key for the producing side.
    pub fn public_key(&self) -> EncryptionKey {
        let material = match &self.material {
            PrivateMaterial::Rsa(key) => PublicMaterial::Rsa(key.to_public_key()),
            PrivateMaterial::Direct(key) => PublicMaterial::Direct(*key),
        };
        EncryptionKey {
            kid: self.kid.clone(),
            material,
        }
    }

    /// Full private JWK, including the secret fields.
    pub fn to_jwk_json(&self) -> Result<String, CryptoError> {
        match &self.material {
            PrivateMaterial::Rsa(key) => {
                let mut jwk = Jwk::from_public(self.kid.clone(), &key.to_public_key());
                let encode = |n: &BigUint| URL_SAFE_NO_PAD.encode(n.to_bytes_be());
                jwk.d = Some(encode(key.d()));
                if let [p, q, ..] = key.primes() {
                    jwk.p = Some(encode(p));
                    jwk.q = Some(encode(q));
                }
                jwk
            }
            PrivateMaterial::Direct(key) => Jwk::from_octets(self.kid.clone(), key),
        }
        .to_json()
    }

    fn decrypter(&self) -> Result<Box<dyn JweDecrypter>, CryptoError> {
        let decrypter: Box<dyn JweDecrypter> = match &self.material {
            PrivateMaterial::Rsa(key) => {
                let der = key.to_pkcs8_der().map_err(invalid_key)?;
                Box::new(
                    RSA_OAEP_256
                        .decrypter_from_der(der.as_bytes())
                        .map_err(invalid_key)?,
                )
            }
            PrivateMaterial::Direct(key) => {
                Box::new(Dir.decrypter_from_bytes(key).map_err(invalid_key)?)
            }
        };
        Ok(decrypter)
    }

    pub fn to_pem(&self) -> Result<String, CryptoError> {
        match &self.material {
            PrivateMaterial::Rsa(key) => key
                .to_pkcs8_pem(LineEnding::LF)
                .map(|pem| pem.to_string())
                .map_err(invalid_key),
            PrivateMaterial::Direct(_) => Err(CryptoError::Unsupported(
                "direct keys have no PEM form".to_string(),
            )),
        }
    }
}

fn header_str<'h>(header: &'h JweHeader, name: &str) -> Option<&'h str> {
    header.claim(name).and_then(serde_json::Value::as_str)
}

/// Encrypt `plaintext` into a five-part compact JWE.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Result<String, CryptoError> {
    let mut header = JweHeader::new();
    header.set_content_encryption(ENC_A256GCM);
    if let Some(kid) = &key.kid {
        header.set_key_id(kid.as_str());
    }
    let encrypter = key.encrypter()?;
    let token = jwe::serialize_compact(plaintext, &header, &*encrypter)
        .map_err(CryptoError::Encrypt)?;
    debug!(
        "encrypted {} bytes with {}/{ENC_A256GCM}",
        plaintext.len(),
        key.algorithm()
    );
    Ok(token)
}

/// Refuse headers this client does not accept before anything is decrypted.
fn check_header(header: &JweHeader, key: &DecryptionKey) -> Result<(), CryptoError> {
    if let Some(zip) = header_str(header, "zip") {
        return Err(CryptoError::Unsupported(format!("compression {zip:?}")));
    }
    match header_str(header, "enc") {
        Some(ENC_A256GCM) => {}
        other => {
            return Err(CryptoError::Unsupported(format!(
                "content encryption {other:?}"
            )));
        }
    }
    match header_str(header, "alg") {
        Some(alg) if alg == key.algorithm() => {}
        Some(ALG_RSA_OAEP_256 | ALG_DIR) => return Err(CryptoError::KeyMismatch),
        other => {
            return Err(CryptoError::Unsupported(format!(
                "key management {other:?}"
            )));
        }
    }
    if let (Some(expected), Some(actual)) = (&key.kid, header_str(header, "kid"))
        && expected != actual
    {
        return Err(CryptoError::KeyMismatch);
    }
    Ok(())
}

/// Decrypt a compact JWE produced by [`encrypt`] or any compatible producer.
///
/// A token whose header cannot be read is [`CryptoError::Malformed`]; one
/// that passes the header checks but does not decrypt (wrong key, altered
/// ciphertext, truncated segments) is [`CryptoError::Decrypt`].
pub fn decrypt(token: &str, key: &DecryptionKey) -> Result<Vec<u8>, CryptoError> {
    let decrypter = key.decrypter()?;
    let header_read = Cell::new(false);
    let rejection = Cell::new(None);
    let result = jwe::deserialize_compact_with_selector(token.trim(), |header| {
        header_read.set(true);
        match check_header(header, key) {
            Ok(()) => Ok(Some(&*decrypter)),
            Err(err) => {
                rejection.set(Some(err));
                Ok(None)
            }
        }
    });
    if let Some(err) = rejection.take() {
        return Err(err);
    }
    let (plaintext, _) = result.map_err(|err| {
        if header_read.get() {
            CryptoError::Decrypt(err)
        } else {
            CryptoError::Malformed(err.to_string())
        }
    })?;
    debug!("decrypted {} bytes with {}", plaintext.len(), key.algorithm());
    Ok(plaintext)
}

/// Serialize and encrypt a row batch.
pub fn encode_row_batch(batch: &RowBatchData, key: &EncryptionKey) -> Result<String, CryptoError> {
    encrypt(&batch.encode_to_vec(), key)
}

/// Decrypt and deserialize a row batch.
pub fn decode_row_batch(token: &str, key: &DecryptionKey) -> Result<RowBatchData, CryptoError> {
    let plaintext = decrypt(token, key)?;
    Ok(RowBatchData::decode(plaintext.as_slice())?)
}
