//! Signed session tokens.
//!
//! Tokens are compact JWS strings, `header.claims.signature`, each part
//! base64url without padding, signed with HMAC-SHA2. The secret and the
//! algorithm are process configuration and never travel inside the token.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{digest::KeyInit, Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};
use std::{fmt, str::FromStr};
use thiserror::Error;
use tracing::debug;

/// Lifetime of every issued token.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl Algorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            _ => Err(Error::UnsupportedAlg(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unix milliseconds at which the current question was shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qst: Option<i64>,
}

pub struct TokenCodec {
    secret: SecretString,
    algorithm: Algorithm,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn mac<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| Error::InvalidKey)?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn verify_mac<M: Mac + KeyInit>(key: &[u8], input: &[u8], signature: &[u8]) -> Result<(), Error> {
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| Error::InvalidKey)?;
    mac.update(input);
    mac.verify_slice(signature)
        .map_err(|_| Error::InvalidSignature)
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: SecretString, algorithm: Algorithm) -> Self {
        Self { secret, algorithm }
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        let key = self.secret.expose_secret().as_bytes();
        match self.algorithm {
            Algorithm::HS256 => mac::<Hmac<Sha256>>(key, input),
            Algorithm::HS384 => mac::<Hmac<Sha384>>(key, input),
            Algorithm::HS512 => mac::<Hmac<Sha512>>(key, input),
        }
    }

    fn check(&self, input: &[u8], signature: &[u8]) -> Result<(), Error> {
        let key = self.secret.expose_secret().as_bytes();
        match self.algorithm {
            Algorithm::HS256 => verify_mac::<Hmac<Sha256>>(key, input, signature),
            Algorithm::HS384 => verify_mac::<Hmac<Sha384>>(key, input, signature),
            Algorithm::HS512 => verify_mac::<Hmac<Sha512>>(key, input, signature),
        }
    }

    /// Issue a token for `identity`, valid for [`TOKEN_TTL_SECONDS`] from `now_unix_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized or the key is rejected.
    pub fn encode(
        &self,
        identity: &str,
        question_start: Option<i64>,
        now_unix_seconds: i64,
    ) -> Result<String, Error> {
        let header = Header {
            alg: self.algorithm.as_str().to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            sub: identity.to_string(),
            iat: now_unix_seconds,
            exp: now_unix_seconds.saturating_add(TOKEN_TTL_SECONDS),
            qst: question_start,
        };

        let signing_input = format!("{}.{}", b64e_json(&header)?, b64e_json(&claims)?);
        let signature = self.sign(signing_input.as_bytes())?;
        let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the token is malformed or contains invalid base64/json,
    /// - the header names a different algorithm,
    /// - the signature does not match,
    /// - `exp` is not after `now_unix_seconds`.
    pub fn verify(&self, token: &str, now_unix_seconds: i64) -> Result<Claims, Error> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
        if parts.next().is_some() {
            return Err(Error::TokenFormat);
        }

        let header: Header = b64d_json(header_b64)?;
        if header.alg != self.algorithm.as_str() {
            return Err(Error::UnsupportedAlg(header.alg));
        }

        let signing_input = format!("{header_b64}.{claims_b64}");
        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;
        self.check(signing_input.as_bytes(), &signature)?;

        let claims: Claims = b64d_json(claims_b64)?;
        if claims.exp <= now_unix_seconds {
            return Err(Error::Expired);
        }

        Ok(claims)
    }

    /// Like [`TokenCodec::verify`], with every failure folded into `None`.
    #[must_use]
    pub fn decode(&self, token: &str, now_unix_seconds: i64) -> Option<Claims> {
        match self.verify(token, now_unix_seconds) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("Session token rejected: {e}");
                None
            }
        }
    }
}
