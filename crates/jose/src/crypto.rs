// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The crypto service: the one place that touches the active signing key,
//! verifies or mints JWTs, decrypts JWEs, and computes the hash bindings
//! between codes, tokens, and ID tokens.

use std::sync::Arc;

use jsonwebtoken::{jwk::JwkSet, DecodingKey};
use mas_iana::jose::{JsonWebEncryptionAlg, JsonWebEncryptionEnc, JsonWebSignatureAlg};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    hashes,
    jwe::{self, JweError},
    jwk::{self, JwkLookupError},
    jwt::{self, JwtError},
    keys::{KeyError, KeyManager},
};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Jwe(#[from] JweError),
    #[error(transparent)]
    JwkLookup(#[from] JwkLookupError),
}

/// Thin facade over a [`KeyManager`] plus the stateless JWT/JWE/hash
/// helpers; everything in `mas-handlers` that touches cryptography goes
/// through this.
pub struct CryptoService<K: ?Sized> {
    keys: Arc<K>,
}

impl<K: KeyManager + ?Sized> CryptoService<K> {
    pub fn new(keys: Arc<K>) -> Self {
        Self { keys }
    }

    /// Sign `claims` with the active key, returning the compact JWS and
    /// the `kid` it was signed under.
    pub async fn sign<T: Serialize>(&self, claims: &T) -> Result<(String, String), CryptoError> {
        let key = self.keys.active_with_private().await?;
        let encoding_key = key.encoding_key()?;
        let token = jwt::sign(key.alg, &key.kid, &encoding_key, claims)?;
        Ok((token, key.kid))
    }

    /// Verify a JWS against this server's own published JWKS, selecting by
    /// `kid` (used for `id_token_hint` verification).
    pub async fn verify_own<T: DeserializeOwned>(&self, token: &str) -> Result<T, CryptoError> {
        let header = jwt::peek_header_typed(token)?;
        let jwks = self.keys.jwks().await;
        let jwk = jwk::select_signing_key(&jwks, header.kid.as_deref())?;
        let decoding_key = jwk::decoding_key_from_jwk(jwk)?;
        let alg = header.alg;
        Ok(jwt::verify(alg, &decoding_key, token)?)
    }

    /// Verify a JWS against an arbitrary client JWKS (JAR verification).
    pub fn verify_against_jwks<T: DeserializeOwned>(
        jwks: &JwkSet,
        alg: JsonWebSignatureAlg,
        kid: Option<&str>,
        token: &str,
    ) -> Result<T, CryptoError> {
        let jwk = jwk::select_signing_key(jwks, kid)?;
        let decoding_key = jwk::decoding_key_from_jwk(jwk)?;
        Ok(jwt::verify(alg, &decoding_key, token)?)
    }

    /// Decrypt a JWE using the active key's private RSA material (JAR
    /// request objects sent as nested JWE).
    pub async fn decrypt_jwe(&self, token: &str) -> Result<Vec<u8>, CryptoError> {
        let key = self.keys.active_with_private().await?;
        let rsa_private = key.rsa_private_key()?;
        Ok(jwe::decrypt(token, &rsa_private)?)
    }

    /// Encrypt `claims` with a client's public encryption key (JARM
    /// response encryption).
    pub fn encrypt_jwe<T: Serialize>(
        claims: &T,
        kid: Option<&str>,
        alg: JsonWebEncryptionAlg,
        enc: JsonWebEncryptionEnc,
        public_key: &rsa::RsaPublicKey,
    ) -> Result<String, CryptoError> {
        Ok(jwe::encrypt(claims, kid, alg, enc, public_key)?)
    }

    /// Encrypt an already-signed compact JWS as a nested JWE (JARM
    /// response encryption, RFC 9101 request object encryption's
    /// counterpart on the way out).
    pub fn encrypt_jwe_compact(
        jws: &str,
        kid: Option<&str>,
        alg: JsonWebEncryptionAlg,
        enc: JsonWebEncryptionEnc,
        public_key: &rsa::RsaPublicKey,
    ) -> Result<String, CryptoError> {
        Ok(jwe::encrypt_bytes(jws.as_bytes(), kid, alg, enc, public_key)?)
    }

    #[must_use]
    pub fn c_hash(code: &str) -> String {
        hashes::left_half_hash(code)
    }

    #[must_use]
    pub fn at_hash(access_token: &str) -> String {
        hashes::left_half_hash(access_token)
    }

    #[must_use]
    pub fn session_state(client_id: &str, origin: &str, session_id: &str, salt: &str) -> String {
        hashes::session_state(client_id, origin, session_id, salt)
    }
}

/// Build a [`DecodingKey`] from a client JWK, exposed for callers that
/// need to verify without going through [`CryptoService`] (e.g. DPoP).
pub fn decoding_key_from_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<DecodingKey, CryptoError> {
    Ok(jwk::decoding_key_from_jwk(jwk)?)
}
